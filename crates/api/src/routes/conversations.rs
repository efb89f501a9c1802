//! Conversation routes.

use axum::extract::{Path, State};
use axum::Json;
use database::{assistance, conversation, Conversation, ConversationCategory};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::routes::ApiSuccess;
use crate::state::AppState;

/// List all conversations, most recently active first.
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Vec<Conversation>>>> {
    let conversations = conversation::list_conversations(state.db.pool()).await?;
    Ok(ApiSuccess::new(
        "Conversations fetched successfully",
        conversations,
    ))
}

/// Request body for `PATCH /api/conversations/:id/title`.
#[derive(Debug, Deserialize)]
pub struct UpdateTitleBody {
    pub title: String,
}

/// Rename a conversation.
pub async fn update_title(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTitleBody>,
) -> Result<Json<ApiSuccess<()>>> {
    conversation::update_title(state.db.pool(), &id, &body.title).await?;
    Ok(ApiSuccess::new("Title updated successfully", ()))
}

/// Request body for `PATCH /api/conversations/:id/human-override`.
#[derive(Debug, Deserialize)]
pub struct UpdateHumanOverrideBody {
    pub value: bool,
}

/// Toggle human override on a conversation.
///
/// Enabling the override resolves the latest open assistance record for the
/// conversation, if any; disabling it leaves assistance records untouched.
pub async fn update_human_override(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateHumanOverrideBody>,
) -> Result<Json<ApiSuccess<()>>> {
    let pool = state.db.pool();

    conversation::update_human_override(pool, &id, body.value).await?;

    if body.value {
        if let Some(open) = assistance::find_open_by_conversation_id(pool, &id).await? {
            let resolved = assistance::resolve_assistance(pool, &open.id).await?;
            if resolved {
                info!(
                    conversation_id = %id,
                    assistance_id = %open.id,
                    "resolved open assistance on human takeover"
                );
            }
        }
    }

    let message = if body.value {
        "Human override enabled successfully"
    } else {
        "Human override disabled successfully"
    };
    Ok(ApiSuccess::new(message, ()))
}

/// Request body for `PATCH /api/conversations/:id/category`.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryBody {
    pub category: Option<ConversationCategory>,
    pub alerts: bool,
}

/// Update a conversation's category and alerts flag.
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryBody>,
) -> Result<Json<ApiSuccess<()>>> {
    conversation::update_category_and_alerts(state.db.pool(), &id, body.category, body.alerts)
        .await?;
    Ok(ApiSuccess::new("Category updated successfully", ()))
}
