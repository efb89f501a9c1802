//! Assistance tracking routes.

use axum::extract::{Path, State};
use axum::Json;
use database::{assistance, Assistance, DatabaseError};
use serde::Deserialize;

use crate::error::Result;
use crate::routes::ApiSuccess;
use crate::state::AppState;

/// Latest open assistance record for a conversation, or null.
pub async fn latest_open(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiSuccess<Option<Assistance>>>> {
    let open =
        assistance::find_open_by_conversation_id(state.db.pool(), &conversation_id).await?;
    Ok(ApiSuccess::new("Assistance fetched successfully", open))
}

/// Request body for `POST /api/assistances`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAssistanceBody {
    pub conversation_id: String,
    pub reason: Option<String>,
}

/// Raise a needs-human flag against a conversation.
pub async fn insert(
    State(state): State<AppState>,
    Json(body): Json<InsertAssistanceBody>,
) -> Result<Json<ApiSuccess<Assistance>>> {
    let raised = assistance::insert_assistance(
        state.db.pool(),
        &body.conversation_id,
        body.reason.as_deref(),
    )
    .await?;
    Ok(ApiSuccess::new("Assistance created successfully", raised))
}

/// Resolve an assistance record.
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<()>>> {
    let resolved = assistance::resolve_assistance(state.db.pool(), &id).await?;

    if !resolved {
        return Err(DatabaseError::NotFound {
            entity: "Assistance",
            id,
        }
        .into());
    }

    Ok(ApiSuccess::new("Assistance resolved successfully", ()))
}
