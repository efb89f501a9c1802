//! Message ingestion and listing routes.

use axum::extract::{Path, State};
use axum::Json;
use base64::prelude::{Engine, BASE64_STANDARD};
use database::{MessageWithAttachments, Sender};
use ingest::{IngestReceipt, IngestRequest, MediaCategory, MediaPayload};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::routes::ApiSuccess;
use crate::state::AppState;

/// Request body for `POST /api/messages`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMessageBody {
    pub sender_type: String,
    pub phone: String,
    pub name: Option<String>,
    #[serde(default)]
    pub content: String,
    pub media: Option<MediaBody>,
}

/// Inline media attachment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaBody {
    pub file_name: String,
    pub mime_type: String,
    pub category: MediaCategory,
    /// Base64-encoded file content.
    pub data: String,
}

/// Ingest one inbound message.
pub async fn insert_message(
    State(state): State<AppState>,
    Json(body): Json<InsertMessageBody>,
) -> Result<Json<ApiSuccess<IngestReceipt>>> {
    let sender_type = match body.sender_type.as_str() {
        "user" => Sender::User,
        "ai" => Sender::Ai,
        "admin" => Sender::Admin,
        _ => {
            return Err(ApiError::validation(
                "INVALID_SENDER_TYPE",
                "senderType must be 'user', 'ai' or 'admin'",
            ));
        }
    };

    if body.phone.trim().is_empty() {
        return Err(ApiError::validation("MISSING_PARAM", "phone is required"));
    }

    // Content may be empty only when an attachment is present.
    if body.content.is_empty() && body.media.is_none() {
        return Err(ApiError::validation(
            "EMPTY_MESSAGE",
            "content is required when no media is attached",
        ));
    }

    let media = body.media.map(decode_media).transpose()?;

    let receipt = state
        .ingestor
        .execute(IngestRequest {
            sender_type,
            phone: body.phone,
            name: body.name,
            content: body.content,
            media,
        })
        .await?;

    Ok(ApiSuccess::new("Message created successfully", receipt))
}

/// List a conversation's messages oldest-first, with attachments.
pub async fn list_by_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ApiSuccess<Vec<MessageWithAttachments>>>> {
    let messages =
        database::message::find_by_conversation_id(state.db.pool(), &conversation_id).await?;

    Ok(ApiSuccess::new("Messages fetched successfully", messages))
}

fn decode_media(body: MediaBody) -> Result<MediaPayload> {
    let bytes = BASE64_STANDARD.decode(body.data.as_bytes()).map_err(|e| {
        ApiError::validation("INVALID_MEDIA", format!("media.data is not valid base64: {e}"))
    })?;

    Ok(MediaPayload {
        bytes,
        file_name: body.file_name,
        mime_type: body.mime_type,
        category: body.category,
    })
}
