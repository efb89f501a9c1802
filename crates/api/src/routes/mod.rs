//! Route handlers for the Helpline API.

pub mod assistances;
pub mod conversations;
pub mod health;
pub mod messages;
pub mod users;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Ingestion
        .route("/api/messages", post(messages::insert_message))
        // Directory endpoints
        .route("/api/users", get(users::list_users))
        .route("/api/conversations", get(conversations::list_conversations))
        .route(
            "/api/conversations/:id/messages",
            get(messages::list_by_conversation),
        )
        .route(
            "/api/conversations/:id/title",
            patch(conversations::update_title),
        )
        .route(
            "/api/conversations/:id/human-override",
            patch(conversations::update_human_override),
        )
        .route(
            "/api/conversations/:id/category",
            patch(conversations::update_category),
        )
        // Assistance tracking
        .route(
            "/api/conversations/:id/assistance",
            get(assistances::latest_open),
        )
        .route("/api/assistances", post(assistances::insert))
        .route("/api/assistances/:id/resolve", post(assistances::resolve))
}

/// Success envelope wrapping response data.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiSuccess<T> {
    /// Wrap `data` in a success envelope.
    pub fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}
