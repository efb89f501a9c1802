//! User directory routes.

use axum::extract::State;
use axum::Json;
use database::{user, User};

use crate::error::Result;
use crate::routes::ApiSuccess;
use crate::state::AppState;

/// List all users, most recent first.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<ApiSuccess<Vec<User>>>> {
    let users = user::list_users(state.db.pool()).await?;
    Ok(ApiSuccess::new("Users fetched successfully", users))
}
