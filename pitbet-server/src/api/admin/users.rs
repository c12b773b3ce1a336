use axum::{Json, extract::Path, response::IntoResponse};
use kanau::processor::Processor;
use pitbet_core::entities::users::GetUserByUsername;

use super::AdminApiError;
use crate::api::convert::user_response;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /users/by-name/{username}`
pub(super) async fn find_by_name(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    let user = state
        .processor()
        .process(GetUserByUsername { username })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::NotFound("user not found"))?;
    Ok(Json(user_response(&user)))
}
