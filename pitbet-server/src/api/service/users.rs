use axum::{Json, http::StatusCode, response::IntoResponse};
use pitbet_sdk::objects::RegisterUserRequest;

use super::ServiceApiError;
use crate::api::convert::user_response;
use crate::api::extractors::SignedBody;
use crate::state::AppState;

/// `POST /users`: register a player and open an empty wallet.
pub(super) async fn register_user(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<RegisterUserRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let user = state
        .bets
        .register_user(payload.username, payload.display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(user_response(&user))))
}
