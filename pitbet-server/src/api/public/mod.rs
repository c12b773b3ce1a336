//! Public API handlers. Read-only, no authentication.
//!
//! # Endpoints
//!
//! - `GET /events`                      – list events
//! - `GET /events/{event_id}/fights`    – fights of an event in card order
//! - `GET /fights/{fight_id}`           – one fight with its matched totals
//! - `GET /fights/{fight_id}/open-bets` – unmatched bets, oldest first
//! - `GET /fights/{fight_id}/ws`        – WebSocket fight stream

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::state::AppState;

mod events;
mod fights;
mod ws;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events))
        .route("/events/{event_id}/fights", get(events::list_fights))
        .route("/fights/{fight_id}", get(fights::get_fight))
        .route("/fights/{fight_id}/open-bets", get(fights::open_bets))
        .route("/fights/{fight_id}/ws", get(ws::fight_stream))
}

#[derive(Debug)]
pub(crate) enum PublicApiError {
    Database(sqlx::Error),
    NotFound(&'static str),
}

impl IntoResponse for PublicApiError {
    fn into_response(self) -> Response {
        match self {
            PublicApiError::Database(e) => {
                tracing::error!(error = %e, "Public API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            PublicApiError::NotFound(what) => (StatusCode::NOT_FOUND, what).into_response(),
        }
    }
}
