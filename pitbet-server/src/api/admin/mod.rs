//! Admin API handlers.
//!
//! Called by the operator dashboard. Every request needs the
//! `Pitbet-Admin-Authorization` header with the plaintext admin secret.
//!
//! # Endpoints
//!
//! - `GET  /events`                        – list events
//! - `POST /events`                        – create an event
//! - `POST /events/{event_id}/status`      – change an event's status
//! - `POST /events/{event_id}/fights`      – add a fight to an event
//! - `POST /fights/{fight_id}/open`        – open betting
//! - `POST /fights/{fight_id}/close`       – close betting, refund unmatched bets
//! - `POST /fights/{fight_id}/settle`      – declare the result and pay out
//! - `GET  /bets`                          – list bets (filterable)
//! - `GET  /users/by-name/{username}`      – look up a player
//! - `POST /wallets/{user_id}/deposit`     – credit a wallet
//! - `POST /wallets/{user_id}/withdraw`    – debit a wallet
//! - `GET  /wallets/{user_id}/transactions` – wallet ledger

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pitbet_core::services::BetError;

use crate::state::AppState;

mod bets;
mod events;
mod fights;
mod users;
mod wallets;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route("/events/{event_id}/status", post(events::update_status))
        .route("/events/{event_id}/fights", post(fights::create_fight))
        .route("/fights/{fight_id}/open", post(fights::open_betting))
        .route("/fights/{fight_id}/close", post(fights::close_betting))
        .route("/fights/{fight_id}/settle", post(fights::settle_fight))
        .route("/bets", get(bets::list_bets))
        .route("/users/by-name/{username}", get(users::find_by_name))
        .route("/wallets/{user_id}/deposit", post(wallets::deposit))
        .route("/wallets/{user_id}/withdraw", post(wallets::withdraw))
        .route(
            "/wallets/{user_id}/transactions",
            get(wallets::list_transactions),
        )
}

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Bet(BetError),
    Database(sqlx::Error),
    NotFound(&'static str),
    Conflict(&'static str),
    BadRequest(&'static str),
}

impl From<BetError> for AdminApiError {
    fn from(err: BetError) -> Self {
        Self::Bet(err)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        match self {
            AdminApiError::Bet(e) => super::bet_error_response(e, "admin"),
            AdminApiError::Database(e) => {
                tracing::error!(error = %e, "Admin API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::NotFound(what) => (StatusCode::NOT_FOUND, what).into_response(),
            AdminApiError::Conflict(what) => (StatusCode::CONFLICT, what).into_response(),
            AdminApiError::BadRequest(what) => (StatusCode::BAD_REQUEST, what).into_response(),
        }
    }
}
