//! Service API handlers.
//!
//! Called by the player-facing backend. Every request body is signed with
//! the service secret and verified via the `Pitbet-Signature` header; the
//! body names the acting `user_id`.
//!
//! # Endpoints
//!
//! - `POST /users`                – register a player
//! - `POST /wallets/get`          – wallet balance
//! - `POST /wallets/transactions` – wallet ledger, newest first
//! - `POST /bets`                 – place a bet (auto-matched when possible)
//! - `POST /bets/accept`          – take the other side of an open bet
//! - `POST /bets/cancel`          – cancel an unmatched bet
//! - `POST /bets/mine`            – the player's bets
//! - `POST /pago/propose`         – offer an unequal stake against an open bet
//! - `POST /pago/accept`          – bet owner accepts a proposal
//! - `POST /pago/reject`          – bet owner rejects a proposal
//! - `POST /pago/withdraw`        – proposer withdraws a proposal
//! - `POST /pago/incoming`        – pending proposals on the player's bets

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use pitbet_core::services::BetError;

use crate::state::AppState;

mod bets;
mod pago;
mod users;
mod wallets;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::register_user))
        .route("/wallets/get", post(wallets::get_wallet))
        .route("/wallets/transactions", post(wallets::list_transactions))
        .route("/bets", post(bets::place_bet))
        .route("/bets/accept", post(bets::accept_bet))
        .route("/bets/cancel", post(bets::cancel_bet))
        .route("/bets/mine", post(bets::my_bets))
        .route("/pago/propose", post(pago::propose))
        .route("/pago/accept", post(pago::accept))
        .route("/pago/reject", post(pago::reject))
        .route("/pago/withdraw", post(pago::withdraw))
        .route("/pago/incoming", post(pago::incoming))
}

/// Errors that can occur in Service API handlers.
#[derive(Debug)]
pub(crate) enum ServiceApiError {
    Bet(BetError),
    Database(sqlx::Error),
    WalletNotFound,
}

impl From<BetError> for ServiceApiError {
    fn from(err: BetError) -> Self {
        Self::Bet(err)
    }
}

impl IntoResponse for ServiceApiError {
    fn into_response(self) -> Response {
        match self {
            ServiceApiError::Bet(e) => super::bet_error_response(e, "service"),
            ServiceApiError::Database(e) => {
                tracing::error!(error = %e, "Service API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            ServiceApiError::WalletNotFound => {
                (StatusCode::NOT_FOUND, "wallet not found").into_response()
            }
        }
    }
}
