//! HTTP API.
//!
//! - [`service`]: player actions, authenticated with a signed body
//! - [`admin`]: operator actions, authenticated with the admin secret
//! - [`public`]: read-only fight data and the live fight stream

pub mod admin;
pub mod convert;
pub mod extractors;
pub mod public;
pub mod service;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pitbet_core::rules::ledger::LedgerError;
use pitbet_core::services::BetError;

/// Shared mapping from bet service failures to HTTP responses.
pub(crate) fn bet_error_response(err: BetError, area: &'static str) -> Response {
    let status = match &err {
        BetError::Database(e) => {
            tracing::error!(error = %e, area, "Database error");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response();
        }
        BetError::Ledger { source, user_id } => match source {
            LedgerError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::NonPositiveAmount(_) | LedgerError::SubCentAmount(_) => {
                StatusCode::BAD_REQUEST
            }
            LedgerError::FrozenUnderflow { .. } | LedgerError::SameSidePair => {
                tracing::error!(error = %source, %user_id, area, "Ledger inconsistency");
                return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                    .into_response();
            }
        },
        BetError::FightNotFound(_)
        | BetError::BetNotFound(_)
        | BetError::ProposalNotFound(_)
        | BetError::UserNotFound(_) => StatusCode::NOT_FOUND,
        BetError::FightNotOpen { .. }
        | BetError::InvalidFightState { .. }
        | BetError::BetNotPending { .. }
        | BetError::ProposalNotPending { .. }
        | BetError::DuplicateProposal
        | BetError::UsernameTaken(_)
        | BetError::AlreadySettled(_) => StatusCode::CONFLICT,
        BetError::NotBetOwner(_) | BetError::NotProposer(_) | BetError::UserInactive(_) => {
            StatusCode::FORBIDDEN
        }
        BetError::SelfMatch
        | BetError::AmountOutOfRange { .. }
        | BetError::PagoRatioOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    tracing::debug!(error = %err, area, "Bet request rejected");
    (status, err.to_string()).into_response()
}
