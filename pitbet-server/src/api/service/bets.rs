use axum::{Json, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use pitbet_core::entities::bets::ListBets;
use pitbet_sdk::objects::{
    AcceptBetRequest, CancelBetRequest, MyBetsRequest, PlaceBetRequest, clamp_pagination,
};

use super::ServiceApiError;
use crate::api::convert::bet_response;
use crate::api::extractors::SignedBody;
use crate::state::AppState;

/// `POST /bets`: place a flat bet.
///
/// Responds `201` with the bet; its status is `matched` when an opposite
/// bet of the same amount was waiting.
pub(super) async fn place_bet(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<PlaceBetRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let bet = state
        .bets
        .create_bet(
            payload.user_id,
            payload.fight_id,
            payload.side.into(),
            payload.amount,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(bet_response(&bet))))
}

/// `POST /bets/accept`: returns the acceptor's new bet.
pub(super) async fn accept_bet(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<AcceptBetRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let bet = state
        .bets
        .accept_bet(payload.user_id, payload.bet_id)
        .await?;
    Ok(Json(bet_response(&bet)))
}

/// `POST /bets/cancel`
pub(super) async fn cancel_bet(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<CancelBetRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let bet = state
        .bets
        .cancel_bet(payload.user_id, payload.bet_id)
        .await?;
    Ok(Json(bet_response(&bet)))
}

/// `POST /bets/mine`
pub(super) async fn my_bets(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<MyBetsRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let (limit, offset) = clamp_pagination(payload.limit, payload.offset);
    let bets = state
        .processor()
        .process(ListBets {
            limit,
            offset,
            fight_id: payload.fight_id,
            user_id: Some(payload.user_id),
            status: payload.status.map(Into::into),
        })
        .await
        .map_err(ServiceApiError::Database)?;
    let response: Vec<_> = bets.iter().map(bet_response).collect();
    Ok(Json(response))
}
