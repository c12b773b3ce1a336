use axum::{Json, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use pitbet_core::entities::pago::ListIncomingProposals;
use pitbet_sdk::objects::{
    IncomingPagoRequest, ProposePagoRequest, ResolvePagoRequest, clamp_pagination,
};

use super::ServiceApiError;
use crate::api::convert::{bet_response, proposal_response};
use crate::api::extractors::SignedBody;
use crate::state::AppState;

/// `POST /pago/propose`: the proposer's stake is frozen until the
/// proposal is resolved.
pub(super) async fn propose(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<ProposePagoRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let proposal = state
        .bets
        .propose_pago(payload.user_id, payload.bet_id, payload.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(proposal_response(&proposal))))
}

/// `POST /pago/accept`: returns the proposer's new matched bet.
pub(super) async fn accept(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<ResolvePagoRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let bet = state
        .bets
        .accept_pago(payload.user_id, payload.proposal_id)
        .await?;
    Ok(Json(bet_response(&bet)))
}

/// `POST /pago/reject`
pub(super) async fn reject(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<ResolvePagoRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let proposal = state
        .bets
        .reject_pago(payload.user_id, payload.proposal_id)
        .await?;
    Ok(Json(proposal_response(&proposal)))
}

/// `POST /pago/withdraw`
pub(super) async fn withdraw(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<ResolvePagoRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let proposal = state
        .bets
        .withdraw_pago(payload.user_id, payload.proposal_id)
        .await?;
    Ok(Json(proposal_response(&proposal)))
}

/// `POST /pago/incoming`
pub(super) async fn incoming(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<IncomingPagoRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let (limit, offset) = clamp_pagination(payload.limit, payload.offset);
    let proposals = state
        .processor()
        .process(ListIncomingProposals {
            owner_id: payload.user_id,
            limit,
            offset,
        })
        .await
        .map_err(ServiceApiError::Database)?;
    let response: Vec<_> = proposals.iter().map(proposal_response).collect();
    Ok(Json(response))
}
