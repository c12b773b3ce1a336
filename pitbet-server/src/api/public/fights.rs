use axum::{
    Json,
    extract::{Path, Query},
    response::IntoResponse,
};
use kanau::processor::Processor;
use pitbet_core::entities::bets::ListOpenBets;
use pitbet_core::entities::fights::GetFightById;
use pitbet_sdk::objects::{Page, clamp_pagination};
use uuid::Uuid;

use super::PublicApiError;
use crate::api::convert::{bet_response, fight_response};
use crate::state::AppState;

/// `GET /fights/{fight_id}`
pub(super) async fn get_fight(
    state: axum::extract::State<AppState>,
    Path(fight_id): Path<Uuid>,
) -> Result<impl IntoResponse, PublicApiError> {
    let fight = state
        .processor()
        .process(GetFightById { fight_id })
        .await
        .map_err(PublicApiError::Database)?
        .ok_or(PublicApiError::NotFound("fight not found"))?;
    Ok(Json(fight_response(&fight)))
}

/// `GET /fights/{fight_id}/open-bets`: bets still waiting for a taker,
/// which players can accept or answer with a PAGO proposal.
pub(super) async fn open_bets(
    state: axum::extract::State<AppState>,
    Path(fight_id): Path<Uuid>,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, PublicApiError> {
    let (limit, offset) = clamp_pagination(page.limit, page.offset);
    let bets = state
        .processor()
        .process(ListOpenBets {
            fight_id,
            limit,
            offset,
        })
        .await
        .map_err(PublicApiError::Database)?;
    let response: Vec<_> = bets.iter().map(bet_response).collect();
    Ok(Json(response))
}
