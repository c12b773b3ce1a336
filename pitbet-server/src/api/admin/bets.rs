use axum::{Json, extract::Query, response::IntoResponse};
use kanau::processor::Processor;
use pitbet_core::entities::bets::ListBets;
use pitbet_sdk::objects::admin::ListBetsQuery;
use pitbet_sdk::objects::clamp_pagination;

use super::AdminApiError;
use crate::api::convert::bet_response;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /bets`: list bets with pagination and optional filters.
pub(super) async fn list_bets(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListBetsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);
    let bets = state
        .processor()
        .process(ListBets {
            limit,
            offset,
            fight_id: query.fight_id,
            user_id: query.user_id,
            status: query.status.map(Into::into),
        })
        .await
        .map_err(AdminApiError::Database)?;
    let response: Vec<_> = bets.iter().map(bet_response).collect();
    Ok(Json(response))
}
