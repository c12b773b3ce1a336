use axum::{
    Json,
    extract::{Path, Query},
    response::IntoResponse,
};
use kanau::processor::Processor;
use pitbet_core::entities::events::{GetEventById, ListEvents};
use pitbet_core::entities::fights::ListFightsForEvent;
use pitbet_sdk::objects::admin::ListEventsQuery;
use pitbet_sdk::objects::clamp_pagination;
use uuid::Uuid;

use super::PublicApiError;
use crate::api::convert::{event_response, fight_response};
use crate::state::AppState;

/// `GET /events`
pub(super) async fn list_events(
    state: axum::extract::State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, PublicApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);
    let events = state
        .processor()
        .process(ListEvents {
            limit,
            offset,
            status: query.status.map(Into::into),
        })
        .await
        .map_err(PublicApiError::Database)?;
    let response: Vec<_> = events.iter().map(event_response).collect();
    Ok(Json(response))
}

/// `GET /events/{event_id}/fights`
pub(super) async fn list_fights(
    state: axum::extract::State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, PublicApiError> {
    let processor = state.processor();
    processor
        .process(GetEventById { event_id })
        .await
        .map_err(PublicApiError::Database)?
        .ok_or(PublicApiError::NotFound("event not found"))?;

    let fights = processor
        .process(ListFightsForEvent { event_id })
        .await
        .map_err(PublicApiError::Database)?;
    let response: Vec<_> = fights.iter().map(fight_response).collect();
    Ok(Json(response))
}
