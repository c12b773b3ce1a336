use axum::{
    Json,
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use kanau::processor::Processor;
use pitbet_core::entities::events::{CreateEvent, ListEvents, UpdateEventStatus};
use pitbet_sdk::objects::admin::ListEventsQuery;
use pitbet_sdk::objects::{CreateEventRequest, UpdateEventStatusRequest, clamp_pagination};
use uuid::Uuid;

use super::AdminApiError;
use crate::api::convert::{event_response, from_unix};
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /events`: newest scheduled first, optionally filtered by status.
pub(super) async fn list_events(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);
    let events = state
        .processor()
        .process(ListEvents {
            limit,
            offset,
            status: query.status.map(Into::into),
        })
        .await
        .map_err(AdminApiError::Database)?;
    let response: Vec<_> = events.iter().map(event_response).collect();
    Ok(Json(response))
}

/// `POST /events`
pub(super) async fn create_event(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Json(request): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    if request.name.trim().is_empty() {
        return Err(AdminApiError::BadRequest("event name must not be empty"));
    }
    let scheduled_at = from_unix(request.scheduled_at)
        .ok_or(AdminApiError::BadRequest("scheduled_at is out of range"))?;

    let event = state
        .processor()
        .process(CreateEvent {
            name: request.name,
            venue: request.venue,
            scheduled_at,
        })
        .await
        .map_err(AdminApiError::Database)?;

    tracing::info!(event_id = %event.id, name = %event.name, "Event created");
    Ok((StatusCode::CREATED, Json(event_response(&event))))
}

/// `POST /events/{event_id}/status`
pub(super) async fn update_status(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(event_id): Path<Uuid>,
    Json(request): Json<UpdateEventStatusRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state
        .processor()
        .process(UpdateEventStatus {
            event_id,
            status: request.status.into(),
        })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::NotFound("event not found"))?;

    tracing::info!(%event_id, status = ?event.status, "Event status changed");
    Ok(Json(event_response(&event)))
}
