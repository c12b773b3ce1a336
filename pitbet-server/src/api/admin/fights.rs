use axum::{Json, extract::Path, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use pitbet_core::entities::events::GetEventById;
use pitbet_core::entities::fights::CreateFight;
use pitbet_sdk::objects::{CreateFightRequest, SettleFightRequest};
use uuid::Uuid;

use super::AdminApiError;
use crate::api::convert::{fight_response, settlement_response};
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `POST /events/{event_id}/fights`: fight numbers are unique per event.
pub(super) async fn create_fight(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(event_id): Path<Uuid>,
    Json(request): Json<CreateFightRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    if request.fight_number <= 0 {
        return Err(AdminApiError::BadRequest("fight_number must be positive"));
    }
    if request.red_entry.trim().is_empty() || request.blue_entry.trim().is_empty() {
        return Err(AdminApiError::BadRequest("both entries must be named"));
    }

    let processor = state.processor();
    processor
        .process(GetEventById { event_id })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::NotFound("event not found"))?;

    let fight = match processor
        .process(CreateFight {
            event_id,
            fight_number: request.fight_number,
            red_entry: request.red_entry,
            blue_entry: request.blue_entry,
        })
        .await
    {
        Ok(fight) => fight,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AdminApiError::Conflict("fight number already used"));
        }
        Err(e) => return Err(AdminApiError::Database(e)),
    };

    tracing::info!(
        fight_id = %fight.id,
        %event_id,
        fight_number = fight.fight_number,
        "Fight created"
    );
    Ok((StatusCode::CREATED, Json(fight_response(&fight))))
}

/// `POST /fights/{fight_id}/open`
pub(super) async fn open_betting(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(fight_id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    let fight = state.bets.open_betting(fight_id).await?;
    Ok(Json(fight_response(&fight)))
}

/// `POST /fights/{fight_id}/close`: unmatched bets are refunded.
pub(super) async fn close_betting(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(fight_id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    let fight = state.bets.close_betting(fight_id).await?;
    Ok(Json(fight_response(&fight)))
}

/// `POST /fights/{fight_id}/settle`
pub(super) async fn settle_fight(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(fight_id): Path<Uuid>,
    Json(request): Json<SettleFightRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let summary = state
        .bets
        .settle_fight(fight_id, request.result.into())
        .await?;
    Ok(Json(settlement_response(&summary)))
}
