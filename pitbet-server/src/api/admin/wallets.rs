use axum::{
    Json,
    extract::{Path, Query},
    response::IntoResponse,
};
use kanau::processor::Processor;
use pitbet_core::entities::wallets::ListWalletTransactions;
use pitbet_sdk::objects::{Page, WalletAdjustment, clamp_pagination};
use uuid::Uuid;

use super::AdminApiError;
use crate::api::convert::{wallet_response, wallet_transaction_response};
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `POST /wallets/{user_id}/deposit`
pub(super) async fn deposit(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(user_id): Path<Uuid>,
    Json(adjustment): Json<WalletAdjustment>,
) -> Result<impl IntoResponse, AdminApiError> {
    let wallet = state
        .bets
        .deposit(user_id, adjustment.amount, adjustment.note)
        .await?;
    Ok(Json(wallet_response(&wallet)))
}

/// `POST /wallets/{user_id}/withdraw`: only the available (unfrozen)
/// balance can be withdrawn.
pub(super) async fn withdraw(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(user_id): Path<Uuid>,
    Json(adjustment): Json<WalletAdjustment>,
) -> Result<impl IntoResponse, AdminApiError> {
    let wallet = state
        .bets
        .withdraw(user_id, adjustment.amount, adjustment.note)
        .await?;
    Ok(Json(wallet_response(&wallet)))
}

/// `GET /wallets/{user_id}/transactions`
pub(super) async fn list_transactions(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(user_id): Path<Uuid>,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, AdminApiError> {
    let (limit, offset) = clamp_pagination(page.limit, page.offset);
    let rows = state
        .processor()
        .process(ListWalletTransactions {
            user_id,
            limit,
            offset,
        })
        .await
        .map_err(AdminApiError::Database)?;
    let response: Vec<_> = rows.iter().map(wallet_transaction_response).collect();
    Ok(Json(response))
}
