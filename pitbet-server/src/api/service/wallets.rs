use axum::{Json, response::IntoResponse};
use kanau::processor::Processor;
use pitbet_core::entities::wallets::{GetWallet, ListWalletTransactions};
use pitbet_sdk::objects::{GetWalletRequest, ListWalletTransactionsRequest, clamp_pagination};

use super::ServiceApiError;
use crate::api::convert::{wallet_response, wallet_transaction_response};
use crate::api::extractors::SignedBody;
use crate::state::AppState;

/// `POST /wallets/get`
pub(super) async fn get_wallet(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<GetWalletRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let wallet = state
        .processor()
        .process(GetWallet {
            user_id: payload.user_id,
        })
        .await
        .map_err(ServiceApiError::Database)?
        .ok_or(ServiceApiError::WalletNotFound)?;
    Ok(Json(wallet_response(&wallet)))
}

/// `POST /wallets/transactions`: newest first.
pub(super) async fn list_transactions(
    state: axum::extract::State<AppState>,
    SignedBody(payload): SignedBody<ListWalletTransactionsRequest>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let (limit, offset) = clamp_pagination(payload.limit, payload.offset);
    let rows = state
        .processor()
        .process(ListWalletTransactions {
            user_id: payload.user_id,
            limit,
            offset,
        })
        .await
        .map_err(ServiceApiError::Database)?;
    let response: Vec<_> = rows.iter().map(wallet_transaction_response).collect();
    Ok(Json(response))
}
