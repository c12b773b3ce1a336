use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::admin::default_limit;
use super::common::WalletTransactionKind;
use crate::signature::Signature;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetWalletRequest {
    pub user_id: Uuid,
}

impl Signature for GetWalletRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWalletTransactionsRequest {
    pub user_id: Uuid,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Signature for ListWalletTransactionsRequest {}

/// Operator deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAdjustment {
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletResponse {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub frozen: Decimal,
    /// `balance - frozen`
    pub available: Decimal,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransactionResponse {
    pub id: i64,
    pub user_id: Uuid,
    pub kind: WalletTransactionKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub frozen_after: Decimal,
    pub bet_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: i64,
}
