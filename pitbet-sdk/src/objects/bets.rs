use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::admin::default_limit;
use super::common::{BetKind, BetStatus, Side};
use crate::signature::Signature;

/// Places a flat bet. The server tries to match it immediately against the
/// oldest open bet of the same amount on the opposite side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceBetRequest {
    pub user_id: Uuid,
    pub fight_id: Uuid,
    pub side: Side,
    pub amount: Decimal,
}

impl Signature for PlaceBetRequest {}

/// Takes the other side of an open bet at the same stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptBetRequest {
    pub user_id: Uuid,
    pub bet_id: Uuid,
}

impl Signature for AcceptBetRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBetRequest {
    pub user_id: Uuid,
    pub bet_id: Uuid,
}

impl Signature for CancelBetRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyBetsRequest {
    pub user_id: Uuid,
    pub fight_id: Option<Uuid>,
    pub status: Option<BetStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Signature for MyBetsRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetResponse {
    pub bet_id: Uuid,
    pub fight_id: Uuid,
    pub user_id: Uuid,
    pub side: Side,
    pub amount: Decimal,
    pub kind: BetKind,
    pub status: BetStatus,
    pub matched_bet_id: Option<Uuid>,
    /// Total credited on settlement (stake included), once settled.
    pub payout: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub created_at: i64,
    pub matched_at: Option<i64>,
    pub settled_at: Option<i64>,
}
