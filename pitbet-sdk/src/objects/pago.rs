//! PAGO proposals: an offer to take the other side of an open bet with a
//! different stake.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::admin::default_limit;
use super::common::ProposalStatus;
use crate::signature::Signature;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposePagoRequest {
    pub user_id: Uuid,
    pub bet_id: Uuid,
    /// The proposer's own stake.
    pub amount: Decimal,
}

impl Signature for ProposePagoRequest {}

/// Used for accept, reject and withdraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvePagoRequest {
    pub user_id: Uuid,
    pub proposal_id: Uuid,
}

impl Signature for ResolvePagoRequest {}

/// Lists pending proposals made against the user's open bets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingPagoRequest {
    pub user_id: Uuid,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Signature for IncomingPagoRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagoProposalResponse {
    pub proposal_id: Uuid,
    pub bet_id: Uuid,
    pub proposer_id: Uuid,
    pub amount: Decimal,
    pub status: ProposalStatus,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}
