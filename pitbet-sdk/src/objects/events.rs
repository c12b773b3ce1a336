//! Events (a card of fights at one venue) and fights.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{EventStatus, FightResult, FightStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub venue: Option<String>,
    /// Unix timestamp.
    pub scheduled_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventStatusRequest {
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub event_id: Uuid,
    pub name: String,
    pub venue: Option<String>,
    pub scheduled_at: i64,
    pub status: EventStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFightRequest {
    pub fight_number: i32,
    pub red_entry: CompactString,
    pub blue_entry: CompactString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleFightRequest {
    pub result: FightResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightResponse {
    pub fight_id: Uuid,
    pub event_id: Uuid,
    pub fight_number: i32,
    pub red_entry: CompactString,
    pub blue_entry: CompactString,
    pub status: FightStatus,
    pub result: Option<FightResult>,
    /// Matched stakes on the red corner.
    pub red_total: Decimal,
    /// Matched stakes on the blue corner.
    pub blue_total: Decimal,
    pub bet_count: i32,
    pub matched_count: i32,
    pub created_at: i64,
    pub settled_at: Option<i64>,
}

/// Returned by the settle endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub fight: FightResponse,
    pub pairs_settled: usize,
    /// Unmatched bets refunded at settlement.
    pub bets_refunded: usize,
    /// House commission taken across all pairs.
    pub commission: Decimal,
}
