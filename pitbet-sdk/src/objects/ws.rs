//! WebSocket message types for the fight stream.
//!
//! The `GET /api/v1/public/fights/{fight_id}/ws` endpoint upgrades to a
//! WebSocket connection and pushes [`FightStreamMessage`] JSON frames.
//!
//! # Protocol
//!
//! 1. The server sends a [`FightStreamMessage::Snapshot`] with the current
//!    fight state immediately after the upgrade.
//! 2. [`FightStreamMessage::Update`] frames follow for every change on the
//!    fight. When the server falls behind it sends a fresh snapshot instead.
//! 3. After a terminal status (`settled`, `cancelled`) the server sends a
//!    final snapshot and a normal close frame.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bets::BetResponse;
use super::common::{FightResult, FightStatus, ProposalStatus};
use super::events::FightResponse;
use super::pago::PagoProposalResponse;

/// Server-to-client WebSocket message.
///
/// ```json
/// {"type":"snapshot","fight":{ ... }}
/// {"type":"update","update":{"kind":"bet_matched", ...}}
/// {"type":"error","code":4004,"reason":"fight not found"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FightStreamMessage {
    Snapshot { fight: FightResponse },
    Update { update: FightUpdate },
    Error { code: u16, reason: String },
}

/// A single change on a fight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FightUpdate {
    BetPlaced {
        bet: BetResponse,
    },
    BetMatched {
        bet_id: Uuid,
        counter_bet_id: Uuid,
        red_total: Decimal,
        blue_total: Decimal,
    },
    BetCancelled {
        bet_id: Uuid,
    },
    /// Unmatched when betting closed; the stake went back to the owner.
    BetRefunded {
        bet_id: Uuid,
    },
    PagoProposed {
        proposal: PagoProposalResponse,
    },
    PagoResolved {
        proposal_id: Uuid,
        bet_id: Uuid,
        status: ProposalStatus,
    },
    StatusChanged {
        status: FightStatus,
    },
    Settled {
        result: FightResult,
    },
}

/// Well-known WebSocket close codes used by the fight stream.
pub struct WsCloseCode;

impl WsCloseCode {
    pub const NORMAL: u16 = 1000;
    pub const INTERNAL_ERROR: u16 = 1011;
    pub const FIGHT_NOT_FOUND: u16 = 4004;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_internally_tagged() {
        let msg = FightStreamMessage::Update {
            update: FightUpdate::Settled {
                result: FightResult::Red,
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["update"]["kind"], "settled");
        assert_eq!(json["update"]["result"], "red");

        let err: FightStreamMessage =
            serde_json::from_str(r#"{"type":"error","code":4004,"reason":"fight not found"}"#)
                .unwrap();
        assert!(matches!(
            err,
            FightStreamMessage::Error {
                code: WsCloseCode::FIGHT_NOT_FOUND,
                ..
            }
        ));
    }

    #[test]
    fn decimals_travel_as_strings() {
        let update = FightUpdate::BetMatched {
            bet_id: Uuid::nil(),
            counter_bet_id: Uuid::nil(),
            red_total: Decimal::new(15050, 2),
            blue_total: Decimal::new(100, 0),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["red_total"], "150.50");
        assert_eq!(json["blue_total"], "100");
    }
}
