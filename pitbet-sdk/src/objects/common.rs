//! Enumerations used on the wire.
//!
//! These are the API/DTO versions without `sqlx::Type`. For database
//! operations, use the mirrors in `pitbet-core::entities`.

use serde::{Deserialize, Serialize};

/// The corner a bet backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }
}

/// Declared outcome of a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FightResult {
    Red,
    Blue,
    Draw,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightStatus {
    Scheduled,
    BettingOpen,
    BettingClosed,
    Settled,
    Cancelled,
}

impl FightStatus {
    /// `true` once the fight can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, FightStatus::Settled | FightStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    Live,
    Completed,
    Cancelled,
}

/// `Flat` bets are even-money; `Pago` bets were matched through an
/// unequal-stake proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetKind {
    Flat,
    Pago,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Matched,
    Won,
    Lost,
    Refunded,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletTransactionKind {
    Deposit,
    Withdrawal,
    BetFreeze,
    BetUnfreeze,
    BetWin,
    BetLoss,
    BetRefund,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Blue => write!(f, "blue"),
        }
    }
}

impl std::fmt::Display for FightResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FightResult::Red => write!(f, "red"),
            FightResult::Blue => write!(f, "blue"),
            FightResult::Draw => write!(f, "draw"),
            FightResult::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(serde_json::to_string(&Side::Red).unwrap(), "\"red\"");
        assert_eq!(
            serde_json::to_string(&FightStatus::BettingOpen).unwrap(),
            "\"betting_open\""
        );
        assert_eq!(
            serde_json::to_string(&WalletTransactionKind::BetRefund).unwrap(),
            "\"bet_refund\""
        );
        let result: FightResult = serde_json::from_str("\"draw\"").unwrap();
        assert_eq!(result, FightResult::Draw);
    }

    #[test]
    fn opposite_side() {
        assert_eq!(Side::Red.opposite(), Side::Blue);
        assert_eq!(Side::Blue.opposite().opposite(), Side::Blue);
    }
}
