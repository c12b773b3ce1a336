//! Database entities and their SQL.
//!
//! Reads that run on the pool are [`kanau::processor::Processor`] impls on
//! [`DatabaseProcessor`](crate::framework::DatabaseProcessor). Writes inside
//! a bet transaction are `*_tx` associated functions taking the transaction.

pub mod bets;
pub mod events;
pub mod fights;
pub mod pago;
pub mod users;
pub mod wallets;

use pitbet_sdk::objects::common as sdk;

/// Mirrors a database enum onto its same-named wire type in
/// `pitbet_sdk::objects::common`.
macro_rules! mirror_enum {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$name> for sdk::$name {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => sdk::$name::$variant,)+
                }
            }
        }

        impl From<sdk::$name> for $name {
            fn from(value: sdk::$name) -> Self {
                match value {
                    $(sdk::$name::$variant => $name::$variant,)+
                }
            }
        }
    };
}

/// The corner a bet backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "bet_side")]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "fight_result")]
pub enum FightResult {
    Red,
    Blue,
    Draw,
    Cancelled,
}

impl FightResult {
    /// The winning corner, if the result has one.
    pub fn winner(self) -> Option<Side> {
        match self {
            FightResult::Red => Some(Side::Red),
            FightResult::Blue => Some(Side::Blue),
            FightResult::Draw | FightResult::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "fight_status")]
pub enum FightStatus {
    Scheduled,
    BettingOpen,
    BettingClosed,
    Settled,
    Cancelled,
}

impl FightStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FightStatus::Settled | FightStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "event_status")]
pub enum EventStatus {
    Scheduled,
    Live,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "bet_kind")]
pub enum BetKind {
    Flat,
    Pago,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "bet_status")]
pub enum BetStatus {
    Pending,
    Matched,
    Won,
    Lost,
    Refunded,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "proposal_status")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "wallet_transaction_kind")]
pub enum WalletTransactionKind {
    Deposit,
    Withdrawal,
    BetFreeze,
    BetUnfreeze,
    BetWin,
    BetLoss,
    BetRefund,
}

mirror_enum!(Side { Red, Blue });
mirror_enum!(FightResult { Red, Blue, Draw, Cancelled });
mirror_enum!(FightStatus {
    Scheduled,
    BettingOpen,
    BettingClosed,
    Settled,
    Cancelled,
});
mirror_enum!(EventStatus { Scheduled, Live, Completed, Cancelled });
mirror_enum!(BetKind { Flat, Pago });
mirror_enum!(BetStatus {
    Pending,
    Matched,
    Won,
    Lost,
    Refunded,
    Cancelled,
});
mirror_enum!(ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
    Expired,
});
mirror_enum!(WalletTransactionKind {
    Deposit,
    Withdrawal,
    BetFreeze,
    BetUnfreeze,
    BetWin,
    BetLoss,
    BetRefund,
});

/// Current UTC time as stored in `TIMESTAMP` columns.
pub fn utc_now() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_mirror_the_wire_types() {
        assert_eq!(sdk::Side::from(Side::Blue), sdk::Side::Blue);
        assert_eq!(
            FightStatus::from(sdk::FightStatus::BettingClosed),
            FightStatus::BettingClosed
        );
        assert_eq!(
            sdk::WalletTransactionKind::from(WalletTransactionKind::BetRefund),
            sdk::WalletTransactionKind::BetRefund
        );
    }

    #[test]
    fn results_name_their_winner() {
        assert_eq!(FightResult::Red.winner(), Some(Side::Red));
        assert_eq!(FightResult::Blue.winner(), Some(Side::Blue));
        assert_eq!(FightResult::Draw.winner(), None);
        assert_eq!(FightResult::Cancelled.winner(), None);
    }
}
