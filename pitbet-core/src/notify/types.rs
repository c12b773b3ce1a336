use crate::entities::bets::Bet;
use crate::entities::pago::PagoProposal;
use crate::entities::{FightResult, FightStatus, ProposalStatus};
use crate::rules::ledger::WalletBalance;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A committed change on the betting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetEvent {
    /// A bet entered the open book.
    BetPlaced { bet: Bet },
    BetMatched {
        fight_id: Uuid,
        bet_id: Uuid,
        counter_bet_id: Uuid,
        red_total: Decimal,
        blue_total: Decimal,
    },
    BetCancelled { fight_id: Uuid, bet_id: Uuid },
    /// An unmatched bet was returned to its owner when betting ended.
    BetRefunded { fight_id: Uuid, bet_id: Uuid },
    PagoProposed {
        fight_id: Uuid,
        proposal: PagoProposal,
    },
    PagoResolved {
        fight_id: Uuid,
        proposal_id: Uuid,
        bet_id: Uuid,
        status: ProposalStatus,
    },
    FightStatusChanged { fight_id: Uuid, status: FightStatus },
    FightSettled { fight_id: Uuid, result: FightResult },
    /// Not scoped to a fight.
    WalletChanged { user_id: Uuid, balance: WalletBalance },
}

impl BetEvent {
    pub fn fight_id(&self) -> Option<Uuid> {
        match self {
            BetEvent::BetPlaced { bet } => Some(bet.fight_id),
            BetEvent::BetMatched { fight_id, .. }
            | BetEvent::BetCancelled { fight_id, .. }
            | BetEvent::BetRefunded { fight_id, .. }
            | BetEvent::PagoProposed { fight_id, .. }
            | BetEvent::PagoResolved { fight_id, .. }
            | BetEvent::FightStatusChanged { fight_id, .. }
            | BetEvent::FightSettled { fight_id, .. } => Some(*fight_id),
            BetEvent::WalletChanged { .. } => None,
        }
    }

    /// Whether no further events will follow for the fight.
    pub fn ends_fight(&self) -> bool {
        match self {
            BetEvent::FightSettled { .. } => true,
            BetEvent::FightStatusChanged { status, .. } => status.is_terminal(),
            _ => false,
        }
    }
}
