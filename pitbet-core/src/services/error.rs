use crate::entities::{BetStatus, FightStatus, ProposalStatus};
use crate::rules::ledger::LedgerError;
use compact_str::CompactString;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BetError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("wallet of user {user_id}: {source}")]
    Ledger {
        user_id: Uuid,
        #[source]
        source: LedgerError,
    },
    #[error("fight {0} not found")]
    FightNotFound(Uuid),
    #[error("fight {fight_id} is not open for betting ({status:?})")]
    FightNotOpen { fight_id: Uuid, status: FightStatus },
    #[error("fight {fight_id} cannot do that while {status:?}")]
    InvalidFightState { fight_id: Uuid, status: FightStatus },
    #[error("bet {0} not found")]
    BetNotFound(Uuid),
    #[error("bet {bet_id} is no longer pending ({status:?})")]
    BetNotPending { bet_id: Uuid, status: BetStatus },
    #[error("bet {0} belongs to another user")]
    NotBetOwner(Uuid),
    #[error("proposal {0} was made by another user")]
    NotProposer(Uuid),
    #[error("cannot take the other side of your own bet")]
    SelfMatch,
    #[error("amount {amount} outside [{min}, {max}]")]
    AmountOutOfRange {
        amount: Decimal,
        min: Decimal,
        max: Decimal,
    },
    #[error("stakes {amount} and {counter} exceed the ratio limit {max_ratio}")]
    PagoRatioOutOfRange {
        amount: Decimal,
        counter: Decimal,
        max_ratio: Decimal,
    },
    #[error("proposal {0} not found")]
    ProposalNotFound(Uuid),
    #[error("proposal {proposal_id} is already {status:?}")]
    ProposalNotPending {
        proposal_id: Uuid,
        status: ProposalStatus,
    },
    #[error("a pending proposal on this bet already exists")]
    DuplicateProposal,
    #[error("user {0} not found")]
    UserNotFound(Uuid),
    #[error("user {0} is inactive")]
    UserInactive(Uuid),
    #[error("username {0} is taken")]
    UsernameTaken(CompactString),
    #[error("fight {0} is already settled")]
    AlreadySettled(Uuid),
}

impl BetError {
    pub(crate) fn ledger(user_id: Uuid) -> impl FnOnce(LedgerError) -> BetError {
        move |source| BetError::Ledger { user_id, source }
    }
}
