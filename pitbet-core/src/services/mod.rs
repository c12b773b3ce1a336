//! Transactional bet lifecycle.
//!
//! Every public operation on [`BetService`] runs in one database
//! transaction. Lock order inside a transaction is always: fight row, bet
//! rows, proposal rows, then all wallets at once in `user_id` order. Events
//! are collected while the transaction runs and published only after it
//! commits.

mod bets;
mod error;
mod fights;
mod pago;
mod wallet_book;
mod wallets;

#[cfg(test)]
mod tests;

pub use error::BetError;
pub use fights::SettlementSummary;

use crate::config::{BettingRules, ConfigStore};
use crate::entities::bets::Bet;
use crate::entities::fights::{Fight, corner_amounts};
use crate::entities::pago::PagoProposal;
use crate::entities::users::User;
use crate::entities::{BetKind, FightStatus, ProposalStatus, WalletTransactionKind};
use crate::framework::{DatabaseProcessor, PgTx};
use crate::notify::{BetEvent, EventBus};
use smallvec::SmallVec;
use uuid::Uuid;
use wallet_book::{Entry, WalletBook};

type Events = SmallVec<[BetEvent; 4]>;

#[derive(Clone)]
pub struct BetService {
    db: DatabaseProcessor,
    bus: EventBus,
    rules: ConfigStore<BettingRules>,
}

impl BetService {
    pub fn new(db: DatabaseProcessor, bus: EventBus, rules: ConfigStore<BettingRules>) -> Self {
        Self { db, bus, rules }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn rules(&self) -> &ConfigStore<BettingRules> {
        &self.rules
    }

    async fn begin(&self) -> Result<PgTx<'static>, BetError> {
        Ok(self.db.pool.begin().await?)
    }

    async fn finish(&self, tx: PgTx<'static>, events: Events) -> Result<(), BetError> {
        tx.commit().await?;
        self.bus.publish_all(events);
        Ok(())
    }
}

async fn lock_fight(tx: &mut PgTx<'_>, fight_id: Uuid) -> Result<Fight, BetError> {
    Fight::lock_tx(tx, fight_id)
        .await?
        .ok_or(BetError::FightNotFound(fight_id))
}

async fn lock_open_fight(tx: &mut PgTx<'_>, fight_id: Uuid) -> Result<Fight, BetError> {
    let fight = lock_fight(tx, fight_id).await?;
    if fight.status != FightStatus::BettingOpen {
        return Err(BetError::FightNotOpen {
            fight_id,
            status: fight.status,
        });
    }
    Ok(fight)
}

async fn find_bet(tx: &mut PgTx<'_>, bet_id: Uuid) -> Result<Bet, BetError> {
    Bet::find_tx(tx, bet_id)
        .await?
        .ok_or(BetError::BetNotFound(bet_id))
}

async fn lock_bet(tx: &mut PgTx<'_>, bet_id: Uuid) -> Result<Bet, BetError> {
    Bet::lock_tx(tx, bet_id)
        .await?
        .ok_or(BetError::BetNotFound(bet_id))
}

async fn ensure_active_user(tx: &mut PgTx<'_>, user_id: Uuid) -> Result<User, BetError> {
    let user = User::find_tx(tx, user_id)
        .await?
        .ok_or(BetError::UserNotFound(user_id))?;
    if !user.is_active {
        return Err(BetError::UserInactive(user_id));
    }
    Ok(user)
}

/// Link two pending bets and add them to the fight totals. Returns `bet`
/// as stored after the match.
async fn match_pair(
    tx: &mut PgTx<'_>,
    bet: &Bet,
    counter: &Bet,
    kind: BetKind,
    events: &mut Events,
) -> Result<Bet, BetError> {
    Bet::mark_matched_pair_tx(tx, bet.id, counter.id, kind).await?;
    let (red, blue) = corner_amounts(bet.side, bet.amount, counter.amount);
    let (red_total, blue_total) = Fight::add_matched_pair_tx(tx, bet.fight_id, red, blue).await?;

    tracing::info!(
        fight_id = %bet.fight_id,
        bet_id = %bet.id,
        counter_bet_id = %counter.id,
        ?kind,
        "Bets matched"
    );
    events.push(BetEvent::BetMatched {
        fight_id: bet.fight_id,
        bet_id: bet.id,
        counter_bet_id: counter.id,
        red_total,
        blue_total,
    });
    find_bet(tx, bet.id).await
}

/// Close pending proposals with `status` and release the proposers' funds.
async fn release_proposals(
    tx: &mut PgTx<'_>,
    book: &mut WalletBook,
    fight_id: Uuid,
    proposals: Vec<PagoProposal>,
    status: ProposalStatus,
    events: &mut Events,
) -> Result<Vec<PagoProposal>, BetError> {
    let mut resolved = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let entry = Entry::new(
            WalletTransactionKind::BetUnfreeze,
            proposal.amount,
            Some(proposal.bet_id),
        )
        .note(format!("pago proposal {} {status:?}", proposal.id).to_lowercase());
        book.apply(proposal.proposer_id, entry, |w| w.unfreeze(proposal.amount))?;
        resolved.push(PagoProposal::resolve_tx(tx, proposal.id, status).await?);
        events.push(BetEvent::PagoResolved {
            fight_id,
            proposal_id: proposal.id,
            bet_id: proposal.bet_id,
            status,
        });
    }
    Ok(resolved)
}
