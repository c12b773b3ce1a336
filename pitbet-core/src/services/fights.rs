use super::error::BetError;
use super::wallet_book::{Entry, WalletBook};
use super::{BetService, Events, lock_fight, release_proposals};
use crate::entities::bets::Bet;
use crate::entities::fights::Fight;
use crate::entities::pago::PagoProposal;
use crate::entities::{BetStatus, FightResult, FightStatus, ProposalStatus, WalletTransactionKind};
use crate::framework::PgTx;
use crate::notify::BetEvent;
use crate::rules::ledger::{OutcomeKind, Stake, settle_pair};
use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

/// What settling a fight did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementSummary {
    pub fight: Fight,
    pub pairs_settled: usize,
    /// Unmatched bets returned to their owners.
    pub bets_refunded: usize,
    pub commission: Decimal,
}

/// Unmatched bets and pending proposals of a fight, locked.
struct OpenBook {
    pending: Vec<Bet>,
    proposals: Vec<PagoProposal>,
}

impl OpenBook {
    async fn lock(tx: &mut PgTx<'_>, fight_id: Uuid) -> Result<Self, BetError> {
        Ok(Self {
            pending: Bet::lock_by_status_tx(tx, fight_id, BetStatus::Pending).await?,
            proposals: PagoProposal::lock_pending_for_fight_tx(tx, fight_id).await?,
        })
    }

    fn user_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.pending
            .iter()
            .map(|b| b.user_id)
            .chain(self.proposals.iter().map(|p| p.proposer_id))
    }

    /// Refund every unmatched bet and expire every pending proposal.
    /// Returns the number of bets refunded.
    async fn refund(
        self,
        tx: &mut PgTx<'_>,
        book: &mut WalletBook,
        fight_id: Uuid,
        events: &mut Events,
    ) -> Result<usize, BetError> {
        release_proposals(
            tx,
            book,
            fight_id,
            self.proposals,
            ProposalStatus::Expired,
            events,
        )
        .await?;

        let refunded = self.pending.len();
        for bet in self.pending {
            book.apply(
                bet.user_id,
                Entry::new(WalletTransactionKind::BetRefund, bet.amount, Some(bet.id))
                    .note("unmatched at close"),
                |w| w.unfreeze(bet.amount),
            )?;
            Bet::record_settlement_tx(tx, bet.id, BetStatus::Refunded, bet.amount, Decimal::ZERO)
                .await?;
            events.push(BetEvent::BetRefunded {
                fight_id,
                bet_id: bet.id,
            });
        }
        Ok(refunded)
    }
}

fn stake_of(bet: &Bet) -> Stake {
    Stake {
        bet_id: bet.id,
        user_id: bet.user_id,
        side: bet.side,
        amount: bet.amount,
    }
}

impl BetService {
    /// `scheduled | betting_closed -> betting_open`.
    #[tracing::instrument(skip(self), err)]
    pub async fn open_betting(&self, fight_id: Uuid) -> Result<Fight, BetError> {
        let mut tx = self.begin().await?;
        let fight = lock_fight(&mut tx, fight_id).await?;
        if !matches!(
            fight.status,
            FightStatus::Scheduled | FightStatus::BettingClosed
        ) {
            return Err(BetError::InvalidFightState {
                fight_id,
                status: fight.status,
            });
        }

        Fight::set_status_tx(&mut tx, fight_id, FightStatus::BettingOpen).await?;
        let fight = lock_fight(&mut tx, fight_id).await?;
        let mut events = Events::new();
        events.push(BetEvent::FightStatusChanged {
            fight_id,
            status: FightStatus::BettingOpen,
        });
        self.finish(tx, events).await?;
        tracing::info!(%fight_id, "Betting opened");
        Ok(fight)
    }

    /// `betting_open -> betting_closed`. Unmatched bets are refunded and
    /// pending proposals expired; matched pairs wait for the result.
    #[tracing::instrument(skip(self), err)]
    pub async fn close_betting(&self, fight_id: Uuid) -> Result<Fight, BetError> {
        let mut tx = self.begin().await?;
        let fight = lock_fight(&mut tx, fight_id).await?;
        if fight.status != FightStatus::BettingOpen {
            return Err(BetError::InvalidFightState {
                fight_id,
                status: fight.status,
            });
        }

        let open = OpenBook::lock(&mut tx, fight_id).await?;
        let mut book = WalletBook::lock(&mut tx, open.user_ids()).await?;
        let mut events = Events::new();
        let refunded = open.refund(&mut tx, &mut book, fight_id, &mut events).await?;

        Fight::set_status_tx(&mut tx, fight_id, FightStatus::BettingClosed).await?;
        events.push(BetEvent::FightStatusChanged {
            fight_id,
            status: FightStatus::BettingClosed,
        });
        book.store(&mut tx, &mut events).await?;
        let fight = lock_fight(&mut tx, fight_id).await?;
        self.finish(tx, events).await?;

        tracing::info!(%fight_id, refunded, "Betting closed");
        Ok(fight)
    }

    /// Declare the result and pay out every matched pair.
    ///
    /// Leftover open bets and proposals are handled as on close. A
    /// `Cancelled` result refunds everything and leaves the fight
    /// `cancelled`; it is also accepted for a fight that never opened.
    #[tracing::instrument(skip(self), err)]
    pub async fn settle_fight(
        &self,
        fight_id: Uuid,
        result: FightResult,
    ) -> Result<SettlementSummary, BetError> {
        let commission_rate = self.rules.read().await.commission_rate;

        let mut tx = self.begin().await?;
        let fight = lock_fight(&mut tx, fight_id).await?;
        match fight.status {
            FightStatus::Settled | FightStatus::Cancelled => {
                return Err(BetError::AlreadySettled(fight_id));
            }
            FightStatus::BettingOpen | FightStatus::BettingClosed => {}
            FightStatus::Scheduled if result == FightResult::Cancelled => {}
            FightStatus::Scheduled => {
                return Err(BetError::InvalidFightState {
                    fight_id,
                    status: fight.status,
                });
            }
        }

        let open = OpenBook::lock(&mut tx, fight_id).await?;
        let matched = Bet::lock_by_status_tx(&mut tx, fight_id, BetStatus::Matched).await?;
        let mut book = WalletBook::lock(
            &mut tx,
            open.user_ids()
                .chain(matched.iter().map(|b| b.user_id))
                .collect::<Vec<_>>(),
        )
        .await?;

        let mut events = Events::new();
        let bets_refunded = open.refund(&mut tx, &mut book, fight_id, &mut events).await?;

        let by_id: HashMap<Uuid, &Bet> = matched.iter().map(|b| (b.id, b)).collect();
        let pairs: Vec<(Uuid, Uuid)> = matched
            .iter()
            .filter_map(|b| {
                let other = b.matched_bet_id?;
                Some(if b.id < other { (b.id, other) } else { (other, b.id) })
            })
            .unique()
            .collect();

        let mut commission = Decimal::ZERO;
        for (a, b) in &pairs {
            let a = by_id.get(a).copied().ok_or(BetError::BetNotFound(*a))?;
            let b = by_id.get(b).copied().ok_or(BetError::BetNotFound(*b))?;
            let outcomes = settle_pair(&stake_of(a), &stake_of(b), result, commission_rate)
                .map_err(BetError::ledger(a.user_id))?;

            for outcome in outcomes {
                let (kind, status, amount) = match outcome.kind {
                    OutcomeKind::Won => (
                        WalletTransactionKind::BetWin,
                        BetStatus::Won,
                        outcome.net_change(),
                    ),
                    OutcomeKind::Lost => (
                        WalletTransactionKind::BetLoss,
                        BetStatus::Lost,
                        outcome.stake,
                    ),
                    OutcomeKind::Refunded => (
                        WalletTransactionKind::BetRefund,
                        BetStatus::Refunded,
                        outcome.stake,
                    ),
                };
                book.apply(
                    outcome.user_id,
                    Entry::new(kind, amount, Some(outcome.bet_id)),
                    |w| outcome.apply(w),
                )?;
                Bet::record_settlement_tx(
                    &mut tx,
                    outcome.bet_id,
                    status,
                    outcome.payout,
                    outcome.commission,
                )
                .await?;
                commission += outcome.commission;
            }
        }

        let status = match result {
            FightResult::Cancelled => FightStatus::Cancelled,
            _ => FightStatus::Settled,
        };
        Fight::mark_settled_tx(&mut tx, fight_id, status, result).await?;
        events.push(BetEvent::FightSettled { fight_id, result });
        book.store(&mut tx, &mut events).await?;
        let fight = lock_fight(&mut tx, fight_id).await?;
        self.finish(tx, events).await?;

        tracing::info!(
            %fight_id,
            ?result,
            pairs = pairs.len(),
            bets_refunded,
            %commission,
            "Fight settled"
        );
        Ok(SettlementSummary {
            fight,
            pairs_settled: pairs.len(),
            bets_refunded,
            commission,
        })
    }
}
