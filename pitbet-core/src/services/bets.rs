use super::{
    BetService, Events, ensure_active_user, find_bet, lock_bet, lock_fight, lock_open_fight,
    match_pair, release_proposals,
};
use super::error::BetError;
use super::wallet_book::{Entry, WalletBook};
use crate::entities::bets::{Bet, BetInsert};
use crate::entities::fights::Fight;
use crate::entities::pago::PagoProposal;
use crate::entities::{BetKind, BetStatus, ProposalStatus, Side, WalletTransactionKind};
use crate::notify::BetEvent;
use crate::rules::ledger::money;
use crate::rules::matching::{find_flat_match, stake_in_range};
use rust_decimal::Decimal;
use std::iter;
use uuid::Uuid;

/// How many of the oldest compatible bets are locked when looking for a
/// match. Rows held by concurrent transactions are skipped.
const MATCH_CANDIDATES: i64 = 8;

impl BetService {
    /// Place a flat bet and match it against the oldest open bet of the same
    /// amount on the opposite corner, if there is one.
    #[tracing::instrument(skip(self), err)]
    pub async fn create_bet(
        &self,
        user_id: Uuid,
        fight_id: Uuid,
        side: Side,
        amount: Decimal,
    ) -> Result<Bet, BetError> {
        money(amount).map_err(BetError::ledger(user_id))?;
        let rules = self.rules.snapshot().await;
        if !stake_in_range(amount, rules.min_bet, rules.max_bet) {
            return Err(BetError::AmountOutOfRange {
                amount,
                min: rules.min_bet,
                max: rules.max_bet,
            });
        }

        let mut tx = self.begin().await?;
        lock_open_fight(&mut tx, fight_id).await?;
        ensure_active_user(&mut tx, user_id).await?;

        let bet = Bet::insert_tx(
            &mut tx,
            BetInsert {
                fight_id,
                user_id,
                side,
                amount,
                kind: BetKind::Flat,
            },
        )
        .await?;
        Fight::increment_bet_count_tx(&mut tx, fight_id).await?;

        let candidates = Bet::lock_flat_candidates_tx(
            &mut tx,
            fight_id,
            side.opposite(),
            amount,
            user_id,
            MATCH_CANDIDATES,
        )
        .await?;
        let counter = find_flat_match(&bet, &candidates).cloned();
        let proposals = match &counter {
            Some(counter) => PagoProposal::lock_pending_for_bets_tx(&mut tx, &[counter.id]).await?,
            None => Vec::new(),
        };

        let mut book = WalletBook::lock(
            &mut tx,
            iter::once(user_id).chain(proposals.iter().map(|p| p.proposer_id)),
        )
        .await?;

        let mut events = Events::new();
        events.push(BetEvent::BetPlaced { bet: bet.clone() });
        // A proposal of the caller's own on the counter bet is refunded
        // before the new stake is frozen.
        release_proposals(
            &mut tx,
            &mut book,
            fight_id,
            proposals,
            ProposalStatus::Rejected,
            &mut events,
        )
        .await?;
        book.apply(
            user_id,
            Entry::new(WalletTransactionKind::BetFreeze, amount, Some(bet.id)),
            |w| w.freeze(amount),
        )?;

        let bet = match counter {
            Some(counter) => match_pair(&mut tx, &bet, &counter, BetKind::Flat, &mut events).await?,
            None => {
                tracing::debug!(bet_id = %bet.id, "No counter bet, waiting in the open book");
                bet
            }
        };

        book.store(&mut tx, &mut events).await?;
        self.finish(tx, events).await?;
        Ok(bet)
    }

    /// Take the other side of a specific open bet at the same stake.
    #[tracing::instrument(skip(self), err)]
    pub async fn accept_bet(&self, user_id: Uuid, bet_id: Uuid) -> Result<Bet, BetError> {
        let mut tx = self.begin().await?;
        let target = find_bet(&mut tx, bet_id).await?;
        lock_open_fight(&mut tx, target.fight_id).await?;
        let target = lock_bet(&mut tx, bet_id).await?;

        if target.status != BetStatus::Pending {
            return Err(BetError::BetNotPending {
                bet_id,
                status: target.status,
            });
        }
        if target.user_id == user_id {
            return Err(BetError::SelfMatch);
        }
        ensure_active_user(&mut tx, user_id).await?;

        let counter = Bet::insert_tx(
            &mut tx,
            BetInsert {
                fight_id: target.fight_id,
                user_id,
                side: target.side.opposite(),
                amount: target.amount,
                kind: BetKind::Flat,
            },
        )
        .await?;
        Fight::increment_bet_count_tx(&mut tx, target.fight_id).await?;

        let proposals = PagoProposal::lock_pending_for_bets_tx(&mut tx, &[target.id]).await?;
        let mut book = WalletBook::lock(
            &mut tx,
            iter::once(user_id).chain(proposals.iter().map(|p| p.proposer_id)),
        )
        .await?;

        let mut events = Events::new();
        events.push(BetEvent::BetPlaced {
            bet: counter.clone(),
        });
        release_proposals(
            &mut tx,
            &mut book,
            target.fight_id,
            proposals,
            ProposalStatus::Rejected,
            &mut events,
        )
        .await?;
        book.apply(
            user_id,
            Entry::new(WalletTransactionKind::BetFreeze, counter.amount, Some(counter.id)),
            |w| w.freeze(counter.amount),
        )?;
        let counter = match_pair(&mut tx, &counter, &target, BetKind::Flat, &mut events).await?;

        book.store(&mut tx, &mut events).await?;
        self.finish(tx, events).await?;
        Ok(counter)
    }

    /// Withdraw an unmatched bet and release its stake.
    #[tracing::instrument(skip(self), err)]
    pub async fn cancel_bet(&self, user_id: Uuid, bet_id: Uuid) -> Result<Bet, BetError> {
        let mut tx = self.begin().await?;
        let bet = find_bet(&mut tx, bet_id).await?;
        lock_fight(&mut tx, bet.fight_id).await?;
        let bet = lock_bet(&mut tx, bet_id).await?;

        if bet.user_id != user_id {
            return Err(BetError::NotBetOwner(bet_id));
        }
        if bet.status != BetStatus::Pending {
            return Err(BetError::BetNotPending {
                bet_id,
                status: bet.status,
            });
        }

        let proposals = PagoProposal::lock_pending_for_bets_tx(&mut tx, &[bet.id]).await?;
        let mut book = WalletBook::lock(
            &mut tx,
            iter::once(user_id).chain(proposals.iter().map(|p| p.proposer_id)),
        )
        .await?;
        book.apply(
            user_id,
            Entry::new(WalletTransactionKind::BetUnfreeze, bet.amount, Some(bet.id))
                .note("cancelled"),
            |w| w.unfreeze(bet.amount),
        )?;

        let cancelled = Bet::set_status_tx(&mut tx, bet.id, BetStatus::Cancelled).await?;
        let mut events = Events::new();
        release_proposals(
            &mut tx,
            &mut book,
            bet.fight_id,
            proposals,
            ProposalStatus::Rejected,
            &mut events,
        )
        .await?;
        events.push(BetEvent::BetCancelled {
            fight_id: bet.fight_id,
            bet_id: bet.id,
        });

        book.store(&mut tx, &mut events).await?;
        self.finish(tx, events).await?;
        Ok(cancelled)
    }
}
