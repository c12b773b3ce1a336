use super::error::BetError;
use super::wallet_book::{Entry, WalletBook};
use super::{
    BetService, Events, ensure_active_user, find_bet, lock_bet, lock_fight, lock_open_fight,
    match_pair, release_proposals,
};
use crate::entities::bets::{Bet, BetInsert};
use crate::entities::fights::Fight;
use crate::entities::pago::{ListStaleProposalIds, PagoProposal};
use crate::entities::{BetKind, BetStatus, ProposalStatus, WalletTransactionKind};
use crate::framework::PgTx;
use crate::notify::BetEvent;
use crate::rules::ledger::money;
use crate::rules::matching::{pago_ratio_ok, stake_in_range};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use std::iter;
use uuid::Uuid;

const EXPIRY_BATCH: i64 = 100;

/// Who ends a pending proposal, and how.
#[derive(Debug, Clone, Copy)]
enum Resolution {
    /// The bet owner declines it.
    Reject { owner_id: Uuid },
    /// The proposer takes it back.
    Withdraw { proposer_id: Uuid },
    Expire,
}

impl Resolution {
    fn status(self) -> ProposalStatus {
        match self {
            Resolution::Reject { .. } => ProposalStatus::Rejected,
            Resolution::Withdraw { .. } => ProposalStatus::Withdrawn,
            Resolution::Expire => ProposalStatus::Expired,
        }
    }
}

impl BetService {
    /// Offer to take the other side of an open bet with a different stake.
    /// The proposer's stake is frozen until the proposal is resolved.
    #[tracing::instrument(skip(self), err)]
    pub async fn propose_pago(
        &self,
        user_id: Uuid,
        bet_id: Uuid,
        amount: Decimal,
    ) -> Result<PagoProposal, BetError> {
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
        if !pago_ratio_ok(amount, target.amount, rules.max_pago_ratio) {
            return Err(BetError::PagoRatioOutOfRange {
                amount,
                counter: target.amount,
                max_ratio: rules.max_pago_ratio,
            });
        }
        ensure_active_user(&mut tx, user_id).await?;
        if PagoProposal::has_pending_tx(&mut tx, bet_id, user_id).await? {
            return Err(BetError::DuplicateProposal);
        }

        let mut book = WalletBook::lock(&mut tx, [user_id]).await?;
        let proposal = PagoProposal::insert_tx(&mut tx, bet_id, user_id, amount).await?;
        book.apply(
            user_id,
            Entry::new(WalletTransactionKind::BetFreeze, amount, Some(bet_id))
                .note(format!("pago proposal {}", proposal.id)),
            |w| w.freeze(amount),
        )?;

        let mut events = Events::new();
        events.push(BetEvent::PagoProposed {
            fight_id: target.fight_id,
            proposal: proposal.clone(),
        });
        book.store(&mut tx, &mut events).await?;
        self.finish(tx, events).await?;
        Ok(proposal)
    }

    /// The bet owner accepts a proposal: the proposer's counter bet is
    /// created with the stake frozen at proposal time and both bets are
    /// matched as PAGO. Other proposals on the bet are rejected.
    ///
    /// Returns the proposer's new counter bet.
    #[tracing::instrument(skip(self), err)]
    pub async fn accept_pago(&self, user_id: Uuid, proposal_id: Uuid) -> Result<Bet, BetError> {
        let mut tx = self.begin().await?;
        let proposal = PagoProposal::find_tx(&mut tx, proposal_id)
            .await?
            .ok_or(BetError::ProposalNotFound(proposal_id))?;
        let target = find_bet(&mut tx, proposal.bet_id).await?;
        if target.user_id != user_id {
            return Err(BetError::NotBetOwner(target.id));
        }

        lock_open_fight(&mut tx, target.fight_id).await?;
        let target = lock_bet(&mut tx, target.id).await?;
        let proposal = lock_pending_proposal(&mut tx, proposal_id).await?;
        if target.status != BetStatus::Pending {
            return Err(BetError::BetNotPending {
                bet_id: target.id,
                status: target.status,
            });
        }
        ensure_active_user(&mut tx, user_id).await?;

        let others: Vec<PagoProposal> =
            PagoProposal::lock_pending_for_bets_tx(&mut tx, &[target.id])
                .await?
                .into_iter()
                .filter(|p| p.id != proposal.id)
                .collect();
        let mut book =
            WalletBook::lock(&mut tx, others.iter().map(|p| p.proposer_id)).await?;

        let counter = Bet::insert_tx(
            &mut tx,
            BetInsert {
                fight_id: target.fight_id,
                user_id: proposal.proposer_id,
                side: target.side.opposite(),
                amount: proposal.amount,
                kind: BetKind::Pago,
            },
        )
        .await?;
        Fight::increment_bet_count_tx(&mut tx, target.fight_id).await?;
        PagoProposal::resolve_tx(&mut tx, proposal.id, ProposalStatus::Accepted).await?;

        let mut events = Events::new();
        events.push(BetEvent::BetPlaced {
            bet: counter.clone(),
        });
        let counter = match_pair(&mut tx, &counter, &target, BetKind::Pago, &mut events).await?;
        events.push(BetEvent::PagoResolved {
            fight_id: target.fight_id,
            proposal_id: proposal.id,
            bet_id: target.id,
            status: ProposalStatus::Accepted,
        });
        release_proposals(
            &mut tx,
            &mut book,
            target.fight_id,
            others,
            ProposalStatus::Rejected,
            &mut events,
        )
        .await?;

        book.store(&mut tx, &mut events).await?;
        self.finish(tx, events).await?;
        Ok(counter)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn reject_pago(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<PagoProposal, BetError> {
        self.resolve_proposal(proposal_id, Resolution::Reject { owner_id: user_id })
            .await
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn withdraw_pago(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<PagoProposal, BetError> {
        self.resolve_proposal(
            proposal_id,
            Resolution::Withdraw {
                proposer_id: user_id,
            },
        )
        .await
    }

    /// Expire pending proposals created before `older_than`. Each proposal is
    /// expired in its own transaction; ones resolved concurrently are
    /// skipped. Returns how many were expired.
    pub async fn expire_pago_proposals(
        &self,
        older_than: time::PrimitiveDateTime,
    ) -> Result<usize, BetError> {
        let stale = self
            .db
            .process(ListStaleProposalIds {
                created_before: older_than,
                limit: EXPIRY_BATCH,
            })
            .await?;

        let mut expired = 0;
        for proposal_id in stale {
            match self.resolve_proposal(proposal_id, Resolution::Expire).await {
                Ok(_) => expired += 1,
                Err(BetError::ProposalNotPending { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        if expired > 0 {
            tracing::info!(expired, "Expired stale pago proposals");
        }
        Ok(expired)
    }

    async fn resolve_proposal(
        &self,
        proposal_id: Uuid,
        resolution: Resolution,
    ) -> Result<PagoProposal, BetError> {
        let mut tx = self.begin().await?;
        let proposal = PagoProposal::find_tx(&mut tx, proposal_id)
            .await?
            .ok_or(BetError::ProposalNotFound(proposal_id))?;
        let bet = find_bet(&mut tx, proposal.bet_id).await?;

        match resolution {
            Resolution::Reject { owner_id } if bet.user_id != owner_id => {
                return Err(BetError::NotBetOwner(bet.id));
            }
            Resolution::Withdraw { proposer_id } if proposal.proposer_id != proposer_id => {
                return Err(BetError::NotProposer(proposal_id));
            }
            _ => {}
        }

        lock_fight(&mut tx, bet.fight_id).await?;
        let proposal = lock_pending_proposal(&mut tx, proposal_id).await?;
        let mut book = WalletBook::lock(&mut tx, iter::once(proposal.proposer_id)).await?;

        let mut events = Events::new();
        let resolved = release_proposals(
            &mut tx,
            &mut book,
            bet.fight_id,
            vec![proposal],
            resolution.status(),
            &mut events,
        )
        .await?
        .pop()
        .ok_or(BetError::ProposalNotFound(proposal_id))?;

        book.store(&mut tx, &mut events).await?;
        self.finish(tx, events).await?;
        Ok(resolved)
    }
}

async fn lock_pending_proposal(
    tx: &mut PgTx<'_>,
    proposal_id: Uuid,
) -> Result<PagoProposal, BetError> {
    let proposal = PagoProposal::lock_tx(tx, proposal_id)
        .await?
        .ok_or(BetError::ProposalNotFound(proposal_id))?;
    if proposal.status != ProposalStatus::Pending {
        return Err(BetError::ProposalNotPending {
            proposal_id,
            status: proposal.status,
        });
    }
    Ok(proposal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolutions_map_to_final_statuses() {
        let id = Uuid::now_v7();
        assert_eq!(
            Resolution::Reject { owner_id: id }.status(),
            ProposalStatus::Rejected
        );
        assert_eq!(
            Resolution::Withdraw { proposer_id: id }.status(),
            ProposalStatus::Withdrawn
        );
        assert_eq!(Resolution::Expire.status(), ProposalStatus::Expired);
    }
}
