//! Entity to wire-type conversions.

use pitbet_core::entities::bets::Bet;
use pitbet_core::entities::events::EventRecord;
use pitbet_core::entities::fights::Fight;
use pitbet_core::entities::pago::PagoProposal;
use pitbet_core::entities::users::User;
use pitbet_core::entities::wallets::{Wallet, WalletTransaction};
use pitbet_core::notify::BetEvent;
use pitbet_core::services::SettlementSummary;
use pitbet_sdk::objects::ws::FightUpdate;
use pitbet_sdk::objects::{
    BetResponse, EventResponse, FightResponse, PagoProposalResponse, SettlementResponse,
    UserResponse, WalletResponse, WalletTransactionResponse,
};
use time::PrimitiveDateTime;

pub(crate) fn unix(t: PrimitiveDateTime) -> i64 {
    t.assume_utc().unix_timestamp()
}

pub(crate) fn from_unix(ts: i64) -> Option<PrimitiveDateTime> {
    let t = time::OffsetDateTime::from_unix_timestamp(ts).ok()?;
    Some(PrimitiveDateTime::new(t.date(), t.time()))
}

pub(crate) fn bet_response(b: &Bet) -> BetResponse {
    BetResponse {
        bet_id: b.id,
        fight_id: b.fight_id,
        user_id: b.user_id,
        side: b.side.into(),
        amount: b.amount,
        kind: b.kind.into(),
        status: b.status.into(),
        matched_bet_id: b.matched_bet_id,
        payout: b.payout,
        commission: b.commission,
        created_at: unix(b.created_at),
        matched_at: b.matched_at.map(unix),
        settled_at: b.settled_at.map(unix),
    }
}

pub(crate) fn fight_response(f: &Fight) -> FightResponse {
    FightResponse {
        fight_id: f.id,
        event_id: f.event_id,
        fight_number: f.fight_number,
        red_entry: f.red_entry.clone(),
        blue_entry: f.blue_entry.clone(),
        status: f.status.into(),
        result: f.result.map(Into::into),
        red_total: f.red_total,
        blue_total: f.blue_total,
        bet_count: f.bet_count,
        matched_count: f.matched_count,
        created_at: unix(f.created_at),
        settled_at: f.settled_at.map(unix),
    }
}

pub(crate) fn settlement_response(s: &SettlementSummary) -> SettlementResponse {
    SettlementResponse {
        fight: fight_response(&s.fight),
        pairs_settled: s.pairs_settled,
        bets_refunded: s.bets_refunded,
        commission: s.commission,
    }
}

pub(crate) fn event_response(e: &EventRecord) -> EventResponse {
    EventResponse {
        event_id: e.id,
        name: e.name.clone(),
        venue: e.venue.clone(),
        scheduled_at: unix(e.scheduled_at),
        status: e.status.into(),
        created_at: unix(e.created_at),
    }
}

pub(crate) fn proposal_response(p: &PagoProposal) -> PagoProposalResponse {
    PagoProposalResponse {
        proposal_id: p.id,
        bet_id: p.bet_id,
        proposer_id: p.proposer_id,
        amount: p.amount,
        status: p.status.into(),
        created_at: unix(p.created_at),
        resolved_at: p.resolved_at.map(unix),
    }
}

pub(crate) fn user_response(u: &User) -> UserResponse {
    UserResponse {
        user_id: u.id,
        username: u.username.clone(),
        display_name: u.display_name.clone(),
        is_active: u.is_active,
        created_at: unix(u.created_at),
    }
}

pub(crate) fn wallet_response(w: &Wallet) -> WalletResponse {
    WalletResponse {
        user_id: w.user_id,
        balance: w.balance,
        frozen: w.frozen,
        available: w.snapshot().available(),
        updated_at: unix(w.updated_at),
    }
}

pub(crate) fn wallet_transaction_response(t: &WalletTransaction) -> WalletTransactionResponse {
    WalletTransactionResponse {
        id: t.id,
        user_id: t.user_id,
        kind: t.kind.into(),
        amount: t.amount,
        balance_after: t.balance_after,
        frozen_after: t.frozen_after,
        bet_id: t.bet_id,
        note: t.note.clone(),
        created_at: unix(t.created_at),
    }
}

/// The stream frame for a bus event, if the event is fight-scoped.
pub(crate) fn fight_update(event: &BetEvent) -> Option<FightUpdate> {
    let update = match event {
        BetEvent::BetPlaced { bet } => FightUpdate::BetPlaced {
            bet: bet_response(bet),
        },
        BetEvent::BetMatched {
            bet_id,
            counter_bet_id,
            red_total,
            blue_total,
            ..
        } => FightUpdate::BetMatched {
            bet_id: *bet_id,
            counter_bet_id: *counter_bet_id,
            red_total: *red_total,
            blue_total: *blue_total,
        },
        BetEvent::BetCancelled { bet_id, .. } => FightUpdate::BetCancelled { bet_id: *bet_id },
        BetEvent::BetRefunded { bet_id, .. } => FightUpdate::BetRefunded { bet_id: *bet_id },
        BetEvent::PagoProposed { proposal, .. } => FightUpdate::PagoProposed {
            proposal: proposal_response(proposal),
        },
        BetEvent::PagoResolved {
            proposal_id,
            bet_id,
            status,
            ..
        } => FightUpdate::PagoResolved {
            proposal_id: *proposal_id,
            bet_id: *bet_id,
            status: (*status).into(),
        },
        BetEvent::FightStatusChanged { status, .. } => FightUpdate::StatusChanged {
            status: (*status).into(),
        },
        BetEvent::FightSettled { result, .. } => FightUpdate::Settled {
            result: (*result).into(),
        },
        BetEvent::WalletChanged { .. } => return None,
    };
    Some(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitbet_core::entities::{FightResult, FightStatus, utc_now};
    use pitbet_core::rules::ledger::WalletBalance;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn unix_timestamps_round_trip_to_the_second() {
        let now = utc_now().replace_nanosecond(0).unwrap();
        assert_eq!(from_unix(unix(now)), Some(now));
        assert_eq!(from_unix(i64::MAX), None);
    }

    #[test]
    fn wallet_events_are_not_streamed() {
        let event = BetEvent::WalletChanged {
            user_id: Uuid::now_v7(),
            balance: WalletBalance::new(Decimal::ONE, Decimal::ZERO),
        };
        assert!(fight_update(&event).is_none());
    }

    #[test]
    fn fight_events_become_updates() {
        let fight_id = Uuid::now_v7();
        let update = fight_update(&BetEvent::FightStatusChanged {
            fight_id,
            status: FightStatus::BettingClosed,
        });
        let json = serde_json::to_value(update.unwrap()).unwrap();
        assert_eq!(json["kind"], "status_changed");
        assert_eq!(json["status"], "betting_closed");

        let update = fight_update(&BetEvent::FightSettled {
            fight_id,
            result: FightResult::Red,
        });
        assert!(matches!(
            update,
            Some(FightUpdate::Settled {
                result: pitbet_sdk::objects::FightResult::Red
            })
        ));
    }

    #[test]
    fn refunds_are_distinct_from_cancels() {
        let fight_id = Uuid::now_v7();
        let bet_id = Uuid::now_v7();
        let refunded = fight_update(&BetEvent::BetRefunded { fight_id, bet_id }).unwrap();
        let json = serde_json::to_value(refunded).unwrap();
        assert_eq!(json["kind"], "bet_refunded");
        assert_eq!(json["bet_id"], bet_id.to_string());

        let cancelled = fight_update(&BetEvent::BetCancelled { fight_id, bet_id });
        assert!(matches!(cancelled, Some(FightUpdate::BetCancelled { .. })));
    }
}
