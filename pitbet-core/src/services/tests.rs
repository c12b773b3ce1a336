use super::*;
use crate::config::BettingRules;
use crate::entities::events::CreateEvent;
use crate::entities::fights::{CreateFight, GetFightById};
use crate::entities::wallets::{GetWallet, ListWalletTransactions};
use crate::entities::{BetStatus, FightResult, Side, utc_now};
use crate::rules::ledger::{LedgerError, WalletBalance};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;

struct Arena {
    svc: BetService,
    fight_id: Uuid,
}

impl Arena {
    /// A service over a fresh database with one fight open for betting.
    async fn open(pool: PgPool) -> Self {
        let db = DatabaseProcessor { pool };
        let event = db
            .process(CreateEvent {
                name: "Sunday derby".to_owned(),
                venue: None,
                scheduled_at: utc_now(),
            })
            .await
            .unwrap();
        let fight = db
            .process(CreateFight {
                event_id: event.id,
                fight_number: 1,
                red_entry: "Talisay".into(),
                blue_entry: "Bacolod".into(),
            })
            .await
            .unwrap();
        let svc = BetService::new(
            db,
            EventBus::default(),
            ConfigStore::new(BettingRules::default()),
        );
        svc.open_betting(fight.id).await.unwrap();
        Self {
            svc,
            fight_id: fight.id,
        }
    }

    async fn player(&self, name: &str, funds: Decimal) -> Uuid {
        let user = self.svc.register_user(name.into(), None).await.unwrap();
        if funds > Decimal::ZERO {
            self.svc.deposit(user.id, funds, None).await.unwrap();
        }
        user.id
    }

    async fn wallet(&self, user_id: Uuid) -> WalletBalance {
        self.svc
            .db
            .process(GetWallet { user_id })
            .await
            .unwrap()
            .unwrap()
            .snapshot()
    }

    async fn fight(&self) -> Fight {
        self.svc
            .db
            .process(GetFightById {
                fight_id: self.fight_id,
            })
            .await
            .unwrap()
            .unwrap()
    }

    async fn bet(&self, bet_id: Uuid) -> Bet {
        let mut tx = self.svc.db.pool.begin().await.unwrap();
        Bet::find_tx(&mut tx, bet_id).await.unwrap().unwrap()
    }

    async fn proposal(&self, proposal_id: Uuid) -> PagoProposal {
        let mut tx = self.svc.db.pool.begin().await.unwrap();
        PagoProposal::find_tx(&mut tx, proposal_id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn ledger_lines(&self, user_id: Uuid) -> usize {
        self.svc
            .db
            .process(ListWalletTransactions {
                user_id,
                limit: 100,
                offset: 0,
            })
            .await
            .unwrap()
            .len()
    }
}

fn ledger_error(err: BetError) -> LedgerError {
    match err {
        BetError::Ledger { source, .. } => source,
        other => panic!("expected a ledger error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../migrations")]
async fn flat_bets_match_at_most_once(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(100)).await;
    let c = arena.player("cora", dec!(100)).await;
    let fight_id = arena.fight_id;

    let first = arena.svc.create_bet(a, fight_id, Side::Red, dec!(25)).await.unwrap();
    assert_eq!(first.status, BetStatus::Pending);

    let second = arena.svc.create_bet(b, fight_id, Side::Blue, dec!(25.0)).await.unwrap();
    assert_eq!(second.status, BetStatus::Matched);
    assert_eq!(second.matched_bet_id, Some(first.id));
    assert_eq!(arena.bet(first.id).await.matched_bet_id, Some(second.id));

    let third = arena.svc.create_bet(c, fight_id, Side::Blue, dec!(25)).await.unwrap();
    assert_eq!(third.status, BetStatus::Pending);

    let fight = arena.fight().await;
    assert_eq!(fight.red_total, dec!(25));
    assert_eq!(fight.blue_total, dec!(25));
    assert_eq!(fight.matched_count, 1);
    assert_eq!(fight.bet_count, 3);

    for user in [a, b, c] {
        assert_eq!(arena.wallet(user).await, WalletBalance::new(dec!(100), dec!(25)));
    }
}

#[sqlx::test(migrations = "../migrations")]
async fn sub_cent_amounts_are_refused(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(0.01)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(10.00))
        .await
        .unwrap();

    let err = arena
        .svc
        .create_bet(b, arena.fight_id, Side::Blue, dec!(10.004))
        .await
        .unwrap_err();
    assert_eq!(ledger_error(err), LedgerError::SubCentAmount(dec!(10.004)));
    let err = arena.svc.propose_pago(b, open.id, dec!(12.345)).await.unwrap_err();
    assert!(matches!(ledger_error(err), LedgerError::SubCentAmount(_)));

    let lines = arena.ledger_lines(b).await;
    assert!(arena.svc.withdraw(b, dec!(0.005), None).await.is_err());
    assert!(arena.svc.deposit(b, dec!(0.004), None).await.is_err());
    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(0.01), dec!(0)));
    assert_eq!(arena.ledger_lines(b).await, lines);
    assert_eq!(arena.fight().await.bet_count, 1);
}

#[sqlx::test(migrations = "../migrations")]
async fn accepting_a_bet_releases_own_proposal_first(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(10)).await;
    let b = arena.player("ben", dec!(30)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(10))
        .await
        .unwrap();
    let proposal = arena.svc.propose_pago(b, open.id, dec!(30)).await.unwrap();
    assert_eq!(arena.wallet(b).await.available(), dec!(0));

    let counter = arena.svc.accept_bet(b, open.id).await.unwrap();
    assert_eq!(counter.status, BetStatus::Matched);
    assert_eq!(counter.side, Side::Blue);
    assert_eq!(
        arena.proposal(proposal.id).await.status,
        ProposalStatus::Rejected
    );
    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(30), dec!(10)));
}

#[sqlx::test(migrations = "../migrations")]
async fn placing_a_matching_bet_releases_own_proposal_first(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(10)).await;
    let b = arena.player("ben", dec!(20)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(10))
        .await
        .unwrap();
    arena.svc.propose_pago(b, open.id, dec!(20)).await.unwrap();

    let counter = arena
        .svc
        .create_bet(b, arena.fight_id, Side::Blue, dec!(10))
        .await
        .unwrap();
    assert_eq!(counter.matched_bet_id, Some(open.id));
    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(20), dec!(10)));
}

#[sqlx::test(migrations = "../migrations")]
async fn own_bets_and_short_wallets_are_refused(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(50)).await;
    let b = arena.player("ben", dec!(5)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(20))
        .await
        .unwrap();
    assert!(matches!(
        arena.svc.accept_bet(a, open.id).await,
        Err(BetError::SelfMatch)
    ));

    let err = arena.svc.accept_bet(b, open.id).await.unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::InsufficientFunds { .. }
    ));
    assert_eq!(arena.bet(open.id).await.status, BetStatus::Pending);
    assert_eq!(arena.fight().await.bet_count, 1);

    assert!(matches!(
        arena
            .svc
            .create_bet(a, arena.fight_id, Side::Red, dec!(5))
            .await,
        Err(BetError::AmountOutOfRange { .. })
    ));
}

#[sqlx::test(migrations = "../migrations")]
async fn cancelling_returns_the_stake(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(40)).await;
    let b = arena.player("ben", dec!(40)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Blue, dec!(15))
        .await
        .unwrap();
    let proposal = arena.svc.propose_pago(b, open.id, dec!(30)).await.unwrap();

    assert!(matches!(
        arena.svc.cancel_bet(b, open.id).await,
        Err(BetError::NotBetOwner(_))
    ));
    let cancelled = arena.svc.cancel_bet(a, open.id).await.unwrap();
    assert_eq!(cancelled.status, BetStatus::Cancelled);
    assert!(matches!(
        arena.svc.cancel_bet(a, open.id).await,
        Err(BetError::BetNotPending { .. })
    ));

    assert_eq!(arena.wallet(a).await, WalletBalance::new(dec!(40), dec!(0)));
    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(40), dec!(0)));
    assert_eq!(
        arena.proposal(proposal.id).await.status,
        ProposalStatus::Rejected
    );
}

#[sqlx::test(migrations = "../migrations")]
async fn accepting_a_pago_rejects_competing_proposals(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(100)).await;
    let c = arena.player("cora", dec!(100)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(20))
        .await
        .unwrap();
    let chosen = arena.svc.propose_pago(b, open.id, dec!(30)).await.unwrap();
    let other = arena.svc.propose_pago(c, open.id, dec!(25)).await.unwrap();
    assert!(matches!(
        arena.svc.propose_pago(c, open.id, dec!(40)).await,
        Err(BetError::DuplicateProposal)
    ));
    assert!(matches!(
        arena.svc.propose_pago(c, open.id, dec!(80)).await,
        Err(BetError::PagoRatioOutOfRange { .. })
    ));

    assert!(matches!(
        arena.svc.accept_pago(b, chosen.id).await,
        Err(BetError::NotBetOwner(_))
    ));
    let counter = arena.svc.accept_pago(a, chosen.id).await.unwrap();
    assert_eq!(counter.user_id, b);
    assert_eq!(counter.kind, BetKind::Pago);
    assert_eq!(counter.amount, dec!(30));
    assert_eq!(counter.matched_bet_id, Some(open.id));

    let target = arena.bet(open.id).await;
    assert_eq!(target.kind, BetKind::Pago);
    assert_eq!(target.status, BetStatus::Matched);
    assert_eq!(arena.proposal(chosen.id).await.status, ProposalStatus::Accepted);
    assert_eq!(arena.proposal(other.id).await.status, ProposalStatus::Rejected);

    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(100), dec!(30)));
    assert_eq!(arena.wallet(c).await, WalletBalance::new(dec!(100), dec!(0)));

    let fight = arena.fight().await;
    assert_eq!(fight.red_total, dec!(20));
    assert_eq!(fight.blue_total, dec!(30));
    assert_eq!(fight.matched_count, 1);
}

#[sqlx::test(migrations = "../migrations")]
async fn proposals_can_be_rejected_or_withdrawn_once(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(100)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(20))
        .await
        .unwrap();

    let first = arena.svc.propose_pago(b, open.id, dec!(15)).await.unwrap();
    assert!(matches!(
        arena.svc.reject_pago(b, first.id).await,
        Err(BetError::NotBetOwner(_))
    ));
    let rejected = arena.svc.reject_pago(a, first.id).await.unwrap();
    assert_eq!(rejected.status, ProposalStatus::Rejected);
    assert!(rejected.resolved_at.is_some());
    assert_eq!(arena.wallet(b).await.frozen, dec!(0));

    let second = arena.svc.propose_pago(b, open.id, dec!(15)).await.unwrap();
    assert!(matches!(
        arena.svc.withdraw_pago(a, second.id).await,
        Err(BetError::NotProposer(_))
    ));
    let withdrawn = arena.svc.withdraw_pago(b, second.id).await.unwrap();
    assert_eq!(withdrawn.status, ProposalStatus::Withdrawn);
    assert!(matches!(
        arena.svc.withdraw_pago(b, second.id).await,
        Err(BetError::ProposalNotPending { .. })
    ));
    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(100), dec!(0)));
}

#[sqlx::test(migrations = "../migrations")]
async fn stale_proposals_expire(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(100)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(20))
        .await
        .unwrap();
    let proposal = arena.svc.propose_pago(b, open.id, dec!(15)).await.unwrap();

    let before = utc_now() - time::Duration::minutes(5);
    assert_eq!(arena.svc.expire_pago_proposals(before).await.unwrap(), 0);

    let after = utc_now() + time::Duration::minutes(1);
    assert_eq!(arena.svc.expire_pago_proposals(after).await.unwrap(), 1);
    assert_eq!(arena.proposal(proposal.id).await.status, ProposalStatus::Expired);
    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(100), dec!(0)));
    assert_eq!(arena.svc.expire_pago_proposals(after).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../migrations")]
async fn closing_refunds_the_open_book(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(100)).await;
    let c = arena.player("cora", dec!(100)).await;
    let d = arena.player("dan", dec!(100)).await;
    let fight_id = arena.fight_id;

    let red = arena.svc.create_bet(a, fight_id, Side::Red, dec!(30)).await.unwrap();
    arena.svc.create_bet(b, fight_id, Side::Blue, dec!(30)).await.unwrap();
    let lonely = arena.svc.create_bet(c, fight_id, Side::Red, dec!(45)).await.unwrap();
    let proposal = arena.svc.propose_pago(d, lonely.id, dec!(50)).await.unwrap();

    let mut rx = arena.svc.bus().subscribe();
    let fight = arena.svc.close_betting(fight_id).await.unwrap();
    assert_eq!(fight.status, FightStatus::BettingClosed);

    assert_eq!(arena.bet(lonely.id).await.status, BetStatus::Refunded);
    assert_eq!(arena.bet(red.id).await.status, BetStatus::Matched);
    assert_eq!(arena.proposal(proposal.id).await.status, ProposalStatus::Expired);
    assert_eq!(arena.wallet(c).await, WalletBalance::new(dec!(100), dec!(0)));
    assert_eq!(arena.wallet(d).await, WalletBalance::new(dec!(100), dec!(0)));
    assert_eq!(arena.wallet(a).await.frozen, dec!(30));

    let mut refunded = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let BetEvent::BetRefunded { bet_id, .. } = event {
            refunded.push(bet_id);
        }
    }
    assert_eq!(refunded, vec![lonely.id]);

    assert!(matches!(
        arena.svc.create_bet(c, fight_id, Side::Blue, dec!(30)).await,
        Err(BetError::FightNotOpen { .. })
    ));
    assert!(matches!(
        arena.svc.close_betting(fight_id).await,
        Err(BetError::InvalidFightState { .. })
    ));
}

#[sqlx::test(migrations = "../migrations")]
async fn settlement_pays_the_winner_and_conserves_money(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(100)).await;
    let c = arena.player("cora", dec!(100)).await;
    let fight_id = arena.fight_id;

    let red = arena.svc.create_bet(a, fight_id, Side::Red, dec!(50)).await.unwrap();
    let blue = arena.svc.create_bet(b, fight_id, Side::Blue, dec!(50)).await.unwrap();
    let lonely = arena.svc.create_bet(c, fight_id, Side::Blue, dec!(20)).await.unwrap();
    arena.svc.close_betting(fight_id).await.unwrap();

    let summary = arena.svc.settle_fight(fight_id, FightResult::Red).await.unwrap();
    assert_eq!(summary.pairs_settled, 1);
    assert_eq!(summary.bets_refunded, 0);
    assert_eq!(summary.commission, dec!(5.00));
    assert_eq!(summary.fight.status, FightStatus::Settled);
    assert_eq!(summary.fight.result, Some(FightResult::Red));

    let won = arena.bet(red.id).await;
    assert_eq!(won.status, BetStatus::Won);
    assert_eq!(won.payout, Some(dec!(95.00)));
    assert_eq!(arena.bet(blue.id).await.status, BetStatus::Lost);
    assert_eq!(arena.bet(lonely.id).await.status, BetStatus::Refunded);

    let wa = arena.wallet(a).await;
    let wb = arena.wallet(b).await;
    let wc = arena.wallet(c).await;
    assert_eq!(wa, WalletBalance::new(dec!(145.00), dec!(0)));
    assert_eq!(wb, WalletBalance::new(dec!(50.00), dec!(0)));
    assert_eq!(wc, WalletBalance::new(dec!(100), dec!(0)));
    assert_eq!(wa.balance + wb.balance + wc.balance + summary.commission, dec!(300));

    assert!(matches!(
        arena.svc.settle_fight(fight_id, FightResult::Blue).await,
        Err(BetError::AlreadySettled(_))
    ));
}

#[sqlx::test(migrations = "../migrations")]
async fn draws_refund_matched_pairs(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(100)).await;
    let b = arena.player("ben", dec!(100)).await;

    let open = arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(30))
        .await
        .unwrap();
    let proposal = arena.svc.propose_pago(b, open.id, dec!(60)).await.unwrap();
    arena.svc.accept_pago(a, proposal.id).await.unwrap();

    let summary = arena
        .svc
        .settle_fight(arena.fight_id, FightResult::Draw)
        .await
        .unwrap();
    assert_eq!(summary.pairs_settled, 1);
    assert_eq!(summary.commission, dec!(0));
    assert_eq!(arena.bet(open.id).await.status, BetStatus::Refunded);
    assert_eq!(arena.wallet(a).await, WalletBalance::new(dec!(100), dec!(0)));
    assert_eq!(arena.wallet(b).await, WalletBalance::new(dec!(100), dec!(0)));
}

#[sqlx::test(migrations = "../migrations")]
async fn fight_status_transitions(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let fight_id = arena.fight_id;

    assert!(matches!(
        arena.svc.open_betting(fight_id).await,
        Err(BetError::InvalidFightState { .. })
    ));
    arena.svc.close_betting(fight_id).await.unwrap();
    let reopened = arena.svc.open_betting(fight_id).await.unwrap();
    assert_eq!(reopened.status, FightStatus::BettingOpen);

    let summary = arena
        .svc
        .settle_fight(fight_id, FightResult::Cancelled)
        .await
        .unwrap();
    assert_eq!(summary.fight.status, FightStatus::Cancelled);
    assert!(matches!(
        arena.svc.open_betting(fight_id).await,
        Err(BetError::InvalidFightState { .. })
    ));
    assert!(matches!(
        arena.svc.settle_fight(fight_id, FightResult::Red).await,
        Err(BetError::AlreadySettled(_))
    ));
    assert!(matches!(
        arena.svc.open_betting(Uuid::now_v7()).await,
        Err(BetError::FightNotFound(_))
    ));
}

#[sqlx::test(migrations = "../migrations")]
async fn usernames_are_unique_and_withdrawals_respect_frozen_funds(pool: PgPool) {
    let arena = Arena::open(pool).await;
    let a = arena.player("ana", dec!(50)).await;
    assert!(matches!(
        arena.svc.register_user("ana".into(), None).await,
        Err(BetError::UsernameTaken(_))
    ));

    arena
        .svc
        .create_bet(a, arena.fight_id, Side::Red, dec!(30))
        .await
        .unwrap();
    let err = arena.svc.withdraw(a, dec!(25), None).await.unwrap_err();
    assert!(matches!(
        ledger_error(err),
        LedgerError::InsufficientFunds { .. }
    ));
    let wallet = arena.svc.withdraw(a, dec!(20), Some("cash out".to_owned())).await.unwrap();
    assert_eq!(wallet.snapshot(), WalletBalance::new(dec!(30), dec!(30)));
    assert!(matches!(
        arena.svc.deposit(Uuid::now_v7(), dec!(10), None).await,
        Err(BetError::UserNotFound(_))
    ));
}
