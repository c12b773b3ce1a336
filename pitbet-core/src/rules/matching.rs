//! Auto-match rule for flat bets.
//!
//! Candidates are always supplied oldest first, so the first compatible bet
//! wins. There is no book: a bet either finds an exact opposite or waits.

use crate::entities::bets::Bet;
use crate::entities::{BetKind, BetStatus};
use rust_decimal::Decimal;

/// Whether `candidate` can take the other side of `incoming` as a flat bet.
pub fn is_flat_match(incoming: &Bet, candidate: &Bet) -> bool {
    incoming.id != candidate.id
        && incoming.fight_id == candidate.fight_id
        && incoming.side == candidate.side.opposite()
        && incoming.amount == candidate.amount
        && incoming.user_id != candidate.user_id
        && candidate.status == BetStatus::Pending
        && candidate.kind == BetKind::Flat
        && candidate.matched_bet_id.is_none()
}

pub fn find_flat_match<'a>(incoming: &Bet, candidates: &'a [Bet]) -> Option<&'a Bet> {
    candidates.iter().find(|c| is_flat_match(incoming, c))
}

/// Larger stake over smaller stake must not exceed `max_ratio`.
pub fn pago_ratio_ok(a: Decimal, b: Decimal, max_ratio: Decimal) -> bool {
    if a <= Decimal::ZERO || b <= Decimal::ZERO {
        return false;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi / lo <= max_ratio
}

pub fn stake_in_range(amount: Decimal, min: Decimal, max: Decimal) -> bool {
    amount >= min && amount <= max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Side, utc_now};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn bet(fight_id: Uuid, side: Side, amount: Decimal) -> Bet {
        Bet {
            id: Uuid::now_v7(),
            fight_id,
            user_id: Uuid::now_v7(),
            side,
            amount,
            kind: BetKind::Flat,
            status: BetStatus::Pending,
            matched_bet_id: None,
            payout: None,
            commission: None,
            created_at: utc_now(),
            matched_at: None,
            settled_at: None,
        }
    }

    #[test]
    fn opposite_equal_bets_match() {
        let fight = Uuid::now_v7();
        let incoming = bet(fight, Side::Red, dec!(100));
        let candidate = bet(fight, Side::Blue, dec!(100));
        assert!(is_flat_match(&incoming, &candidate));
    }

    #[test]
    fn mismatches_are_rejected() {
        let fight = Uuid::now_v7();
        let incoming = bet(fight, Side::Red, dec!(100));

        let same_side = bet(fight, Side::Red, dec!(100));
        let other_amount = bet(fight, Side::Blue, dec!(99.99));
        let other_fight = bet(Uuid::now_v7(), Side::Blue, dec!(100));
        let mut own = bet(fight, Side::Blue, dec!(100));
        own.user_id = incoming.user_id;
        let mut taken = bet(fight, Side::Blue, dec!(100));
        taken.status = BetStatus::Matched;
        let mut pago = bet(fight, Side::Blue, dec!(100));
        pago.kind = BetKind::Pago;

        for candidate in [same_side, other_amount, other_fight, own, taken, pago] {
            assert!(!is_flat_match(&incoming, &candidate), "{candidate:?}");
        }
    }

    #[test]
    fn oldest_compatible_candidate_wins() {
        let fight = Uuid::now_v7();
        let incoming = bet(fight, Side::Blue, dec!(50));
        let candidates = vec![
            bet(fight, Side::Red, dec!(40)),
            bet(fight, Side::Red, dec!(50)),
            bet(fight, Side::Red, dec!(50)),
        ];
        let found = find_flat_match(&incoming, &candidates).map(|b| b.id);
        assert_eq!(found, Some(candidates[1].id));
        assert!(find_flat_match(&incoming, &candidates[..1]).is_none());
    }

    #[test]
    fn pago_ratio_is_symmetric() {
        assert!(pago_ratio_ok(dec!(100), dec!(300), dec!(3)));
        assert!(pago_ratio_ok(dec!(300), dec!(100), dec!(3)));
        assert!(!pago_ratio_ok(dec!(100), dec!(301), dec!(3)));
        assert!(!pago_ratio_ok(dec!(0), dec!(10), dec!(3)));
    }

    #[test]
    fn stake_bounds_are_inclusive() {
        assert!(stake_in_range(dec!(10), dec!(10), dec!(100)));
        assert!(stake_in_range(dec!(100), dec!(10), dec!(100)));
        assert!(!stake_in_range(dec!(100.01), dec!(10), dec!(100)));
    }
}
