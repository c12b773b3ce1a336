//! Wallet balance arithmetic and fight settlement.
//!
//! A wallet holds a `balance` of which `frozen` is reserved for open bets
//! and proposals. `0 <= frozen <= balance` holds after every operation.
//! Every amount is a whole number of cents.

use crate::entities::{FightResult, Side};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("amount {0} is not a whole number of cents")]
    SubCentAmount(Decimal),
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("frozen funds underflow: frozen {frozen}, requested {requested}")]
    FrozenUnderflow { frozen: Decimal, requested: Decimal },
    #[error("a settled pair must back opposite corners")]
    SameSidePair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletBalance {
    pub balance: Decimal,
    pub frozen: Decimal,
}

/// Decimal places of every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// A positive amount in whole cents.
pub fn money(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(LedgerError::SubCentAmount(amount));
    }
    Ok(amount)
}

impl WalletBalance {
    pub fn new(balance: Decimal, frozen: Decimal) -> Self {
        Self { balance, frozen }
    }

    pub fn available(&self) -> Decimal {
        self.balance - self.frozen
    }

    /// Operator deposit.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.balance += money(amount)?;
        Ok(())
    }

    /// Operator withdrawal; frozen funds cannot be withdrawn.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let amount = money(amount)?;
        self.ensure_available(amount)?;
        self.balance -= amount;
        Ok(())
    }

    /// Reserve funds for a bet or proposal.
    pub fn freeze(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let amount = money(amount)?;
        self.ensure_available(amount)?;
        self.frozen += amount;
        Ok(())
    }

    /// Release reserved funds back to the available balance.
    pub fn unfreeze(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        let amount = money(amount)?;
        self.ensure_frozen(amount)?;
        self.frozen -= amount;
        Ok(())
    }

    /// The stake is lost: it leaves both the frozen and the total balance.
    pub fn settle_loss(&mut self, stake: Decimal) -> Result<(), LedgerError> {
        let stake = money(stake)?;
        self.ensure_frozen(stake)?;
        self.frozen -= stake;
        self.balance -= stake;
        Ok(())
    }

    /// The stake is released and the net winnings are credited.
    pub fn settle_win(&mut self, stake: Decimal, winnings: Decimal) -> Result<(), LedgerError> {
        let stake = money(stake)?;
        if winnings < Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(winnings));
        }
        self.ensure_frozen(stake)?;
        self.frozen -= stake;
        self.balance += winnings;
        Ok(())
    }

    fn ensure_available(&self, amount: Decimal) -> Result<(), LedgerError> {
        if self.available() < amount {
            return Err(LedgerError::InsufficientFunds {
                available: self.available(),
                requested: amount,
            });
        }
        Ok(())
    }

    fn ensure_frozen(&self, amount: Decimal) -> Result<(), LedgerError> {
        if self.frozen < amount {
            return Err(LedgerError::FrozenUnderflow {
                frozen: self.frozen,
                requested: amount,
            });
        }
        Ok(())
    }
}

/// House commission on winnings, truncated to cents.
pub fn commission(winnings: Decimal, rate: Decimal) -> Decimal {
    (winnings * rate).round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// One side of a matched pair, as seen by settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stake {
    pub bet_id: Uuid,
    pub user_id: Uuid,
    pub side: Side,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Won,
    Lost,
    Refunded,
}

/// What settlement does to one stake. `payout` is the total credited back,
/// stake included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeOutcome {
    pub bet_id: Uuid,
    pub user_id: Uuid,
    pub kind: OutcomeKind,
    pub stake: Decimal,
    pub payout: Decimal,
    pub commission: Decimal,
}

impl StakeOutcome {
    pub fn refund(stake: &Stake) -> Self {
        Self {
            bet_id: stake.bet_id,
            user_id: stake.user_id,
            kind: OutcomeKind::Refunded,
            stake: stake.amount,
            payout: stake.amount,
            commission: Decimal::ZERO,
        }
    }

    /// Change to the wallet's total balance.
    pub fn net_change(&self) -> Decimal {
        self.payout - self.stake
    }

    pub fn apply(&self, wallet: &mut WalletBalance) -> Result<(), LedgerError> {
        match self.kind {
            OutcomeKind::Won => wallet.settle_win(self.stake, self.net_change()),
            OutcomeKind::Lost => wallet.settle_loss(self.stake),
            OutcomeKind::Refunded => wallet.unfreeze(self.stake),
        }
    }
}

/// Settle a matched pair.
///
/// The winner receives both stakes minus commission on the loser's stake.
/// Draws and cancellations refund both stakes.
pub fn settle_pair(
    a: &Stake,
    b: &Stake,
    result: FightResult,
    commission_rate: Decimal,
) -> Result<[StakeOutcome; 2], LedgerError> {
    if a.side == b.side {
        return Err(LedgerError::SameSidePair);
    }

    let Some(winning_side) = result.winner() else {
        return Ok([StakeOutcome::refund(a), StakeOutcome::refund(b)]);
    };

    let outcome = |own: &Stake, other: &Stake| {
        if own.side == winning_side {
            let fee = commission(other.amount, commission_rate);
            StakeOutcome {
                bet_id: own.bet_id,
                user_id: own.user_id,
                kind: OutcomeKind::Won,
                stake: own.amount,
                payout: own.amount + other.amount - fee,
                commission: fee,
            }
        } else {
            StakeOutcome {
                bet_id: own.bet_id,
                user_id: own.user_id,
                kind: OutcomeKind::Lost,
                stake: own.amount,
                payout: Decimal::ZERO,
                commission: Decimal::ZERO,
            }
        }
    };

    Ok([outcome(a, b), outcome(b, a)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stake(side: Side, amount: Decimal) -> Stake {
        Stake {
            bet_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            side,
            amount,
        }
    }

    #[test]
    fn freeze_respects_available_funds() {
        let mut wallet = WalletBalance::new(dec!(100), dec!(30));
        assert_eq!(wallet.available(), dec!(70));

        wallet.freeze(dec!(70)).unwrap();
        assert_eq!(wallet, WalletBalance::new(dec!(100), dec!(100)));

        let err = wallet.freeze(dec!(0.01)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                available: dec!(0),
                requested: dec!(0.01)
            }
        );
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let mut wallet = WalletBalance::new(dec!(100), dec!(0));
        assert!(matches!(
            wallet.freeze(dec!(0)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            wallet.credit(dec!(-5)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn amounts_are_whole_cents() {
        assert_eq!(money(dec!(10.00)), Ok(dec!(10.00)));
        assert_eq!(money(dec!(10.500)), Ok(dec!(10.500)));
        assert_eq!(money(dec!(0.01)), Ok(dec!(0.01)));
        assert_eq!(
            money(dec!(10.004)),
            Err(LedgerError::SubCentAmount(dec!(10.004)))
        );

        let mut wallet = WalletBalance::new(dec!(0.01), dec!(0));
        assert_eq!(
            wallet.debit(dec!(0.005)),
            Err(LedgerError::SubCentAmount(dec!(0.005)))
        );
        assert!(wallet.credit(dec!(0.004)).is_err());
        assert_eq!(wallet, WalletBalance::new(dec!(0.01), dec!(0)));
    }

    #[test]
    fn unfreeze_cannot_underflow() {
        let mut wallet = WalletBalance::new(dec!(50), dec!(20));
        assert!(matches!(
            wallet.unfreeze(dec!(25)),
            Err(LedgerError::FrozenUnderflow { .. })
        ));
        wallet.unfreeze(dec!(20)).unwrap();
        assert_eq!(wallet.frozen, dec!(0));
        assert_eq!(wallet.balance, dec!(50));
    }

    #[test]
    fn frozen_funds_cannot_be_withdrawn() {
        let mut wallet = WalletBalance::new(dec!(100), dec!(60));
        assert!(wallet.debit(dec!(50)).is_err());
        wallet.debit(dec!(40)).unwrap();
        assert_eq!(wallet, WalletBalance::new(dec!(60), dec!(60)));
    }

    #[test]
    fn commission_truncates_to_cents() {
        assert_eq!(commission(dec!(100), dec!(0.05)), dec!(5.00));
        assert_eq!(commission(dec!(33.33), dec!(0.1)), dec!(3.33));
        assert_eq!(commission(dec!(0.19), dec!(0.05)), dec!(0.00));
    }

    #[test]
    fn winner_takes_both_stakes_minus_commission() {
        let red = stake(Side::Red, dec!(100));
        let blue = stake(Side::Blue, dec!(80));
        let [r, b] = settle_pair(&red, &blue, FightResult::Red, dec!(0.10)).unwrap();

        assert_eq!(r.kind, OutcomeKind::Won);
        assert_eq!(r.commission, dec!(8.00));
        assert_eq!(r.payout, dec!(172.00));
        assert_eq!(b.kind, OutcomeKind::Lost);
        assert_eq!(b.payout, dec!(0));
    }

    #[test]
    fn draws_and_cancellations_refund_both() {
        let red = stake(Side::Red, dec!(100));
        let blue = stake(Side::Blue, dec!(100));
        for result in [FightResult::Draw, FightResult::Cancelled] {
            let outcomes = settle_pair(&red, &blue, result, dec!(0.10)).unwrap();
            for o in outcomes {
                assert_eq!(o.kind, OutcomeKind::Refunded);
                assert_eq!(o.payout, o.stake);
                assert_eq!(o.commission, dec!(0));
            }
        }
    }

    #[test]
    fn same_side_pairs_are_rejected() {
        let a = stake(Side::Blue, dec!(10));
        let b = stake(Side::Blue, dec!(10));
        assert_eq!(
            settle_pair(&a, &b, FightResult::Blue, dec!(0)),
            Err(LedgerError::SameSidePair)
        );
    }

    #[test]
    fn settlement_conserves_money() {
        let rate = dec!(0.075);
        let cases = [
            (dec!(100), dec!(100), FightResult::Red),
            (dec!(250), dec!(200), FightResult::Blue),
            (dec!(33.33), dec!(10.01), FightResult::Blue),
            (dec!(10), dec!(12.5), FightResult::Draw),
        ];

        for (red_amount, blue_amount, result) in cases {
            let red = stake(Side::Red, red_amount);
            let blue = stake(Side::Blue, blue_amount);
            let mut red_wallet = WalletBalance::new(dec!(500), dec!(0));
            let mut blue_wallet = WalletBalance::new(dec!(500), dec!(0));
            red_wallet.freeze(red_amount).unwrap();
            blue_wallet.freeze(blue_amount).unwrap();
            let before = red_wallet.balance + blue_wallet.balance;

            let [r, b] = settle_pair(&red, &blue, result, rate).unwrap();
            r.apply(&mut red_wallet).unwrap();
            b.apply(&mut blue_wallet).unwrap();

            let house = r.commission + b.commission;
            assert_eq!(red_wallet.balance + blue_wallet.balance + house, before);
            assert_eq!(r.payout + b.payout + house, red_amount + blue_amount);
            assert_eq!(red_wallet.frozen, dec!(0));
            assert_eq!(blue_wallet.frozen, dec!(0));
        }
    }
}
