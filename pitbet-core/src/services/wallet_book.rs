//! Wallet rows locked for one bet transaction.

use super::error::BetError;
use crate::entities::WalletTransactionKind;
use crate::entities::wallets::{Wallet, WalletTransaction, WalletTransactionInsert};
use crate::framework::PgTx;
use crate::notify::BetEvent;
use crate::rules::ledger::{LedgerError, WalletBalance};
use itertools::Itertools;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Every wallet a transaction touches is locked up front in one ordered
/// statement. Mutations happen in memory and are written back, together with
/// their ledger lines, by [`WalletBook::store`].
pub(crate) struct WalletBook {
    balances: BTreeMap<Uuid, WalletBalance>,
    dirty: Vec<Uuid>,
    lines: Vec<WalletTransactionInsert>,
}

/// One ledger line's worth of description.
pub(crate) struct Entry {
    pub kind: WalletTransactionKind,
    pub amount: Decimal,
    pub bet_id: Option<Uuid>,
    pub note: Option<String>,
}

impl Entry {
    pub fn new(kind: WalletTransactionKind, amount: Decimal, bet_id: Option<Uuid>) -> Self {
        Self {
            kind,
            amount,
            bet_id,
            note: None,
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl WalletBook {
    pub async fn lock(
        tx: &mut PgTx<'_>,
        user_ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<Self, BetError> {
        let ids: Vec<Uuid> = user_ids.into_iter().sorted().dedup().collect();
        let rows = Wallet::lock_many_tx(tx, &ids).await?;
        let balances: BTreeMap<Uuid, WalletBalance> =
            rows.iter().map(|w| (w.user_id, w.snapshot())).collect();

        if let Some(missing) = ids.iter().find(|id| !balances.contains_key(id)) {
            return Err(BetError::UserNotFound(*missing));
        }

        Ok(Self {
            balances,
            dirty: Vec::new(),
            lines: Vec::new(),
        })
    }

    /// Apply `op` to a locked wallet and queue the matching ledger line.
    pub fn apply(
        &mut self,
        user_id: Uuid,
        entry: Entry,
        op: impl FnOnce(&mut WalletBalance) -> Result<(), LedgerError>,
    ) -> Result<(), BetError> {
        let wallet = self
            .balances
            .get_mut(&user_id)
            .ok_or(BetError::UserNotFound(user_id))?;
        op(wallet).map_err(BetError::ledger(user_id))?;

        if !self.dirty.contains(&user_id) {
            self.dirty.push(user_id);
        }
        self.lines.push(WalletTransactionInsert {
            user_id,
            kind: entry.kind,
            amount: entry.amount,
            after: *wallet,
            bet_id: entry.bet_id,
            note: entry.note,
        });
        Ok(())
    }

    /// Write changed wallets and ledger lines. Returns the stored rows.
    pub async fn store(
        self,
        tx: &mut PgTx<'_>,
        events: &mut impl Extend<BetEvent>,
    ) -> Result<Vec<Wallet>, BetError> {
        let mut stored = Vec::with_capacity(self.dirty.len());
        for user_id in self.dirty {
            let Some(balance) = self.balances.get(&user_id).copied() else {
                continue;
            };
            stored.push(Wallet::store_tx(tx, user_id, balance).await?);
            events.extend([BetEvent::WalletChanged { user_id, balance }]);
        }
        for line in self.lines {
            WalletTransaction::insert_tx(tx, line).await?;
        }
        Ok(stored)
    }
}
