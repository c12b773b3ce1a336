use super::error::BetError;
use super::wallet_book::{Entry, WalletBook};
use super::{BetService, Events};
use crate::entities::WalletTransactionKind;
use crate::entities::users::User;
use crate::entities::wallets::Wallet;
use crate::rules::ledger::{LedgerError, WalletBalance, money};
use compact_str::CompactString;
use rust_decimal::Decimal;
use uuid::Uuid;

impl BetService {
    /// Create a user together with an empty wallet.
    #[tracing::instrument(skip(self), err)]
    pub async fn register_user(
        &self,
        username: CompactString,
        display_name: Option<String>,
    ) -> Result<User, BetError> {
        let mut tx = self.begin().await?;
        let user = match User::insert_tx(&mut tx, &username, display_name.as_deref()).await {
            Ok(user) => user,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(BetError::UsernameTaken(username));
            }
            Err(e) => return Err(e.into()),
        };
        Wallet::insert_tx(&mut tx, user.id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, %username, "User registered");
        Ok(user)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn deposit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<Wallet, BetError> {
        self.adjust_wallet(user_id, WalletTransactionKind::Deposit, amount, note, |w| {
            w.credit(amount)
        })
        .await
    }

    /// Frozen funds cannot be withdrawn.
    #[tracing::instrument(skip(self), err)]
    pub async fn withdraw(
        &self,
        user_id: Uuid,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<Wallet, BetError> {
        self.adjust_wallet(user_id, WalletTransactionKind::Withdrawal, amount, note, |w| {
            w.debit(amount)
        })
        .await
    }

    async fn adjust_wallet(
        &self,
        user_id: Uuid,
        kind: WalletTransactionKind,
        amount: Decimal,
        note: Option<String>,
        op: impl FnOnce(&mut WalletBalance) -> Result<(), LedgerError>,
    ) -> Result<Wallet, BetError> {
        money(amount).map_err(BetError::ledger(user_id))?;
        let mut tx = self.begin().await?;
        let mut book = WalletBook::lock(&mut tx, [user_id]).await?;
        let mut entry = Entry::new(kind, amount, None);
        entry.note = note;
        book.apply(user_id, entry, op)?;

        let mut events = Events::new();
        let wallet = book
            .store(&mut tx, &mut events)
            .await?
            .pop()
            .ok_or(BetError::UserNotFound(user_id))?;
        self.finish(tx, events).await?;
        Ok(wallet)
    }
}
