use crate::entities::WalletTransactionKind;
use crate::framework::{DatabaseProcessor, PgTx};
use crate::rules::ledger::WalletBalance;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Wallet {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub frozen: Decimal,
    pub updated_at: time::PrimitiveDateTime,
}

impl Wallet {
    pub fn snapshot(&self) -> WalletBalance {
        WalletBalance::new(self.balance, self.frozen)
    }

    pub async fn insert_tx(tx: &mut PgTx<'_>, user_id: Uuid) -> Result<Wallet, sqlx::Error> {
        sqlx::query_as::<_, Wallet>(
            r#"
            INSERT INTO wallets (user_id) VALUES ($1)
            RETURNING user_id, balance, frozen, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Lock several wallet rows, always in ascending `user_id` order so that
    /// concurrent transactions cannot deadlock on each other.
    pub async fn lock_many_tx(
        tx: &mut PgTx<'_>,
        user_ids: &[Uuid],
    ) -> Result<Vec<Wallet>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Wallet>(
            r#"
            SELECT user_id, balance, frozen, updated_at
            FROM wallets
            WHERE user_id = ANY($1)
            ORDER BY user_id
            FOR UPDATE
            "#,
        )
        .bind(user_ids)
        .fetch_all(&mut **tx)
        .await
    }

    pub async fn store_tx(
        tx: &mut PgTx<'_>,
        user_id: Uuid,
        balance: WalletBalance,
    ) -> Result<Wallet, sqlx::Error> {
        sqlx::query_as::<_, Wallet>(
            r#"
            UPDATE wallets
            SET balance = $1, frozen = $2, updated_at = (NOW() AT TIME ZONE 'utc')
            WHERE user_id = $3
            RETURNING user_id, balance, frozen, updated_at
            "#,
        )
        .bind(balance.balance)
        .bind(balance.frozen)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WalletTransaction {
    pub id: i64,
    pub user_id: Uuid,
    pub kind: WalletTransactionKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub frozen_after: Decimal,
    pub bet_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: time::PrimitiveDateTime,
}

/// A ledger line to append after a wallet mutation.
#[derive(Debug, Clone)]
pub struct WalletTransactionInsert {
    pub user_id: Uuid,
    pub kind: WalletTransactionKind,
    pub amount: Decimal,
    pub after: WalletBalance,
    pub bet_id: Option<Uuid>,
    pub note: Option<String>,
}

impl WalletTransaction {
    pub async fn insert_tx(
        tx: &mut PgTx<'_>,
        insert: WalletTransactionInsert,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO wallet_transactions
            (user_id, kind, amount, balance_after, frozen_after, bet_id, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(insert.user_id)
        .bind(insert.kind)
        .bind(insert.amount)
        .bind(insert.after.balance)
        .bind(insert.after.frozen)
        .bind(insert.bet_id)
        .bind(insert.note)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GetWallet {
    pub user_id: Uuid,
}

impl Processor<GetWallet> for DatabaseProcessor {
    type Output = Option<Wallet>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetWallet")]
    async fn process(&self, query: GetWallet) -> Result<Option<Wallet>, sqlx::Error> {
        sqlx::query_as::<_, Wallet>(
            "SELECT user_id, balance, frozen, updated_at FROM wallets WHERE user_id = $1",
        )
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Newest first.
pub struct ListWalletTransactions {
    pub user_id: Uuid,
    pub limit: i64,
    pub offset: i64,
}

impl Processor<ListWalletTransactions> for DatabaseProcessor {
    type Output = Vec<WalletTransaction>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListWalletTransactions")]
    async fn process(
        &self,
        query: ListWalletTransactions,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        sqlx::query_as::<_, WalletTransaction>(
            r#"
            SELECT id, user_id, kind, amount, balance_after, frozen_after, bet_id, note, created_at
            FROM wallet_transactions
            WHERE user_id = $1
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.user_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}
