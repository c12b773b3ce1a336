use crate::entities::{BetKind, BetStatus, Side};
use crate::framework::{DatabaseProcessor, PgTx};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Bet {
    pub id: Uuid,
    pub fight_id: Uuid,
    pub user_id: Uuid,
    pub side: Side,
    pub amount: Decimal,
    pub kind: BetKind,
    pub status: BetStatus,
    pub matched_bet_id: Option<Uuid>,
    pub payout: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub created_at: time::PrimitiveDateTime,
    pub matched_at: Option<time::PrimitiveDateTime>,
    pub settled_at: Option<time::PrimitiveDateTime>,
}

const BET_COLUMNS: &str = "id, fight_id, user_id, side, amount, kind, status, matched_bet_id, \
     payout, commission, created_at, matched_at, settled_at";

#[derive(Debug, Clone)]
pub struct BetInsert {
    pub fight_id: Uuid,
    pub user_id: Uuid,
    pub side: Side,
    pub amount: Decimal,
    pub kind: BetKind,
}

impl Bet {
    pub async fn insert_tx(tx: &mut PgTx<'_>, insert: BetInsert) -> Result<Bet, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!(
            r#"
            INSERT INTO bets (id, fight_id, user_id, side, amount, kind)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BET_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(insert.fight_id)
        .bind(insert.user_id)
        .bind(insert.side)
        .bind(insert.amount)
        .bind(insert.kind)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn lock_tx(tx: &mut PgTx<'_>, bet_id: Uuid) -> Result<Option<Bet>, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!(
            "SELECT {BET_COLUMNS} FROM bets WHERE id = $1 FOR UPDATE"
        ))
        .bind(bet_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Lock the oldest open flat bets that could take the other side of a
    /// new bet. Rows locked by another transaction are skipped.
    pub async fn lock_flat_candidates_tx(
        tx: &mut PgTx<'_>,
        fight_id: Uuid,
        side: Side,
        amount: Decimal,
        exclude_user: Uuid,
        limit: i64,
    ) -> Result<Vec<Bet>, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!(
            r#"
            SELECT {BET_COLUMNS}
            FROM bets
            WHERE fight_id = $1
              AND side = $2
              AND amount = $3
              AND user_id <> $4
              AND kind = 'flat'
              AND status = 'pending'
            ORDER BY created_at, id
            LIMIT $5
            FOR UPDATE SKIP LOCKED
            "#
        ))
        .bind(fight_id)
        .bind(side)
        .bind(amount)
        .bind(exclude_user)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await
    }

    pub async fn lock_by_status_tx(
        tx: &mut PgTx<'_>,
        fight_id: Uuid,
        status: BetStatus,
    ) -> Result<Vec<Bet>, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!(
            r#"
            SELECT {BET_COLUMNS}
            FROM bets
            WHERE fight_id = $1 AND status = $2
            ORDER BY created_at, id
            FOR UPDATE
            "#
        ))
        .bind(fight_id)
        .bind(status)
        .fetch_all(&mut **tx)
        .await
    }

    /// Link two bets to each other and mark both matched.
    pub async fn mark_matched_pair_tx(
        tx: &mut PgTx<'_>,
        bet_id: Uuid,
        counter_bet_id: Uuid,
        kind: BetKind,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bets
            SET status = 'matched',
                kind = $3,
                matched_bet_id = CASE WHEN id = $1 THEN $2 ELSE $1 END,
                matched_at = (NOW() AT TIME ZONE 'utc')
            WHERE id IN ($1, $2)
            "#,
        )
        .bind(bet_id)
        .bind(counter_bet_id)
        .bind(kind)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn set_status_tx(
        tx: &mut PgTx<'_>,
        bet_id: Uuid,
        status: BetStatus,
    ) -> Result<Bet, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!(
            "UPDATE bets SET status = $1 WHERE id = $2 RETURNING {BET_COLUMNS}"
        ))
        .bind(status)
        .bind(bet_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Record the final state of a bet after settlement or refund.
    pub async fn record_settlement_tx(
        tx: &mut PgTx<'_>,
        bet_id: Uuid,
        status: BetStatus,
        payout: Decimal,
        commission: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bets
            SET status = $1, payout = $2, commission = $3,
                settled_at = (NOW() AT TIME ZONE 'utc')
            WHERE id = $4
            "#,
        )
        .bind(status)
        .bind(payout)
        .bind(commission)
        .bind(bet_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn find_tx(tx: &mut PgTx<'_>, bet_id: Uuid) -> Result<Option<Bet>, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!("SELECT {BET_COLUMNS} FROM bets WHERE id = $1"))
            .bind(bet_id)
            .fetch_optional(&mut **tx)
            .await
    }
}

#[derive(Debug, Clone)]
/// List bets with optional filters, newest first.
pub struct ListBets {
    pub limit: i64,
    pub offset: i64,
    pub fight_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<BetStatus>,
}

impl Processor<ListBets> for DatabaseProcessor {
    type Output = Vec<Bet>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListBets")]
    async fn process(&self, query: ListBets) -> Result<Vec<Bet>, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!(
            r#"
            SELECT {BET_COLUMNS}
            FROM bets
            WHERE ($1::uuid IS NULL OR fight_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::bet_status IS NULL OR status = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(query.fight_id)
        .bind(query.user_id)
        .bind(query.status)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Open (pending) bets on a fight, oldest first: the queue auto-matching
/// draws from.
pub struct ListOpenBets {
    pub fight_id: Uuid,
    pub limit: i64,
    pub offset: i64,
}

impl Processor<ListOpenBets> for DatabaseProcessor {
    type Output = Vec<Bet>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListOpenBets")]
    async fn process(&self, query: ListOpenBets) -> Result<Vec<Bet>, sqlx::Error> {
        sqlx::query_as::<_, Bet>(&format!(
            r#"
            SELECT {BET_COLUMNS}
            FROM bets
            WHERE fight_id = $1 AND status = 'pending'
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(query.fight_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}
