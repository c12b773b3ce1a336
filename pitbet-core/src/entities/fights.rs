use crate::entities::{FightResult, FightStatus, Side};
use crate::framework::{DatabaseProcessor, PgTx};
use compact_str::CompactString;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Fight {
    pub id: Uuid,
    pub event_id: Uuid,
    pub fight_number: i32,
    pub red_entry: CompactString,
    pub blue_entry: CompactString,
    pub status: FightStatus,
    pub result: Option<FightResult>,
    pub red_total: Decimal,
    pub blue_total: Decimal,
    pub bet_count: i32,
    pub matched_count: i32,
    pub created_at: time::PrimitiveDateTime,
    pub settled_at: Option<time::PrimitiveDateTime>,
}

const FIGHT_COLUMNS: &str = "id, event_id, fight_number, red_entry, blue_entry, status, result, \
     red_total, blue_total, bet_count, matched_count, created_at, settled_at";

impl Fight {
    /// Lock the fight row. Every bet operation on a fight takes this lock
    /// first, which serializes matching and settlement per fight.
    pub async fn lock_tx(tx: &mut PgTx<'_>, fight_id: Uuid) -> Result<Option<Fight>, sqlx::Error> {
        sqlx::query_as::<_, Fight>(&format!(
            "SELECT {FIGHT_COLUMNS} FROM fights WHERE id = $1 FOR UPDATE"
        ))
        .bind(fight_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn set_status_tx(
        tx: &mut PgTx<'_>,
        fight_id: Uuid,
        status: FightStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE fights SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(fight_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn increment_bet_count_tx(tx: &mut PgTx<'_>, fight_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE fights SET bet_count = bet_count + 1 WHERE id = $1")
            .bind(fight_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Add a freshly matched pair to the corner totals. Returns the new
    /// `(red_total, blue_total)`.
    pub async fn add_matched_pair_tx(
        tx: &mut PgTx<'_>,
        fight_id: Uuid,
        red_amount: Decimal,
        blue_amount: Decimal,
    ) -> Result<(Decimal, Decimal), sqlx::Error> {
        sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            UPDATE fights
            SET red_total = red_total + $1,
                blue_total = blue_total + $2,
                matched_count = matched_count + 1
            WHERE id = $3
            RETURNING red_total, blue_total
            "#,
        )
        .bind(red_amount)
        .bind(blue_amount)
        .bind(fight_id)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn mark_settled_tx(
        tx: &mut PgTx<'_>,
        fight_id: Uuid,
        status: FightStatus,
        result: FightResult,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE fights
            SET status = $1, result = $2, settled_at = (NOW() AT TIME ZONE 'utc')
            WHERE id = $3
            "#,
        )
        .bind(status)
        .bind(result)
        .bind(fight_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// Assign a matched stake to its corner as `(red, blue)` deltas.
pub fn corner_amounts(side: Side, amount: Decimal, counter_amount: Decimal) -> (Decimal, Decimal) {
    match side {
        Side::Red => (amount, counter_amount),
        Side::Blue => (counter_amount, amount),
    }
}

#[derive(Debug, Clone)]
pub struct CreateFight {
    pub event_id: Uuid,
    pub fight_number: i32,
    pub red_entry: CompactString,
    pub blue_entry: CompactString,
}

impl Processor<CreateFight> for DatabaseProcessor {
    type Output = Fight;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateFight")]
    async fn process(&self, insert: CreateFight) -> Result<Fight, sqlx::Error> {
        sqlx::query_as::<_, Fight>(&format!(
            r#"
            INSERT INTO fights (id, event_id, fight_number, red_entry, blue_entry)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {FIGHT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(insert.event_id)
        .bind(insert.fight_number)
        .bind(insert.red_entry.as_str())
        .bind(insert.blue_entry.as_str())
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetFightById {
    pub fight_id: Uuid,
}

impl Processor<GetFightById> for DatabaseProcessor {
    type Output = Option<Fight>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetFightById")]
    async fn process(&self, query: GetFightById) -> Result<Option<Fight>, sqlx::Error> {
        sqlx::query_as::<_, Fight>(&format!("SELECT {FIGHT_COLUMNS} FROM fights WHERE id = $1"))
            .bind(query.fight_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Fights of one event in card order.
pub struct ListFightsForEvent {
    pub event_id: Uuid,
}

impl Processor<ListFightsForEvent> for DatabaseProcessor {
    type Output = Vec<Fight>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListFightsForEvent")]
    async fn process(&self, query: ListFightsForEvent) -> Result<Vec<Fight>, sqlx::Error> {
        sqlx::query_as::<_, Fight>(&format!(
            "SELECT {FIGHT_COLUMNS} FROM fights WHERE event_id = $1 ORDER BY fight_number"
        ))
        .bind(query.event_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_amounts_follow_the_side() {
        let (red, blue) = corner_amounts(Side::Blue, Decimal::new(100, 0), Decimal::new(80, 0));
        assert_eq!(red, Decimal::new(80, 0));
        assert_eq!(blue, Decimal::new(100, 0));
    }
}
