use crate::entities::ProposalStatus;
use crate::framework::{DatabaseProcessor, PgTx};
use kanau::processor::Processor;
use rust_decimal::Decimal;
use uuid::Uuid;

/// An offer to take the other side of an open bet with a different stake.
/// The proposer's stake stays frozen while the proposal is pending.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PagoProposal {
    pub id: Uuid,
    pub bet_id: Uuid,
    pub proposer_id: Uuid,
    pub amount: Decimal,
    pub status: ProposalStatus,
    pub created_at: time::PrimitiveDateTime,
    pub resolved_at: Option<time::PrimitiveDateTime>,
}

const PROPOSAL_COLUMNS: &str = "id, bet_id, proposer_id, amount, status, created_at, resolved_at";

impl PagoProposal {
    pub async fn insert_tx(
        tx: &mut PgTx<'_>,
        bet_id: Uuid,
        proposer_id: Uuid,
        amount: Decimal,
    ) -> Result<PagoProposal, sqlx::Error> {
        sqlx::query_as::<_, PagoProposal>(&format!(
            r#"
            INSERT INTO pago_proposals (id, bet_id, proposer_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(bet_id)
        .bind(proposer_id)
        .bind(amount)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn lock_tx(
        tx: &mut PgTx<'_>,
        proposal_id: Uuid,
    ) -> Result<Option<PagoProposal>, sqlx::Error> {
        sqlx::query_as::<_, PagoProposal>(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM pago_proposals WHERE id = $1 FOR UPDATE"
        ))
        .bind(proposal_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn find_tx(
        tx: &mut PgTx<'_>,
        proposal_id: Uuid,
    ) -> Result<Option<PagoProposal>, sqlx::Error> {
        sqlx::query_as::<_, PagoProposal>(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM pago_proposals WHERE id = $1"
        ))
        .bind(proposal_id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn has_pending_tx(
        tx: &mut PgTx<'_>,
        bet_id: Uuid,
        proposer_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM pago_proposals
                WHERE bet_id = $1 AND proposer_id = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(bet_id)
        .bind(proposer_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Pending proposals on the given bets, oldest first.
    pub async fn lock_pending_for_bets_tx(
        tx: &mut PgTx<'_>,
        bet_ids: &[Uuid],
    ) -> Result<Vec<PagoProposal>, sqlx::Error> {
        if bet_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, PagoProposal>(&format!(
            r#"
            SELECT {PROPOSAL_COLUMNS}
            FROM pago_proposals
            WHERE bet_id = ANY($1) AND status = 'pending'
            ORDER BY created_at, id
            FOR UPDATE
            "#
        ))
        .bind(bet_ids)
        .fetch_all(&mut **tx)
        .await
    }

    /// Pending proposals on any bet of a fight.
    pub async fn lock_pending_for_fight_tx(
        tx: &mut PgTx<'_>,
        fight_id: Uuid,
    ) -> Result<Vec<PagoProposal>, sqlx::Error> {
        sqlx::query_as::<_, PagoProposal>(
            r#"
            SELECT p.id, p.bet_id, p.proposer_id, p.amount, p.status, p.created_at, p.resolved_at
            FROM pago_proposals p
            JOIN bets b ON b.id = p.bet_id
            WHERE b.fight_id = $1 AND p.status = 'pending'
            ORDER BY p.created_at, p.id
            FOR UPDATE OF p
            "#,
        )
        .bind(fight_id)
        .fetch_all(&mut **tx)
        .await
    }

    pub async fn resolve_tx(
        tx: &mut PgTx<'_>,
        proposal_id: Uuid,
        status: ProposalStatus,
    ) -> Result<PagoProposal, sqlx::Error> {
        sqlx::query_as::<_, PagoProposal>(&format!(
            r#"
            UPDATE pago_proposals
            SET status = $1, resolved_at = (NOW() AT TIME ZONE 'utc')
            WHERE id = $2
            RETURNING {PROPOSAL_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(proposal_id)
        .fetch_one(&mut **tx)
        .await
    }
}

#[derive(Debug, Clone)]
/// Pending proposals made against a user's open bets.
pub struct ListIncomingProposals {
    pub owner_id: Uuid,
    pub limit: i64,
    pub offset: i64,
}

impl Processor<ListIncomingProposals> for DatabaseProcessor {
    type Output = Vec<PagoProposal>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListIncomingProposals")]
    async fn process(
        &self,
        query: ListIncomingProposals,
    ) -> Result<Vec<PagoProposal>, sqlx::Error> {
        sqlx::query_as::<_, PagoProposal>(
            r#"
            SELECT p.id, p.bet_id, p.proposer_id, p.amount, p.status, p.created_at, p.resolved_at
            FROM pago_proposals p
            JOIN bets b ON b.id = p.bet_id
            WHERE b.user_id = $1 AND p.status = 'pending'
            ORDER BY p.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.owner_id)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// IDs of pending proposals created before the cutoff, oldest first.
pub struct ListStaleProposalIds {
    pub created_before: time::PrimitiveDateTime,
    pub limit: i64,
}

impl Processor<ListStaleProposalIds> for DatabaseProcessor {
    type Output = Vec<Uuid>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListStaleProposalIds")]
    async fn process(&self, query: ListStaleProposalIds) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM pago_proposals
            WHERE status = 'pending' AND created_at < $1
            ORDER BY created_at
            LIMIT $2
            "#,
        )
        .bind(query.created_before)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
    }
}
