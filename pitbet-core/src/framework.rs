use sqlx::PgPool;

/// Runs the read-side [`kanau::processor::Processor`] queries against the
/// connection pool.
#[derive(Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

/// Shorthand for the transaction handle threaded through write paths.
pub type PgTx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
