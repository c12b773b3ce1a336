use crate::framework::{DatabaseProcessor, PgTx};
use compact_str::CompactString;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: CompactString,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: time::PrimitiveDateTime,
}

const USER_COLUMNS: &str = "id, username, display_name, is_active, created_at";

impl User {
    /// Insert a new user. Fails with a unique violation when the username is
    /// taken.
    pub async fn insert_tx(
        tx: &mut PgTx<'_>,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, display_name) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(username)
        .bind(display_name)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_tx(tx: &mut PgTx<'_>, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct GetUserById {
    pub user_id: Uuid,
}

impl Processor<GetUserById> for DatabaseProcessor {
    type Output = Option<User>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserById")]
    async fn process(&self, query: GetUserById) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(query.user_id)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct GetUserByUsername {
    pub username: String,
}

impl Processor<GetUserByUsername> for DatabaseProcessor {
    type Output = Option<User>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUserByUsername")]
    async fn process(&self, query: GetUserByUsername) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(query.username)
        .fetch_optional(&self.pool)
        .await
    }
}
