use crate::entities::EventStatus;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// A card of fights held at one venue on one date.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EventRecord {
    pub id: Uuid,
    pub name: String,
    pub venue: Option<String>,
    pub scheduled_at: time::PrimitiveDateTime,
    pub status: EventStatus,
    pub created_at: time::PrimitiveDateTime,
}

const EVENT_COLUMNS: &str = "id, name, venue, scheduled_at, status, created_at";

#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub name: String,
    pub venue: Option<String>,
    pub scheduled_at: time::PrimitiveDateTime,
}

impl Processor<CreateEvent> for DatabaseProcessor {
    type Output = EventRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateEvent")]
    async fn process(&self, insert: CreateEvent) -> Result<EventRecord, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(&format!(
            r#"
            INSERT INTO events (id, name, venue, scheduled_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(insert.name)
        .bind(insert.venue)
        .bind(insert.scheduled_at)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct GetEventById {
    pub event_id: Uuid,
}

impl Processor<GetEventById> for DatabaseProcessor {
    type Output = Option<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventById")]
    async fn process(&self, query: GetEventById) -> Result<Option<EventRecord>, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(query.event_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Most recently scheduled first.
pub struct ListEvents {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<EventStatus>,
}

impl Processor<ListEvents> for DatabaseProcessor {
    type Output = Vec<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListEvents")]
    async fn process(&self, query: ListEvents) -> Result<Vec<EventRecord>, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE ($1::event_status IS NULL OR status = $1)
            ORDER BY scheduled_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(query.status)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct UpdateEventStatus {
    pub event_id: Uuid,
    pub status: EventStatus,
}

impl Processor<UpdateEventStatus> for DatabaseProcessor {
    type Output = Option<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateEventStatus")]
    async fn process(&self, update: UpdateEventStatus) -> Result<Option<EventRecord>, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(&format!(
            "UPDATE events SET status = $1 WHERE id = $2 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(update.status)
        .bind(update.event_id)
        .fetch_optional(&self.pool)
        .await
    }
}
