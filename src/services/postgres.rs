use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;
use uuid::Uuid;
use crate::models::{ChatRoom, Decision, DecisionKind, Match, MatchPair, Notification, QueueEntry};
use crate::services::store::{StorageError, Store, StoreTransaction};

/// PostgreSQL-backed store
///
/// Uniqueness is enforced by the schema: the decisions primary key rejects a
/// second decision for the same (actor, target, kind) and the matches unique
/// key rejects a second row for the same canonicalized pair. Writes use
/// `ON CONFLICT DO NOTHING` so a losing concurrent insert is reported as
/// "not written" instead of aborting the transaction.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StorageError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl Store for PostgresStore {
    type Tx = PgStoreTransaction;

    async fn begin(&self) -> Result<Self::Tx, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(PgStoreTransaction { tx })
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StorageError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Open PostgreSQL transaction. Rolled back on drop unless committed.
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

fn decision_from_row(row: &PgRow) -> Result<Decision, sqlx::Error> {
    Ok(Decision {
        actor_id: row.try_get("actor_id")?,
        target_id: row.try_get("target_id")?,
        kind: row.try_get("kind")?,
        direction: row.try_get("direction")?,
        created_at: row.try_get("created_at")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, sqlx::Error> {
    let user_a: Uuid = row.try_get("user_a")?;
    let user_b: Uuid = row.try_get("user_b")?;
    Ok(Match {
        id: row.try_get("id")?,
        pair: MatchPair::new(user_a, user_b),
        created_at: row.try_get("created_at")?,
    })
}

fn notification_from_row(row: &PgRow) -> Result<Notification, sqlx::Error> {
    Ok(Notification {
        id: row.try_get("id")?,
        recipient_id: row.try_get("recipient_id")?,
        kind: row.try_get("kind")?,
        payload: row.try_get("payload")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn insert_decision(&mut self, decision: &Decision) -> Result<bool, StorageError> {
        let query = r#"
            INSERT INTO decisions (actor_id, target_id, kind, direction, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (actor_id, target_id, kind) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(decision.actor_id)
            .bind(decision.target_id)
            .bind(decision.kind)
            .bind(decision.direction)
            .bind(decision.created_at)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_decision(
        &mut self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: DecisionKind,
    ) -> Result<Option<Decision>, StorageError> {
        let query = r#"
            SELECT actor_id, target_id, kind, direction, created_at
            FROM decisions
            WHERE actor_id = $1 AND target_id = $2 AND kind = $3
        "#;

        let row = sqlx::query(query)
            .bind(actor_id)
            .bind(target_id)
            .bind(kind)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.as_ref().map(decision_from_row).transpose()?)
    }

    async fn delete_queue_entry(
        &mut self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: DecisionKind,
    ) -> Result<u64, StorageError> {
        let query = r#"
            DELETE FROM queue_entries
            WHERE actor_id = $1 AND target_id = $2 AND kind = $3
        "#;

        let result = sqlx::query(query)
            .bind(actor_id)
            .bind(target_id)
            .bind(kind)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_queue(
        &mut self,
        actor_id: Uuid,
        kind: Option<DecisionKind>,
    ) -> Result<u64, StorageError> {
        let query = r#"
            DELETE FROM queue_entries
            WHERE actor_id = $1 AND ($2::decision_kind IS NULL OR kind = $2)
        "#;

        let result = sqlx::query(query)
            .bind(actor_id)
            .bind(kind)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_queue(
        &mut self,
        actor_id: Uuid,
        kind: DecisionKind,
    ) -> Result<Vec<QueueEntry>, StorageError> {
        let query = r#"
            SELECT actor_id, target_id, kind, inserted_at
            FROM queue_entries
            WHERE actor_id = $1 AND kind = $2
            ORDER BY inserted_at ASC
        "#;

        let rows = sqlx::query(query)
            .bind(actor_id)
            .bind(kind)
            .fetch_all(&mut *self.tx)
            .await?;

        let entries: Result<Vec<QueueEntry>, sqlx::Error> = rows
            .iter()
            .map(|row| {
                Ok(QueueEntry {
                    actor_id: row.try_get("actor_id")?,
                    target_id: row.try_get("target_id")?,
                    kind: row.try_get("kind")?,
                    inserted_at: row.try_get("inserted_at")?,
                })
            })
            .collect();

        Ok(entries?)
    }

    async fn lock_pair(&mut self, pair: &MatchPair) -> Result<(), StorageError> {
        // Released automatically at commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(pair.lock_key())
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn insert_match(&mut self, record: &Match) -> Result<bool, StorageError> {
        let query = r#"
            INSERT INTO matches (id, user_a, user_b, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_a, user_b) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(record.id)
            .bind(record.pair.user_a())
            .bind(record.pair.user_b())
            .bind(record.created_at)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_match(&mut self, pair: &MatchPair) -> Result<Option<Match>, StorageError> {
        let query = r#"
            SELECT id, user_a, user_b, created_at
            FROM matches
            WHERE user_a = $1 AND user_b = $2
        "#;

        let row = sqlx::query(query)
            .bind(pair.user_a())
            .bind(pair.user_b())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.as_ref().map(match_from_row).transpose()?)
    }

    async fn list_matches(&mut self, user_id: Uuid) -> Result<Vec<Match>, StorageError> {
        let query = r#"
            SELECT id, user_a, user_b, created_at
            FROM matches
            WHERE user_a = $1 OR user_b = $1
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;

        let matches: Result<Vec<Match>, sqlx::Error> = rows.iter().map(match_from_row).collect();
        Ok(matches?)
    }

    async fn find_chat_room(&mut self, room_id: Uuid) -> Result<Option<ChatRoom>, StorageError> {
        let query = r#"
            SELECT id, user_one, user_two
            FROM chat_rooms
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(room_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        let room = row
            .map(|row| -> Result<ChatRoom, sqlx::Error> {
                Ok(ChatRoom {
                    id: row.try_get("id")?,
                    user_one: row.try_get("user_one")?,
                    user_two: row.try_get("user_two")?,
                })
            })
            .transpose()?;

        Ok(room)
    }

    async fn insert_notification(&mut self, notification: &Notification) -> Result<(), StorageError> {
        let query = r#"
            INSERT INTO notifications (id, recipient_id, kind, payload, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        sqlx::query(query)
            .bind(notification.id)
            .bind(notification.recipient_id)
            .bind(notification.kind)
            .bind(&notification.payload)
            .bind(notification.read)
            .bind(notification.created_at)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn list_unread_notifications(
        &mut self,
        recipient_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, StorageError> {
        let query = r#"
            SELECT id, recipient_id, kind, payload, read, created_at
            FROM notifications
            WHERE recipient_id = $1 AND NOT read
            ORDER BY created_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(recipient_id)
            .bind(limit as i64)
            .fetch_all(&mut *self.tx)
            .await?;

        let notifications: Result<Vec<Notification>, sqlx::Error> =
            rows.iter().map(notification_from_row).collect();
        Ok(notifications?)
    }

    async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await?;
        Ok(())
    }
}
