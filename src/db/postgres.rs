//! PostgreSQL implementation of the message log repository.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream::BoxStream};
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};

use super::{DbError, DbResult, DeleteCounts, MessageLogRepo};
use crate::{
    config::DatabaseConfig,
    models::{DeliveryEvent, MessageClass, MessageRecord},
};

pub struct PostgresMessageLog {
    pool: PgPool,
}

impl PostgresMessageLog {
    /// Connect to the mail log database.
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }
}

fn row_to_message(row: &PgRow) -> DbResult<MessageRecord> {
    let class: String = row.try_get("class")?;
    let class = class
        .parse::<MessageClass>()
        .map_err(DbError::Decode)?;

    Ok(MessageRecord {
        guid: row.try_get("guid")?,
        sent_time: row.try_get("sent_time")?,
        recipient: row.try_get("recipient")?,
        sender: row.try_get("sender")?,
        relay_host: row.try_get("relay_host")?,
        message_type: row.try_get("message_type")?,
        class,
    })
}

fn row_to_event(row: &PgRow) -> DbResult<DeliveryEvent> {
    Ok(DeliveryEvent {
        guid: row.try_get("guid")?,
        event_type: row.try_get("event_type")?,
        event_time: row.try_get("event_time")?,
        status_code: row.try_get("status_code")?,
        detail: row.try_get("detail")?,
    })
}

#[async_trait]
impl MessageLogRepo for PostgresMessageLog {
    fn stream_messages_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> BoxStream<'_, DbResult<MessageRecord>> {
        sqlx::query(
            r#"
            SELECT guid, sent_time, recipient, sender, relay_host, message_type, class
            FROM messages
            WHERE sent_time < $1 AND class <> $2
            ORDER BY sent_time ASC
            "#,
        )
        .bind(cutoff)
        .bind(MessageClass::Bulk.as_str())
        .fetch(&self.pool)
        .map(|result| result.map_err(DbError::from).and_then(|row| row_to_message(&row)))
        .boxed()
    }

    async fn fetch_events(&self, guid: &str) -> DbResult<Vec<DeliveryEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT guid, event_type, event_time, status_code, detail
            FROM delivery_events
            WHERE guid = $1
            "#,
        )
        .bind(guid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_event).collect()
    }

    async fn fetch_bulk_guids_before(&self, cutoff: DateTime<Utc>) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT guid FROM messages
            WHERE sent_time < $1 AND class = $2
            "#,
        )
        .bind(cutoff)
        .bind(MessageClass::Bulk.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("guid").map_err(DbError::from))
            .collect()
    }

    async fn delete_by_guids(&self, guids: &[String]) -> DbResult<DeleteCounts> {
        if guids.is_empty() {
            return Err(DbError::EmptyGuidSet);
        }

        let mut tx = self.pool.begin().await?;

        // Events first, for referential cleanliness. Parameterized array
        // bind; never a spliced IN (...) list.
        let events = sqlx::query("DELETE FROM delivery_events WHERE guid = ANY($1)")
            .bind(guids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let messages = sqlx::query("DELETE FROM messages WHERE guid = ANY($1)")
            .bind(guids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(DeleteCounts { events, messages })
    }

    async fn delete_bulk_before(&self, cutoff: DateTime<Utc>) -> DbResult<DeleteCounts> {
        let mut tx = self.pool.begin().await?;

        let events = sqlx::query(
            r#"
            DELETE FROM delivery_events
            WHERE guid IN (
                SELECT guid FROM messages
                WHERE sent_time < $1 AND class = $2
            )
            "#,
        )
        .bind(cutoff)
        .bind(MessageClass::Bulk.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let messages = sqlx::query(
            r#"
            DELETE FROM messages
            WHERE sent_time < $1 AND class = $2
            "#,
        )
        .bind(cutoff)
        .bind(MessageClass::Bulk.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(DeleteCounts { events, messages })
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
