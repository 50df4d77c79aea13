//! Database access for the mail log tables.
//!
//! [`MessageLogRepo`] is the seam between the sweep and the database: the
//! read side yields qualifying messages in ascending `sent_time` order (so
//! file names and rotation boundaries align with chronological batches), and
//! the delete side only ever operates on an explicit guid manifest or on the
//! timestamp+class filter of the bulk purge path.

mod error;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
pub use error::{DbError, DbResult};
use futures::stream::BoxStream;
pub use postgres::PostgresMessageLog;

use crate::models::{DeliveryEvent, MessageRecord};

/// Rows removed by one delete operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteCounts {
    /// Delivery events deleted.
    pub events: u64,
    /// Message records deleted.
    pub messages: u64,
}

/// Repository over the `messages` and `delivery_events` tables.
#[async_trait]
pub trait MessageLogRepo: Send + Sync {
    /// Stream messages sent before the cutoff, ascending by `sent_time`.
    ///
    /// Bulk-class messages are excluded; they are purged without archival
    /// via [`delete_bulk_before`](MessageLogRepo::delete_bulk_before).
    fn stream_messages_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> BoxStream<'_, DbResult<MessageRecord>>;

    /// Fetch all delivery events for one message.
    async fn fetch_events(&self, guid: &str) -> DbResult<Vec<DeliveryEvent>>;

    /// Guids of bulk-class messages sent before the cutoff.
    async fn fetch_bulk_guids_before(&self, cutoff: DateTime<Utc>) -> DbResult<Vec<String>>;

    /// Delete the delivery events, then the messages, for the given guid
    /// set, in one transaction.
    ///
    /// Fails with [`DbError::EmptyGuidSet`] when `guids` is empty; callers
    /// skip the call rather than issue an unfiltered delete.
    async fn delete_by_guids(&self, guids: &[String]) -> DbResult<DeleteCounts>;

    /// Delete bulk-class messages sent before the cutoff together with
    /// their delivery events, in one transaction. These records are never
    /// archived.
    async fn delete_bulk_before(&self, cutoff: DateTime<Utc>) -> DbResult<DeleteCounts>;

    /// Verify the connection before any work is attempted.
    async fn ping(&self) -> DbResult<()>;
}
