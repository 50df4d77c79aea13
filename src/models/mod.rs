//! Domain records for the mail delivery log.
//!
//! A [`MessageRecord`] is one sent message; each message has zero or more
//! [`DeliveryEvent`]s keyed by the shared `guid`. The sweep reads and deletes
//! these records, never creates or mutates them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a message record.
///
/// Stored in the database as lowercase text. `Bulk` messages are purged by
/// the sweep without archival; everything else is archived before deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageClass {
    Transactional,
    Bulk,
}

impl MessageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageClass::Transactional => "transactional",
            MessageClass::Bulk => "bulk",
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transactional" => Ok(MessageClass::Transactional),
            "bulk" => Ok(MessageClass::Bulk),
            other => Err(format!("unknown message class: {other}")),
        }
    }
}

/// A sent-message record (parent).
///
/// `guid` is the stable correlation identifier shared with delivery events
/// and used in delete manifests. Payload fields are carried into the archive
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub guid: String,
    pub sent_time: DateTime<Utc>,
    pub recipient: String,
    pub sender: String,
    pub relay_host: String,
    pub message_type: String,
    pub class: MessageClass,
}

/// A delivery event (dependent), referencing exactly one message via `guid`.
///
/// `detail` is free text from the MTA and may contain the archive field
/// delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryEvent {
    pub guid: String,
    pub event_type: String,
    pub event_time: DateTime<Utc>,
    pub status_code: Option<i32>,
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_class_round_trip() {
        for class in [MessageClass::Transactional, MessageClass::Bulk] {
            assert_eq!(class.as_str().parse::<MessageClass>().unwrap(), class);
        }
    }

    #[test]
    fn test_message_class_rejects_unknown() {
        assert!("spam".parse::<MessageClass>().is_err());
        assert!("Bulk".parse::<MessageClass>().is_err());
    }
}
