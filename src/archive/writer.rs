//! Rotating CSV writer for message archive files.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use serde::Serialize;

use super::{ArchiveError, FinishedFile, NO_EVENTS_PLACEHOLDER};
use crate::models::{DeliveryEvent, MessageRecord};

/// One archive row: a message joined with one of its delivery events, or
/// with the placeholder when it has none. Field names become the CSV header.
#[derive(Serialize)]
struct ArchiveRow<'a> {
    guid: &'a str,
    sent_time: String,
    recipient: &'a str,
    sender: &'a str,
    relay_host: &'a str,
    message_type: &'a str,
    class: &'a str,
    event_type: &'a str,
    event_time: String,
    status_code: String,
    detail: &'a str,
}

struct OpenFile {
    writer: csv::Writer<File>,
    path: PathBuf,
    name: String,
    manifest: Vec<String>,
    messages: u32,
    rows: u64,
}

/// Writes message groups to CSV files in a spool directory, rotating when a
/// per-file message budget is reached.
///
/// Rotation is a cut between groups: the caller checks
/// [`at_capacity`](ArchiveWriter::at_capacity) before each
/// [`write_group`](ArchiveWriter::write_group), so a message's event rows are
/// never split across files.
pub struct ArchiveWriter {
    spool_dir: PathBuf,
    file_prefix: String,
    /// Messages per file; 0 means unbounded.
    budget: u32,
    rotation_index: u32,
    current: Option<OpenFile>,
}

impl ArchiveWriter {
    pub fn new(spool_dir: impl AsRef<Path>, file_prefix: impl Into<String>, budget: u32) -> Self {
        Self {
            spool_dir: spool_dir.as_ref().to_path_buf(),
            file_prefix: file_prefix.into(),
            budget,
            rotation_index: 0,
            current: None,
        }
    }

    /// True when the open file has used up its message budget and must be
    /// finished before the next group is written.
    pub fn at_capacity(&self) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.current
            .as_ref()
            .is_some_and(|file| file.messages >= self.budget)
    }

    /// Whether a file is currently open.
    pub fn has_open_file(&self) -> bool {
        self.current.is_some()
    }

    /// Write one message and its events to the current file, opening a new
    /// file if none is open.
    ///
    /// Must not be called while [`at_capacity`](ArchiveWriter::at_capacity)
    /// is true.
    pub fn write_group(
        &mut self,
        message: &MessageRecord,
        events: &[DeliveryEvent],
    ) -> Result<(), ArchiveError> {
        debug_assert!(!self.at_capacity(), "write_group called on a full file");

        if self.current.is_none() {
            self.open_file(message)?;
        }
        let file = self.current.as_mut().expect("file opened above");

        if events.is_empty() {
            file.writer.serialize(ArchiveRow {
                guid: &message.guid,
                sent_time: message.sent_time.to_rfc3339(),
                recipient: &message.recipient,
                sender: &message.sender,
                relay_host: &message.relay_host,
                message_type: &message.message_type,
                class: message.class.as_str(),
                event_type: NO_EVENTS_PLACEHOLDER,
                event_time: String::new(),
                status_code: String::new(),
                detail: "",
            })?;
            file.rows += 1;
        } else {
            for event in events {
                file.writer.serialize(ArchiveRow {
                    guid: &message.guid,
                    sent_time: message.sent_time.to_rfc3339(),
                    recipient: &message.recipient,
                    sender: &message.sender,
                    relay_host: &message.relay_host,
                    message_type: &message.message_type,
                    class: message.class.as_str(),
                    event_type: &event.event_type,
                    event_time: event.event_time.to_rfc3339(),
                    status_code: event
                        .status_code
                        .map(|code| code.to_string())
                        .unwrap_or_default(),
                    detail: &event.detail,
                })?;
                file.rows += 1;
            }
        }

        file.manifest.push(message.guid.clone());
        file.messages += 1;
        Ok(())
    }

    /// Flush and close the current file, returning it for upload.
    ///
    /// Returns `Ok(None)` when no file is open (nothing was written since
    /// the last rotation).
    pub fn finish_file(&mut self) -> Result<Option<FinishedFile>, ArchiveError> {
        let Some(mut file) = self.current.take() else {
            return Ok(None);
        };

        file.writer.flush()?;
        drop(file.writer);

        Ok(Some(FinishedFile {
            path: file.path,
            name: file.name,
            manifest: file.manifest,
            rows: file.rows,
        }))
    }

    fn open_file(&mut self, first_message: &MessageRecord) -> Result<(), ArchiveError> {
        self.rotation_index += 1;
        let name = format!(
            "{}_{}_{}.csv",
            self.file_prefix,
            first_message.sent_time.format("%Y%m%d%H%M%S"),
            self.rotation_index
        );
        let path = self.spool_dir.join(&name);

        // Header row comes from the ArchiveRow field names on first serialize.
        let writer = csv::Writer::from_path(&path)?;

        tracing::debug!(file = %name, "Opened archive file");

        self.current = Some(OpenFile {
            writer,
            path,
            name,
            manifest: Vec::new(),
            messages: 0,
            rows: 0,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::models::MessageClass;

    fn message(guid: &str, second: u32) -> MessageRecord {
        MessageRecord {
            guid: guid.to_string(),
            sent_time: Utc.with_ymd_and_hms(2026, 5, 10, 8, 30, second).unwrap(),
            recipient: "user@example.com".to_string(),
            sender: "noreply@example.com".to_string(),
            relay_host: "mx1.example.com".to_string(),
            message_type: "welcome".to_string(),
            class: MessageClass::Transactional,
        }
    }

    fn event(guid: &str, event_type: &str, detail: &str) -> DeliveryEvent {
        DeliveryEvent {
            guid: guid.to_string(),
            event_type: event_type.to_string(),
            event_time: Utc.with_ymd_and_hms(2026, 5, 10, 8, 31, 0).unwrap(),
            status_code: Some(250),
            detail: detail.to_string(),
        }
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_one_row_per_event() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(dir.path(), "test", 0);

        let msg = message("g1", 0);
        let events = vec![event("g1", "delivered", "ok"), event("g1", "opened", "ok")];
        writer.write_group(&msg, &events).unwrap();

        let finished = writer.finish_file().unwrap().unwrap();
        assert_eq!(finished.rows, 2);
        assert_eq!(finished.manifest, vec!["g1".to_string()]);

        let rows = read_rows(&finished.path);
        assert_eq!(rows.len(), 2);
        // Message columns repeat on every event row.
        assert_eq!(rows[0][0], "g1");
        assert_eq!(rows[1][0], "g1");
        assert_eq!(rows[0][7], "delivered");
        assert_eq!(rows[1][7], "opened");
    }

    #[test]
    fn test_placeholder_row_for_eventless_message() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(dir.path(), "test", 0);

        writer.write_group(&message("g1", 0), &[]).unwrap();
        let finished = writer.finish_file().unwrap().unwrap();

        assert_eq!(finished.rows, 1);
        // Still deletable: the guid is in the manifest.
        assert_eq!(finished.manifest, vec!["g1".to_string()]);

        let rows = read_rows(&finished.path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][7], NO_EVENTS_PLACEHOLDER);
        assert_eq!(rows[0][8], "");
    }

    #[test]
    fn test_delimiter_in_payload_is_quoted() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(dir.path(), "test", 0);

        let detail = r#"host said: "450, try later", deferred"#;
        let msg = message("g1", 0);
        writer
            .write_group(&msg, &[event("g1", "deferred", detail)])
            .unwrap();
        let finished = writer.finish_file().unwrap().unwrap();

        // The row stays one well-formed record: reading it back yields the
        // field verbatim.
        let rows = read_rows(&finished.path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][10], detail);
    }

    #[test]
    fn test_capacity_and_rotation_boundaries() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(dir.path(), "test", 2);

        let mut finished = Vec::new();
        for i in 0..5 {
            if writer.at_capacity() {
                finished.push(writer.finish_file().unwrap().unwrap());
            }
            writer
                .write_group(&message(&format!("g{i}"), i), &[])
                .unwrap();
        }
        finished.push(writer.finish_file().unwrap().unwrap());

        let counts: Vec<usize> = finished.iter().map(|f| f.manifest.len()).collect();
        assert_eq!(counts, vec![2, 2, 1]);

        // Manifests partition the input in order.
        let all: Vec<String> = finished.iter().flat_map(|f| f.manifest.clone()).collect();
        assert_eq!(all, vec!["g0", "g1", "g2", "g3", "g4"]);
    }

    #[test]
    fn test_zero_budget_never_rotates() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(dir.path(), "test", 0);

        for i in 0..100u32 {
            assert!(!writer.at_capacity());
            writer
                .write_group(&message(&format!("g{i}"), i % 60), &[])
                .unwrap();
        }
        let finished = writer.finish_file().unwrap().unwrap();
        assert_eq!(finished.manifest.len(), 100);
    }

    #[test]
    fn test_file_naming() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(dir.path(), "maillog", 1);

        writer.write_group(&message("g1", 5), &[]).unwrap();
        let first = writer.finish_file().unwrap().unwrap();
        assert_eq!(first.name, "maillog_20260510083005_1.csv");

        writer.write_group(&message("g2", 7), &[]).unwrap();
        let second = writer.finish_file().unwrap().unwrap();
        assert_eq!(second.name, "maillog_20260510083007_2.csv");
    }

    #[test]
    fn test_finish_without_open_file() {
        let dir = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::new(dir.path(), "test", 2);
        assert!(writer.finish_file().unwrap().is_none());
    }
}
