//! Result of a sweep run.

/// Terminal status of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepOutcome {
    /// At least one record was archived and/or purged.
    #[default]
    Completed,
    /// No qualifying records: no file was created, nothing uploaded or
    /// deleted.
    NothingToDo,
}

/// Counts and file names from a single sweep run.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub outcome: SweepOutcome,
    /// Messages written to archive files.
    pub messages_archived: u64,
    /// Delivery events written to archive files.
    pub events_archived: u64,
    /// Messages deleted after upload.
    pub messages_deleted: u64,
    /// Delivery events deleted after upload.
    pub events_deleted: u64,
    /// Bulk-class messages purged without archival.
    pub bulk_messages_deleted: u64,
    /// Delivery events of purged bulk messages.
    pub bulk_events_deleted: u64,
    /// Names of uploaded archive files, in rotation order.
    pub files: Vec<String>,
    /// True when the run reported without uploading or deleting.
    pub dry_run: bool,
}

impl SweepReport {
    /// Total rows removed from the database.
    pub fn total_deleted(&self) -> u64 {
        self.messages_deleted
            + self.events_deleted
            + self.bulk_messages_deleted
            + self.bulk_events_deleted
    }

    pub fn has_deletions(&self) -> bool {
        self.total_deleted() > 0
    }

    /// One-line human-readable summary for the invoking scheduler.
    pub fn summary(&self) -> String {
        if self.outcome == SweepOutcome::NothingToDo {
            return "Retention sweep: nothing to do".to_string();
        }

        let prefix = if self.dry_run {
            "Retention sweep (dry run): would have "
        } else {
            "Retention sweep: "
        };
        format!(
            "{prefix}archived {} messages ({} events) to {} file(s) [{}]; \
             deleted {} messages and {} events; \
             purged {} bulk messages and {} bulk events",
            self.messages_archived,
            self.events_archived,
            self.files.len(),
            self.files.join(", "),
            self.messages_deleted,
            self.events_deleted,
            self.bulk_messages_deleted,
            self.bulk_events_deleted,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_and_has_deletions() {
        let empty = SweepReport::default();
        assert_eq!(empty.total_deleted(), 0);
        assert!(!empty.has_deletions());

        let report = SweepReport {
            messages_deleted: 2,
            events_deleted: 3,
            bulk_messages_deleted: 1,
            bulk_events_deleted: 4,
            ..Default::default()
        };
        assert_eq!(report.total_deleted(), 10);
        assert!(report.has_deletions());
    }

    #[test]
    fn test_nothing_to_do_summary() {
        let report = SweepReport {
            outcome: SweepOutcome::NothingToDo,
            ..Default::default()
        };
        assert_eq!(report.summary(), "Retention sweep: nothing to do");
    }

    #[test]
    fn test_summary_lists_files_and_counts() {
        let report = SweepReport {
            outcome: SweepOutcome::Completed,
            messages_archived: 2,
            events_archived: 1,
            messages_deleted: 2,
            events_deleted: 1,
            bulk_messages_deleted: 1,
            bulk_events_deleted: 0,
            files: vec!["mail_archive_20260510083000_1.csv".to_string()],
            dry_run: false,
        };
        let summary = report.summary();
        assert!(summary.contains("archived 2 messages (1 events)"));
        assert!(summary.contains("mail_archive_20260510083000_1.csv"));
        assert!(summary.contains("purged 1 bulk messages"));
    }
}
