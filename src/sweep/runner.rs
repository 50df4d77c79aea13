//! Sweep orchestration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;

use super::{SweepError, SweepOutcome, SweepReport, retention_cutoff};
use crate::{
    archive::{ArchiveError, ArchiveWriter},
    config::RetentionSweepConfig,
    db::MessageLogRepo,
    storage::{ObjectStore, UploadError},
};

/// Drives one archive-then-delete pass over the mail log.
pub struct ArchiveSweep {
    repo: Arc<dyn MessageLogRepo>,
    store: Arc<dyn ObjectStore>,
    config: RetentionSweepConfig,
}

impl ArchiveSweep {
    pub fn new(
        repo: Arc<dyn MessageLogRepo>,
        store: Arc<dyn ObjectStore>,
        config: RetentionSweepConfig,
    ) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    /// Run a single sweep pass with the cutoff derived from the configured
    /// retention period.
    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        let cutoff = retention_cutoff(Utc::now(), self.config.retention_days);
        self.run_with_cutoff(cutoff).await
    }

    /// Run a single sweep pass against an explicit cutoff.
    pub async fn run_with_cutoff(&self, cutoff: DateTime<Utc>) -> Result<SweepReport, SweepError> {
        tracing::info!(
            cutoff = %cutoff,
            file_record_budget = self.config.file_record_budget,
            backend = self.store.backend_name(),
            dry_run = self.config.dry_run,
            "Starting retention sweep"
        );

        let mut report = SweepReport {
            dry_run: self.config.dry_run,
            ..Default::default()
        };
        let mut writer = ArchiveWriter::new(
            &self.config.spool_dir,
            self.config.file_prefix.clone(),
            self.config.file_record_budget,
        );

        let mut stream = self.repo.stream_messages_before(cutoff);
        while let Some(message) = stream.next().await {
            let message = message?;
            let events = self.repo.fetch_events(&message.guid).await?;

            if writer.at_capacity() {
                self.rotate(&mut writer, &mut report).await?;
            }

            writer.write_group(&message, &events)?;
            report.messages_archived += 1;
            report.events_archived += events.len() as u64;
        }
        drop(stream);

        // Final flush for the last, possibly partial, file.
        self.rotate(&mut writer, &mut report).await?;

        // Bulk mail bypasses archival entirely.
        let bulk_guids = self.repo.fetch_bulk_guids_before(cutoff).await?;
        if bulk_guids.is_empty() {
            tracing::debug!("No bulk messages older than cutoff");
        } else if self.config.dry_run {
            tracing::info!(
                count = bulk_guids.len(),
                "DRY RUN: would purge bulk messages without archival"
            );
        } else {
            let counts = self.repo.delete_bulk_before(cutoff).await?;
            report.bulk_messages_deleted = counts.messages;
            report.bulk_events_deleted = counts.events;
            tracing::info!(
                messages = counts.messages,
                events = counts.events,
                "Purged bulk messages"
            );
        }

        report.outcome = if report.messages_archived == 0 && bulk_guids.is_empty() {
            SweepOutcome::NothingToDo
        } else {
            SweepOutcome::Completed
        };

        tracing::info!(
            messages_archived = report.messages_archived,
            events_archived = report.events_archived,
            total_deleted = report.total_deleted(),
            files = report.files.len(),
            "Retention sweep complete"
        );
        Ok(report)
    }

    /// Close the current archive file, upload it, remove the local copy,
    /// then delete exactly the records in its manifest.
    ///
    /// No-op when no file is open. The delete is only reached after `put`
    /// has returned success.
    async fn rotate(
        &self,
        writer: &mut ArchiveWriter,
        report: &mut SweepReport,
    ) -> Result<(), SweepError> {
        let Some(finished) = writer.finish_file()? else {
            return Ok(());
        };

        tracing::info!(
            file = %finished.name,
            rows = finished.rows,
            messages = finished.manifest.len(),
            "Closed archive file"
        );

        if self.config.dry_run {
            tracing::info!(
                file = %finished.name,
                messages = finished.manifest.len(),
                "DRY RUN: would upload archive and delete its records"
            );
            tokio::fs::remove_file(&finished.path)
                .await
                .map_err(|e| SweepError::Archive(ArchiveError::Io(e)))?;
            report.files.push(finished.name);
            return Ok(());
        }

        let content = tokio::fs::read(&finished.path).await.map_err(|e| {
            SweepError::Upload {
                file: finished.name.clone(),
                source: UploadError::Io(e),
            }
        })?;
        self.store
            .put(&finished.name, &content)
            .await
            .map_err(|e| SweepError::Upload {
                file: finished.name.clone(),
                source: e,
            })?;

        tokio::fs::remove_file(&finished.path)
            .await
            .map_err(|e| SweepError::Archive(ArchiveError::Io(e)))?;

        // A file only exists once a group was written, so the manifest is
        // never empty here. Guard anyway: an unfiltered delete must be
        // impossible.
        if finished.manifest.is_empty() {
            return Ok(());
        }

        let counts = self
            .repo
            .delete_by_guids(&finished.manifest)
            .await
            .map_err(|e| SweepError::Delete {
                file: finished.name.clone(),
                source: e,
            })?;

        tracing::info!(
            file = %finished.name,
            messages = counts.messages,
            events = counts.events,
            "Deleted archived records"
        );

        report.messages_deleted += counts.messages;
        report.events_deleted += counts.events;
        report.files.push(finished.name);
        Ok(())
    }
}
