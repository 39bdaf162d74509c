use crate::SchedulerError;
use std::path::{Path, PathBuf};

/// Outcome of downloading the results of one schedule.
#[derive(Debug)]
pub struct ScheduleDownload {
    pub schedule_id: String,
    pub node_id: u64,
    /// Files written, or why the download stopped.
    pub outcome: Result<Vec<PathBuf>, SchedulerError>,
}

impl ScheduleDownload {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result download for a whole experiment.
///
/// Schedules are downloaded independently, so a report can mix successes
/// and failures.
#[derive(Debug)]
pub struct ResultsReport {
    pub experiment_id: u64,
    /// Local directory the results were written into.
    pub directory: PathBuf,
    pub downloads: Vec<ScheduleDownload>,
}

impl ResultsReport {
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Every file written, across all schedules.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.downloads
            .iter()
            .filter_map(|download| download.outcome.as_ref().ok())
            .flatten()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScheduleDownload> {
        self.downloads.iter().filter(|download| !download.is_success())
    }

    /// True when no schedule failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}
