use crate::{
    ResultsReport, Schedule, ScheduleDownload,
    core::infrastructure::transport::Transport,
};
use std::path::Path;
use tracing::{info, warn};

/// Remote prefix under which each schedule publishes its results.
pub const RESULTS_PREFIX: &str = "/user";

/// Downloads the result trees of an experiment's schedules.
pub struct ResultsService;

impl ResultsService {
    pub fn new() -> Self {
        Self
    }

    /// Remote directory holding the results of `schedule_id`.
    #[must_use]
    pub fn results_path(schedule_id: &str) -> String {
        format!("{}/{}/", RESULTS_PREFIX, schedule_id)
    }

    /// Downloads every schedule into `root/<experiment_id>/<schedule id>/`.
    ///
    /// Schedules are handled one after the other and independently: a
    /// failed download is recorded in the report and the next schedule is
    /// still attempted.
    pub async fn execute(
        &self,
        transport: &dyn Transport,
        experiment_id: u64,
        schedules: &[Schedule],
        root: &Path,
    ) -> ResultsReport {
        let directory = root.join(experiment_id.to_string());
        let mut downloads = Vec::with_capacity(schedules.len());

        for schedule in schedules {
            let path = Self::results_path(&schedule.id);
            let outcome = transport.download(&path, &directory).await;
            match &outcome {
                Ok(files) => info!(
                    experiment = experiment_id,
                    schedule = %schedule.id,
                    files = files.len(),
                    "results downloaded"
                ),
                Err(e) => warn!(
                    experiment = experiment_id,
                    schedule = %schedule.id,
                    error = %e,
                    "results download failed"
                ),
            }
            downloads.push(ScheduleDownload {
                schedule_id: schedule.id.clone(),
                node_id: schedule.node_id,
                outcome,
            });
        }

        ResultsReport {
            experiment_id,
            directory,
            downloads,
        }
    }
}

impl Default for ResultsService {
    fn default() -> Self {
        Self::new()
    }
}
