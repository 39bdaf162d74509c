use monroe_scheduler::{SchedulerClient, SchedulerError, SchedulerResult, ValidationError};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> SchedulerResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let experiment_id: u64 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .ok_or_else(|| {
            SchedulerError::from(ValidationError::Field {
                field: "experiment".to_string(),
                message: "usage: fetch_results <experiment id>".to_string(),
            })
        })?;

    let client = SchedulerClient::builder()
        .identity_files(
            env::var("MONROE_CERT").unwrap_or_else(|_| "mnr_crt.pem".to_string()),
            env::var("MONROE_KEY").unwrap_or_else(|_| "mnr_key.pem".to_string()),
        )
        .build()
        .await?;

    for experiment in client.recent_experiments().await? {
        if experiment.id() == experiment_id {
            println!("{}", monroe_scheduler::Experiment::from(experiment));
        }
    }

    let report = client.fetch_results(experiment_id).await?;
    println!("Results in {}", report.directory().display());
    for download in &report.downloads {
        match &download.outcome {
            Ok(files) => println!("  {}: {} files", download.schedule_id, files.len()),
            Err(e) => println!("  {}: failed ({})", download.schedule_id, e),
        }
    }

    Ok(())
}
