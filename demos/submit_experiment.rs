use monroe_scheduler::{
    DraftOptions, SchedulerClient, SchedulerResult, SshPublicKey, SubmissionOutcome,
};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> SchedulerResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let certificate = env::var("MONROE_CERT").unwrap_or_else(|_| "mnr_crt.pem".to_string());
    let key = env::var("MONROE_KEY").unwrap_or_else(|_| "mnr_key.pem".to_string());

    let client = SchedulerClient::builder()
        .identity_files(certificate, key)
        .build()
        .await?;

    let identity = client.authenticate().await?;
    println!("{}", identity);

    let mut draft = client
        .new_draft(DraftOptions {
            script: "monroe/ping".to_string(),
            testing: true,
            ..Default::default()
        })
        .await?;
    draft.set_countries(["se"])?;

    if let Ok(public_key) = env::var("MONROE_SSH_KEY") {
        draft.set_ssh_public_key(Some(SshPublicKey::new(public_key)?));
    }

    if let Some(report) = client.check_availability(&draft).await?.report() {
        println!("{}", report);
    }

    let with_tunnel = draft.ssh_public_key().is_some();
    match client.submit(draft).await? {
        SubmissionOutcome::Accepted { experiment, report } => {
            println!("Experiment {} submitted: {}", experiment.id(), report.message);
            for schedule in client.schedules(experiment.id()).await? {
                println!("{}", schedule);
                if with_tunnel {
                    let port = client.tunnel_port(&schedule)?;
                    if client.wait_for_tunnel(&schedule).await? {
                        println!(
                            "ssh -p {} root@{}",
                            port,
                            client.config().tunnel.host
                        );
                    }
                }
            }
        }
        SubmissionOutcome::Failed { draft, message } => {
            println!("Submission failed for {}: {}", draft.name(), message)
        }
    }

    Ok(())
}
