use monroe_scheduler::{
    AvailabilityOutcome, AvailabilityQuery, NodeType, SchedulerClient, SchedulerResult,
    node_type_filter,
};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> SchedulerResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = SchedulerClient::builder()
        .identity_files(
            env::var("MONROE_CERT").unwrap_or_else(|_| "mnr_crt.pem".to_string()),
            env::var("MONROE_KEY").unwrap_or_else(|_| "mnr_key.pem".to_string()),
        )
        .build()
        .await?;

    let query = AvailabilityQuery {
        duration: 3600,
        nodecount: 2,
        nodetypes: node_type_filter(&[], NodeType::Deployed),
        ..Default::default()
    };

    match client.availability(&query).await? {
        AvailabilityOutcome::Available(report) => println!("{}", report),
        AvailabilityOutcome::Unavailable(message) => println!("No slot: {}", message),
    }

    for node in client.nodes().await? {
        println!("{}", node);
    }

    for entry in client.journals().await? {
        println!("{}", entry);
    }

    Ok(())
}
