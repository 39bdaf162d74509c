use crate::{
    ClientConfig, Draft, DraftOptions, Experiment, ExperimentStatus, Recurrence, SchedulerClient,
    SchedulerError, SshPublicKey, SubmissionOutcome,
    core::infrastructure::transport::MockTransport,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn client_with(transport: MockTransport) -> SchedulerClient {
    SchedulerClient::with_transport(Arc::new(transport), ClientConfig::default())
}

fn draft() -> Draft {
    Draft::new(42, DraftOptions::default()).unwrap()
}

#[tokio::test]
async fn test_conflict_makes_no_request() {
    let mut transport = MockTransport::new();
    transport.expect_get().times(0);
    transport.expect_post().times(0);
    let client = client_with(transport);

    let mut draft = draft();
    draft.set_recurrence(Some(Recurrence::new(3600, 1_900_000_000).unwrap()));
    draft.set_ssh_public_key(Some(SshPublicKey::new("ecdsa-sha2-nistp256 AAAAE2Vj").unwrap()));

    let result = client.submit(draft).await;
    assert!(matches!(result, Err(SchedulerError::Conflict(_))));
}

#[tokio::test]
async fn test_submitted_experiment_is_past() {
    let mut transport = MockTransport::new();
    transport.expect_get().times(0);
    transport
        .expect_post()
        .times(1)
        .returning(|_, _| Ok(r#"{"experiment": 10, "message": "ok", "nodecount": 1}"#.to_string()));
    let client = client_with(transport);

    let outcome = client.submit(draft()).await.unwrap();
    let mut experiment: Experiment = outcome.into_experiment();
    assert_eq!(experiment.id(), Some(10));

    let result = client.experiment_availability(&experiment).await;
    assert!(matches!(
        result,
        Err(SchedulerError::PastExperiment {
            status: ExperimentStatus::Requested
        })
    ));
    assert!(matches!(
        experiment.draft_mut(),
        Err(SchedulerError::NotDraft {
            status: ExperimentStatus::Requested
        })
    ));
}

#[tokio::test]
async fn test_refused_draft_can_be_corrected_and_resubmitted() {
    let mut transport = MockTransport::new();
    let mut replies = vec![
        r#"{"experiment": 11, "message": "ok", "nodecount": 1}"#,
        r#"{"message": "Could not allocate 5 nodes"}"#,
    ];
    transport
        .expect_post()
        .times(2)
        .returning(move |_, _| Ok(replies.pop().unwrap_or_default().to_string()));
    let client = client_with(transport);

    let mut draft = draft();
    draft.set_node_count(5).unwrap();
    let mut draft = match client.submit(draft).await.unwrap() {
        SubmissionOutcome::Failed { draft, message } => {
            assert_eq!(message, "Could not allocate 5 nodes");
            draft
        }
        other => panic!("Expected Failed, got {:?}", other),
    };

    draft.set_node_count(1).unwrap();
    let outcome = client.submit(draft).await.unwrap();
    let experiment = outcome.experiment().unwrap();
    assert_eq!(experiment.id(), 11);
    assert_eq!(experiment.node_count(), Some(1));
}

#[tokio::test]
async fn test_delete_connection_failure_is_deletion_failed() {
    let mut transport = MockTransport::new();
    transport
        .expect_delete()
        .withf(|path| path == "/v1/experiments/9/schedules")
        .returning(|_| Err(SchedulerError::Connection("connection reset by peer".to_string())));
    let client = client_with(transport);

    match client.delete_experiment(9).await {
        Err(SchedulerError::DeletionFailed(message)) => {
            assert!(message.contains("connection reset by peer"))
        }
        other => panic!("Expected DeletionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_without_message_returns_body() {
    let mut transport = MockTransport::new();
    transport
        .expect_delete()
        .returning(|_| Ok(json!({"deleted": 2})));
    let client = client_with(transport);

    assert_eq!(client.delete_experiment(9).await.unwrap(), r#"{"deleted":2}"#);
}

#[tokio::test]
async fn test_fetch_results_downloads_every_schedule() {
    let mut transport = MockTransport::new();
    transport
        .expect_get()
        .withf(|path| path == "/v1/experiments/3/schedules")
        .times(1)
        .returning(|_| {
            Ok(json!({"schedules": {
                "x": {"nodeid": 1, "start": 0, "stop": 300, "status": "failed"},
                "y": {"nodeid": 2, "start": 0, "stop": 300, "status": "finished"},
                "z": {"nodeid": 3, "start": 0, "stop": 300, "status": "finished"}
            }}))
        });
    transport
        .expect_download()
        .times(3)
        .returning(|path, prefix| {
            if path == "/user/x/" {
                Err(SchedulerError::Download("disk full".to_string()))
            } else {
                let schedule = path.trim_matches('/').trim_start_matches("user/");
                Ok(vec![prefix.join(schedule).join("results.json")])
            }
        });
    let client = client_with(transport);

    let report = client.fetch_results_into(3, "/tmp/results").await.unwrap();
    assert_eq!(report.experiment_id, 3);
    assert_eq!(report.directory, PathBuf::from("/tmp/results/3"));
    assert_eq!(report.downloads.len(), 3);
    assert_eq!(report.failures().count(), 1);
    assert_eq!(
        report.files().cloned().collect::<Vec<_>>(),
        vec![
            PathBuf::from("/tmp/results/3/y/results.json"),
            PathBuf::from("/tmp/results/3/z/results.json"),
        ]
    );
}

#[tokio::test]
async fn test_fetch_results_defaults_to_current_directory() {
    let mut transport = MockTransport::new();
    transport
        .expect_get()
        .returning(|_| Ok(json!({"schedules": {}})));
    transport.expect_download().times(0);
    let client = client_with(transport);

    let report = client.fetch_results(8).await.unwrap();
    assert_eq!(report.directory, PathBuf::from("./8"));
    assert!(report.downloads.is_empty());
}
