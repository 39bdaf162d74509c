use crate::{
    AvailabilityOutcome, AvailabilityQuery, DraftOptions, Experiment, ExperimentStatus,
    SchedulerError, SubmissionOutcome,
    tests::{TEST_USER_ID, create_test_client, mount_identity},
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn experiment_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "name": format!("experiment-{}", id),
        "ownerid": TEST_USER_ID,
        "status": status,
        "script": "monroe/base",
        "start": 1_500_000_000 + id * 1000,
        "stop": 1_500_000_300.0 + (id * 1000) as f64,
        "nodecount": 1,
        "summary": {"finished": 1}
    })
}

#[tokio::test]
async fn test_list_experiments_keeps_last_entries() {
    let mock_server = MockServer::start().await;
    mount_identity(&mock_server).await;
    let experiments: Vec<Value> = (1..=10).map(|id| experiment_json(id, "finished")).collect();
    Mock::given(method("GET"))
        .and(path(format!("/v1/users/{}/experiments", TEST_USER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(experiments))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let experiments = client.list_experiments(3).await.unwrap();
    let ids: Vec<u64> = experiments.iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![8, 9, 10]);
    assert_eq!(experiments[0].status(), ExperimentStatus::Finished);
    assert_eq!(experiments[0].stop(), Some(1_500_008_300));
    assert_eq!(experiments[0].owner_id(), Some(TEST_USER_ID));
}

#[tokio::test]
async fn test_list_experiments_shorter_than_max() {
    let mock_server = MockServer::start().await;
    mount_identity(&mock_server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/users/{}/experiments", TEST_USER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            experiment_json(1, "requested"),
            experiment_json(2, "decommissioned")
        ])))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let experiments = client.recent_experiments().await.unwrap();
    assert_eq!(experiments.len(), 2);
    assert_eq!(experiments[0].status(), ExperimentStatus::Requested);
    assert_eq!(experiments[1].status(), ExperimentStatus::Unknown);
}

#[tokio::test]
async fn test_submit_sends_canonical_body() {
    let mock_server = MockServer::start().await;
    mount_identity(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/v1/experiments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "experiment": 4711,
            "message": "Experiment created",
            "nodecount": 2,
            "intervals": [[1_900_000_000, 1_900_000_300]]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let mut draft = client
        .new_draft(DraftOptions {
            name: Some("throughput".to_string()),
            node_count: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    draft.set_countries(["NO", "se"]).unwrap();
    draft.set_start(1_900_000_000);

    let outcome = client.submit(draft).await.unwrap();
    let report = outcome.report().cloned().unwrap();
    assert_eq!(report.experiment, 4711);
    assert_eq!(outcome.message(), "Experiment created");
    let submitted = outcome.experiment().unwrap();
    assert_eq!(submitted.id(), 4711);
    assert_eq!(submitted.name(), "throughput");
    assert_eq!(submitted.owner_id(), Some(TEST_USER_ID));
    assert_eq!(submitted.start(), Some(1_900_000_000));
    assert_eq!(submitted.node_count(), Some(2));

    let requests = mock_server.received_requests().await.unwrap();
    let post = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body: Value = serde_json::from_slice(&post.body).unwrap();
    assert_eq!(body["name"], "throughput");
    assert_eq!(body["nodecount"], 2);
    assert_eq!(body["nodetypes"], "country:no|country:se,type:deployed");
    assert_eq!(body["start"], 1_900_000_000_u64);
    assert_eq!(body["stop"], 1_900_000_300_u64);
    let options: Value = serde_json::from_str(body["options"].as_str().unwrap()).unwrap();
    assert_eq!(options["storage"], 134_217_728);

    let submitted = outcome.into_experiment();
    assert_eq!(submitted.id(), Some(4711));
    assert_eq!(submitted.status(), ExperimentStatus::Requested);
}

#[tokio::test]
async fn test_submitted_experiment_can_no_longer_be_edited() {
    let mock_server = MockServer::start().await;
    mount_identity(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/v1/experiments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "experiment": 77,
            "message": "Experiment created",
            "nodecount": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let draft = client.new_draft(DraftOptions::default()).await.unwrap();
    let outcome = client.submit(draft).await.unwrap();
    assert_eq!(
        outcome.experiment().map(|e| e.status()),
        Some(ExperimentStatus::Requested)
    );

    let mut experiment = outcome.into_experiment();
    assert!(experiment.as_draft().is_none());
    assert!(matches!(
        experiment.draft_mut(),
        Err(SchedulerError::NotDraft {
            status: ExperimentStatus::Requested
        })
    ));
    assert!(matches!(
        client.experiment_availability(&experiment).await,
        Err(SchedulerError::PastExperiment {
            status: ExperimentStatus::Requested
        })
    ));
}

#[tokio::test]
async fn test_submit_could_not_allocate() {
    let mock_server = MockServer::start().await;
    mount_identity(&mock_server).await;
    Mock::given(method("POST"))
        .and(path("/v1/experiments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Could not allocate the requested 4 nodes before 2030-01-01"
        })))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let draft = client.new_draft(DraftOptions::default()).await.unwrap();
    let name = draft.name().to_string();
    let outcome = client.submit(draft).await.unwrap();
    match outcome {
        SubmissionOutcome::Failed { mut draft, message } => {
            assert!(message.starts_with("Could not allocate"));
            assert_eq!(draft.name(), name);
            assert_eq!(draft.status(), ExperimentStatus::Draft);
            draft.set_node_count(1).unwrap();
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_availability_with_draft() {
    let mock_server = MockServer::start().await;
    mount_identity(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/v1/schedules/find"))
        .and(query_param("duration", "300"))
        .and(query_param("nodecount", "1"))
        .and(query_param("nodetypes", "country:it,type:testing"))
        .and(query_param("nodes", "54,55"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "start": 1_900_000_000,
            "stop": 1_900_000_300,
            "max_stop": 1_900_086_400,
            "nodecount": 1,
            "max_nodecount": 12,
            "nodetypes": "country:it,type:testing"
        }])))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let mut draft = client
        .new_draft(DraftOptions {
            testing: true,
            ..Default::default()
        })
        .await
        .unwrap();
    draft.set_countries(["it"]).unwrap();
    draft.set_specific_nodes([54, 55]);

    let outcome = client.check_availability(&draft).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.start, 1_900_000_000);
    assert_eq!(report.max_nodecount, 12);

    let outcome = client
        .experiment_availability(&Experiment::from(draft))
        .await
        .unwrap();
    assert!(outcome.report().is_some());
}

#[tokio::test]
async fn test_default_availability_unavailable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schedules/find"))
        .and(query_param("nodetypes", "type:testing"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "No free slot in the next 30 days"})),
        )
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let outcome = client.default_availability().await.unwrap();
    assert_eq!(
        outcome,
        AvailabilityOutcome::Unavailable("No free slot in the next 30 days".to_string())
    );
}

#[tokio::test]
async fn test_availability_refusal_with_message_is_unavailable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schedules/find"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "No free slot for 4 nodes"})),
        )
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let outcome = client.availability(&AvailabilityQuery::default()).await.unwrap();
    assert_eq!(
        outcome,
        AvailabilityOutcome::Unavailable("No free slot for 4 nodes".to_string())
    );
}

#[tokio::test]
async fn test_availability_server_error_is_not_swallowed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schedules/find"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "Scheduler restarting"})),
        )
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let result = client.availability(&AvailabilityQuery::default()).await;
    assert!(matches!(result, Err(SchedulerError::Api { status: 503, .. })));
}

#[tokio::test]
async fn test_availability_client_error_without_json_is_not_swallowed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schedules/find"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let result = client.availability(&AvailabilityQuery::default()).await;
    assert!(matches!(result, Err(SchedulerError::Api { status: 404, .. })));
}

#[tokio::test]
async fn test_delete_experiment() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/experiments/4711/schedules"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Ok. Deleted."})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let message = client.delete_experiment(4711).await.unwrap();
    assert_eq!(message, "Ok. Deleted.");
}

#[tokio::test]
async fn test_delete_experiment_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/experiments/4711/schedules"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "Not your experiment"})),
        )
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let result = client.delete_experiment(4711).await;
    match result {
        Err(SchedulerError::DeletionFailed(message)) => {
            assert_eq!(message, "Not your experiment")
        }
        other => panic!("Expected DeletionFailed, got {:?}", other),
    }
}
