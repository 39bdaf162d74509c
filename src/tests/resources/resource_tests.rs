use crate::{
    SchedulerError,
    tests::{TEST_USER_ID, create_test_client, mount_identity},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn test_nodes_list_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/resources/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 54,
                "hostname": "monroe-54",
                "model": "apu2d4",
                "site": "Karlstad",
                "project": "se",
                "status": "active",
                "heartbeat": 1_700_000_000.25,
                "type": "deployed"
            },
            {
                "id": 55,
                "status": "maintenance"
            }
        ])))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let nodes = client.nodes().await.unwrap();
    assert_eq!(nodes.len(), 2);

    let first = &nodes[0];
    assert_eq!(first.id, 54);
    assert_eq!(first.hostname, "monroe-54");
    assert_eq!(first.heartbeat, Some(1_700_000_000));
    assert_eq!(first.node_type(), "deployed");
    assert_eq!(first.to_string(), "Node ID=54 Status=active Type=deployed");

    let second = &nodes[1];
    assert_eq!(second.heartbeat, None);
    assert_eq!(second.node_type(), "undefined");
}

#[tokio::test]
async fn test_nodes_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/resources/"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database offline"})),
        )
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    match client.nodes().await {
        Err(SchedulerError::Api {
            status, message, ..
        }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_journals_success() {
    let mock_server = MockServer::start().await;
    mount_identity(&mock_server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/users/{}/journals", TEST_USER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "quota": "quota_time",
                "new_value": 7200,
                "reason": "Experiment 12 finished",
                "timestamp": 1_500_000_000,
                "ownerid": TEST_USER_ID
            },
            {
                "quota": "quota_data",
                "new_value": 2_147_483_648_u64,
                "reason": "Monthly refill",
                "timestamp": 1_500_086_400.5,
                "ownerid": TEST_USER_ID
            }
        ])))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let journals = client.journals().await.unwrap();
    assert_eq!(journals.len(), 2);
    assert_eq!(journals[0].owner_id, TEST_USER_ID);
    assert_eq!(
        journals[0].to_string(),
        "2017-07-14 : Remaining time is 2.00 hours."
    );
    assert_eq!(journals[1].timestamp, 1_500_086_400);
    assert_eq!(
        journals[1].to_string(),
        "2017-07-15 : Remaining data quota is 2.00 GB."
    );
}

#[tokio::test]
async fn test_journals_requires_identity() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    let result = client.journals().await;
    assert!(matches!(result, Err(SchedulerError::Authentication(_))));
}
