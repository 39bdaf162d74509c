use crate::{ClientConfig, Schedule, SchedulerError, tests::create_test_client};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[tokio::test]
async fn test_schedules_are_flattened() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/experiments/4711/schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "experiment": 4711,
            "schedules": {
                "a": {"nodeid": 54, "start": 1_900_000_000, "stop": 1_900_000_300, "status": "finished"},
                "b": {"nodeid": 55, "start": 1_900_000_000, "stop": 1_900_000_300.0, "status": "failed"}
            }
        })))
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let schedules = client.schedules(4711).await.unwrap();
    assert_eq!(schedules.len(), 2);

    let a = schedules.iter().find(|s| s.id == "a").unwrap();
    assert_eq!(a.node_id, 54);
    assert_eq!(a.status, "finished");
    let b = schedules.iter().find(|s| s.id == "b").unwrap();
    assert_eq!(b.node_id, 55);
    assert_eq!(b.stop, 1_900_000_300);
    assert_eq!(b.status, "failed");
}

#[tokio::test]
async fn test_schedules_unknown_experiment() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/experiments/1/schedules"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Experiment not found"})),
        )
        .mount(&mock_server)
        .await;
    let client = create_test_client(&mock_server);

    let result = client.schedules(1).await;
    assert!(matches!(
        result,
        Err(SchedulerError::Api { status: 404, ref message, .. }) if message == "Experiment not found"
    ));
}

fn schedule_on(node_id: u64) -> Schedule {
    Schedule {
        id: "s1".to_string(),
        node_id,
        start: 0,
        stop: 300,
        status: "started".to_string(),
    }
}

#[tokio::test]
async fn test_tunnel_port() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server);

    assert_eq!(client.tunnel_port(&schedule_on(54)).unwrap(), 30054);
    assert!(matches!(
        client.tunnel_port(&schedule_on(40_000)),
        Err(SchedulerError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_tunnel_port_uses_config() {
    let mut config = ClientConfig::default();
    config.tunnel.port_base = 40000;
    let transport = crate::core::infrastructure::transport::MockTransport::new();
    let client = crate::SchedulerClient::with_transport(std::sync::Arc::new(transport), config);

    assert_eq!(client.tunnel_port(&schedule_on(7)).unwrap(), 40007);
}
