
use crate::{ApiClient, ClientConfig, SchedulerClient, SchedulerConnection, SchedulerUrl};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub(crate) const TEST_USER_ID: u64 = 42;

pub(crate) fn create_test_client(mock_server: &MockServer) -> SchedulerClient {
    let url = SchedulerUrl::new(mock_server.uri()).unwrap();
    let connection = SchedulerConnection::new(url, None, None, false);
    let config = ClientConfig::default();
    let api_client = ApiClient::new(connection, &config).unwrap();
    SchedulerClient::with_transport(Arc::new(api_client), config)
}

/// Answers the identity call as user [`TEST_USER_ID`].
pub(crate) async fn mount_identity(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/backend/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fingerprint": "0F:AA:12",
            "verified": true,
            "user": {
                "id": TEST_USER_ID,
                "name": "Test User",
                "ssl_id": "0F:AA:12",
                "quota_data": 50_000_000_000_u64,
                "quota_storage": 500_000_000_u64,
                "quota_time": 1_000_000,
                "role": "user"
            }
        })))
        .mount(mock_server)
        .await;
}
