//! Identity hub credential retrieval against HTTP doubles, covering the
//! whole hub port set the way a deployed cluster exposes one hub per
//! connector.

use std::time::Duration;

use rstest::rstest;
use transit_harness::IdentityHubClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> IdentityHubClient {
    IdentityHubClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn every_empty_hub_in_the_set_reports_success_with_no_credentials() {
    // One double per hub in the port set.
    let mut hubs = Vec::new();
    for _ in 0..3 {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/identity-hub/credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        hubs.push(server);
    }

    let client = client();
    for hub in &hubs {
        let result = client
            .get_verifiable_credentials(&format!("{}/api/identity-hub", hub.uri()))
            .await
            .unwrap();

        assert!(result.succeeded());
        assert!(result.content().unwrap().is_empty());
    }
}

#[tokio::test]
async fn populated_hub_returns_the_stored_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/identity-hub/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "vc-1",
                "issuer": "did:web:issuer.example.com",
                "claims": { "region": "eu" }
            }
        ])))
        .mount(&server)
        .await;

    let result = client()
        .get_verifiable_credentials(&format!("{}/api/identity-hub", server.uri()))
        .await
        .unwrap();

    assert!(result.succeeded());
    let credentials = result.content().unwrap();
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].id, "vc-1");
    assert_eq!(credentials[0].issuer.as_deref(), Some("did:web:issuer.example.com"));
}

#[rstest]
#[case(404)]
#[case(500)]
#[case(503)]
#[tokio::test]
async fn hub_protocol_failure_is_a_failed_outcome_not_a_transport_error(#[case] status: u16) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/identity-hub/credentials"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    let result = client()
        .get_verifiable_credentials(&format!("{}/api/identity-hub", server.uri()))
        .await
        .unwrap();

    assert!(!result.succeeded());
    let detail = result.failure_detail().unwrap();
    assert!(detail.contains(&status.to_string()), "got: {detail}");
}
