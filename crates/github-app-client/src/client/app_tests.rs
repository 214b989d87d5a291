use super::*;
use crate::client::test_support::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_installations_uses_app_token() {
    let server = MockServer::start().await;
    let installations = json!([
        {"id": 42, "account": {"login": "octo"}},
        {"id": 43, "account": {"login": "hubot"}}
    ]);
    Mock::given(method("GET"))
        .and(path("/app/installations"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(installations.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, CountingSigner::new());

    let body = client.list_installations().await.unwrap();

    assert_eq!(body, installations);
}

#[tokio::test]
async fn test_list_installations_returns_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app/installations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "A JSON web token could not be decoded"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, CountingSigner::new());

    let body = client.list_installations().await.unwrap();

    assert_eq!(body["message"], "A JSON web token could not be decoded");
}
