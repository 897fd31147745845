use std::time::Duration;

use draft_content_api::app::ports::{
    CanonicalContentPort, ContentValidatorPort, DraftLookup, DraftStorePort, ExternalService,
};
use draft_content_api::error::CallError;
use draft_content_api::infra::content_api_adapter::{ContentApiClient, ContentApiCredentials};
use draft_content_api::infra::draft_store_adapter::DraftStoreClient;
use draft_content_api::infra::http_client::HttpService;
use draft_content_api::infra::validator_adapter::{LegacyMapperClient, SchemaValidatorClient};
use draft_content_api::types::{ContentId, Deadline, DraftWriteHeaders, RequestContext};
use wiremock::matchers::{basic_auth, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UUID: &str = "83a201c6-60cd-11e7-91a7-502f7ee26895";
const ARTICLE: &str = "application/vnd.ft-upp-article+json";

fn ctx(tid: &str) -> RequestContext {
    RequestContext::new(tid, Deadline::after(Duration::from_secs(5)))
}

fn id() -> ContentId {
    UUID.parse().unwrap()
}

fn service(name: &'static str, endpoint: &str) -> HttpService {
    HttpService::new(name, endpoint, reqwest::Client::new())
}

#[tokio::test]
async fn draft_store_read_returns_body_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/drafts/content/{UUID}")))
        .and(header("X-Request-Id", "tid_read"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"title":"Draft"}"#, ARTICLE)
                .insert_header("Last-Modified-RFC3339", "2024-03-01T10:00:00Z")
                .insert_header("Write-Request-Id", "tid_previous_write"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = DraftStoreClient::new(service("draft_store", &server.uri()));
    let lookup = client.read(&ctx("tid_read"), &id()).await.unwrap();

    let DraftLookup::Found(draft) = lookup else {
        panic!("expected a draft, got {lookup:?}");
    };
    assert_eq!(draft.body, br#"{"title":"Draft"}"#);
    assert_eq!(draft.metadata.content_type, ARTICLE);
    assert_eq!(draft.metadata.last_modified.as_deref(), Some("2024-03-01T10:00:00Z"));
    assert_eq!(draft.metadata.write_reference.as_deref(), Some("tid_previous_write"));
}

#[tokio::test]
async fn draft_store_read_maps_404_to_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = DraftStoreClient::new(service("draft_store", &server.uri()));
    assert_eq!(client.read(&ctx("tid_missing"), &id()).await.unwrap(), DraftLookup::Missing);
}

#[tokio::test]
async fn draft_store_read_reports_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = DraftStoreClient::new(service("draft_store", &server.uri()));
    let err = client.read(&ctx("tid_503"), &id()).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn draft_store_write_forwards_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/drafts/content/{UUID}")))
        .and(header("X-Request-Id", "tid_write"))
        .and(header("X-Origin-System-Id", "cct"))
        .and(header("Content-Type", ARTICLE))
        .and(body_string(r#"{"title":"Native"}"#))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = DraftStoreClient::new(service("draft_store", &server.uri()));
    let headers = DraftWriteHeaders {
        transaction_id: "tid_write".to_string(),
        origin_system_id: "cct".to_string(),
        content_type: ARTICLE.to_string(),
    };
    client
        .write(&ctx("tid_write"), &id(), br#"{"title":"Native"}"#.to_vec(), &headers)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get_all("X-Request-Id").iter().count(), 1);
}

#[tokio::test]
async fn draft_store_write_rejects_other_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = DraftStoreClient::new(service("draft_store", &server.uri()));
    let headers = DraftWriteHeaders {
        transaction_id: "tid_write".to_string(),
        origin_system_id: "cct".to_string(),
        content_type: ARTICLE.to_string(),
    };
    let err = client
        .write(&ctx("tid_write"), &id(), b"{}".to_vec(), &headers)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn slow_collaborator_times_out_within_the_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = DraftStoreClient::new(service("draft_store", &server.uri()));
    let ctx = RequestContext::new("tid_slow", Deadline::after(Duration::from_millis(100)));
    let err = client.read(&ctx, &id()).await.unwrap_err();
    assert_eq!(err, CallError::Timeout);
}

#[tokio::test]
async fn content_api_sends_credentials_and_policies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/content/{UUID}")))
        .and(basic_auth("capi", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"x"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = ContentApiClient::new(
        service("content_api", &format!("{}/content", server.uri())),
        ContentApiCredentials::Basic {
            username: "capi".to_string(),
            password: "secret".to_string(),
        },
        vec!["INCLUDE_RICH_CONTENT".to_string(), "INTERNAL_UNSTABLE".to_string()],
    );

    let response = client.fetch(&ctx("tid_capi"), &id()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, br#"{"id":"x"}"#);

    let requests = server.received_requests().await.unwrap();
    let policies: Vec<&str> = requests[0]
        .headers
        .get_all("X-Policy")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert_eq!(policies, vec!["INCLUDE_RICH_CONTENT", "INTERNAL_UNSTABLE"]);
}

#[tokio::test]
async fn content_api_passes_statuses_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("X-Api-Key", "key-123"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let client = ContentApiClient::new(
        service("content_api", &server.uri()),
        ContentApiCredentials::ApiKey("key-123".to_string()),
        Vec::new(),
    );

    let response = client.fetch(&ctx("tid_gone"), &id()).await.unwrap();
    assert_eq!(response.status, 410);
}

#[tokio::test]
async fn content_api_gtg_fetches_the_synthetic_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/4f2f97ea-b8ec-11e4-b8e6-00144feab7de"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = ContentApiClient::new(
        service("content_api", &format!("{}/content", server.uri())),
        ContentApiCredentials::Anonymous,
        Vec::new(),
    );
    assert!(client.good_to_go().await.is_ok());
}

#[tokio::test]
async fn gtg_failure_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/__gtg"))
        .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
        .mount(&server)
        .await;

    let client = SchemaValidatorClient::new(service("validator", &server.uri()));
    assert_eq!(
        client.good_to_go().await.unwrap_err(),
        "gtg returned a non-200 HTTP status: 503 - warming up"
    );
    assert!(!client.is_good_to_go().await);
}

#[tokio::test]
async fn validator_returns_validated_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .and(header("Content-Type", ARTICLE))
        .and(header("X-Request-Id", "tid_validate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"uuid":"83a201c6"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = SchemaValidatorClient::new(service("validator", &server.uri()));
    let body = client
        .validate(&ctx("tid_validate"), &id(), b"{}".to_vec(), ARTICLE)
        .await
        .unwrap();
    assert_eq!(body, br#"{"uuid":"83a201c6"}"#);
}

#[tokio::test]
async fn validator_rejection_folds_the_error_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"error":"title is required"}"#))
        .mount(&server)
        .await;

    let client = SchemaValidatorClient::new(service("validator", &server.uri()));
    let err = client
        .validate(&ctx("tid_invalid"), &id(), b"{}".to_vec(), ARTICLE)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    let message = err.to_string();
    assert!(message.contains(UUID), "{message}");
    assert!(message.ends_with("with reason: title is required"), "{message}");
}

#[tokio::test]
async fn validator_rejection_keeps_structured_reasons_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":{"field":"title","rule":"required"}}"#),
        )
        .mount(&server)
        .await;

    let client = SchemaValidatorClient::new(service("validator", &server.uri()));
    let err = client
        .validate(&ctx("tid_schema"), &id(), b"{}".to_vec(), ARTICLE)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    let message = err.to_string();
    assert!(
        message.ends_with(r#"with reason: {"field":"title","rule":"required"}"#),
        "{message}"
    );
}

#[tokio::test]
async fn validator_unsupported_type_folds_the_error_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(415).set_body_string(r#"{"error":"unknown content type"}"#))
        .mount(&server)
        .await;

    let client = SchemaValidatorClient::new(service("validator", &server.uri()));
    let err = client
        .validate(&ctx("tid_unsupported"), &id(), b"{}".to_vec(), ARTICLE)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(415));
    let message = err.to_string();
    assert!(message.contains(ARTICLE), "{message}");
    assert!(message.ends_with("with reason: unknown content type"), "{message}");
}

#[tokio::test]
async fn validator_rejection_with_unreadable_payload_still_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(400).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = SchemaValidatorClient::new(service("validator", &server.uri()));
    let err = client
        .validate(&ctx("tid_garbled"), &id(), b"{}".to_vec(), ARTICLE)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("couldn't unmarshal response body"), "{err}");
}

#[tokio::test]
async fn validator_other_statuses_are_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"ignored"}"#))
        .mount(&server)
        .await;

    let client = SchemaValidatorClient::new(service("validator", &server.uri()));
    let err = client
        .validate(&ctx("tid_not_found"), &id(), b"{}".to_vec(), ARTICLE)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "validator returned an unexpected HTTP status code: 404");
}

#[tokio::test]
async fn mapper_uses_suggest_mode_and_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/map"))
        .and(query_param("mode", "suggest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"mapped":true}"#))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/map"))
        .respond_with(ResponseTemplate::new(415).set_body_string("unsupported"))
        .mount(&server)
        .await;

    let client = LegacyMapperClient::new(service("mapper", &server.uri()));
    let mapped = client
        .validate(&ctx("tid_map"), &id(), b"{}".to_vec(), "application/json")
        .await
        .unwrap();
    assert_eq!(mapped, br#"{"mapped":true}"#);

    let err = client
        .validate(&ctx("tid_map"), &id(), b"{}".to_vec(), "application/json")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(415));
    assert!(err.to_string().ends_with("415 - unsupported"));
}
