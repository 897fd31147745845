use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::app::ports::{ContentValidatorPort, ExternalService};
use crate::constants::CONTENT_TYPE_HEADER;
use crate::error::CallError;
use crate::infra::http_client::{HttpResponse, HttpService};
use crate::types::{ContentId, RequestContext};

/// Backend that validates a native document and returns the draft-shaped body
/// (`POST /validate`).
pub struct SchemaValidatorClient {
    service: HttpService,
}

impl SchemaValidatorClient {
    pub fn new(service: HttpService) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct ValidationErrorBody {
    #[serde(default)]
    error: serde_json::Value,
}

/// String reasons are used bare; structured ones keep their JSON form.
fn reason(error: &serde_json::Value) -> String {
    error
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| error.to_string())
}

/// Folds the backend's `{"error": ...}` payload into a failure message.
fn rejection(id: &ContentId, content_type: &str, response: &HttpResponse) -> CallError {
    let status = response.status.as_u16();
    let message = match serde_json::from_slice::<ValidationErrorBody>(&response.body) {
        Ok(body) => format!(
            "Content with uuid: {id}, content-type: {content_type} has failed validation/mapping with reason: {}",
            reason(&body.error)
        ),
        Err(e) => format!(
            "Validation has failed for uuid: {id} but couldn't unmarshal response body, error: {e}"
        ),
    };
    CallError::Status { status, message }
}

#[async_trait]
impl ExternalService for SchemaValidatorClient {
    fn endpoint(&self) -> &str {
        self.service.endpoint()
    }

    async fn good_to_go(&self) -> Result<(), String> {
        self.service.good_to_go().await
    }
}

#[async_trait]
impl ContentValidatorPort for SchemaValidatorClient {
    async fn validate(
        &self,
        ctx: &RequestContext,
        id: &ContentId,
        native_body: Vec<u8>,
        content_type: &str,
    ) -> Result<Vec<u8>, CallError> {
        debug!(transaction_id = %ctx.transaction_id, uuid = %id, "Calling validator");
        let request = self
            .service
            .request(ctx, Method::POST, &self.service.url("/validate"))?
            .header(CONTENT_TYPE_HEADER, content_type)
            .body(native_body);

        let response = self.service.send(request).await?;
        match response.status.as_u16() {
            200 => Ok(response.body),
            // 422: mapping failed, 415: unsupported type, 400: schema validation failed
            400 | 415 | 422 => Err(rejection(id, content_type, &response)),
            status => Err(CallError::Status {
                status,
                message: format!("validator returned an unexpected HTTP status code: {status}"),
            }),
        }
    }
}

/// Older mapping backend (`POST /map?mode=suggest`); every non-200 is a failure
/// carrying its status.
pub struct LegacyMapperClient {
    service: HttpService,
}

impl LegacyMapperClient {
    pub fn new(service: HttpService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ExternalService for LegacyMapperClient {
    fn endpoint(&self) -> &str {
        self.service.endpoint()
    }

    async fn good_to_go(&self) -> Result<(), String> {
        self.service.good_to_go().await
    }
}

#[async_trait]
impl ContentValidatorPort for LegacyMapperClient {
    async fn validate(
        &self,
        ctx: &RequestContext,
        id: &ContentId,
        native_body: Vec<u8>,
        content_type: &str,
    ) -> Result<Vec<u8>, CallError> {
        debug!(transaction_id = %ctx.transaction_id, uuid = %id, "Calling mapper");
        let request = self
            .service
            .request(ctx, Method::POST, &self.service.url("/map"))?
            .query(&[("mode", "suggest")])
            .header(CONTENT_TYPE_HEADER, content_type)
            .body(native_body);

        let response = self.service.send(request).await?;
        match response.status.as_u16() {
            200 => Ok(response.body),
            status => Err(CallError::Status {
                status,
                message: format!(
                    "mapper returned an unexpected HTTP status code: {status} - {}",
                    response.body_text()
                ),
            }),
        }
    }
}
