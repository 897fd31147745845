use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::{error, info};

use crate::app::ports::{DraftLookup, DraftMetadata, DraftStorePort, ExternalService, NativeDraft};
use crate::constants::{
    CONTENT_TYPE_HEADER, LAST_MODIFIED_HEADER, ORIGIN_SYSTEM_ID_HEADER, TRANSACTION_ID_HEADER,
    WRITE_REQUEST_ID_HEADER,
};
use crate::error::CallError;
use crate::infra::http_client::HttpService;
use crate::types::{ContentId, DraftWriteHeaders, RequestContext};

/// Client for the mutable draft store (`/drafts/content/{id}`).
pub struct DraftStoreClient {
    service: HttpService,
}

impl DraftStoreClient {
    pub fn new(service: HttpService) -> Self {
        Self { service }
    }

    fn content_url(&self, id: &ContentId) -> String {
        self.service.url(&format!("/drafts/content/{id}"))
    }
}

#[async_trait]
impl ExternalService for DraftStoreClient {
    fn endpoint(&self) -> &str {
        self.service.endpoint()
    }

    async fn good_to_go(&self) -> Result<(), String> {
        self.service.good_to_go().await
    }
}

#[async_trait]
impl DraftStorePort for DraftStoreClient {
    async fn read(&self, ctx: &RequestContext, id: &ContentId) -> Result<DraftLookup, CallError> {
        let request = self.service.request(ctx, Method::GET, &self.content_url(id))?;
        let response = self.service.send(request).await.map_err(|e| {
            error!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Error making the HTTP request to the draft store");
            e
        })?;

        match response.status.as_u16() {
            200 => {
                let metadata = DraftMetadata {
                    content_type: response.header(CONTENT_TYPE_HEADER).unwrap_or_default().to_string(),
                    last_modified: response.header(LAST_MODIFIED_HEADER).map(str::to_string),
                    write_reference: response.header(WRITE_REQUEST_ID_HEADER).map(str::to_string),
                };
                Ok(DraftLookup::Found(NativeDraft {
                    body: response.body,
                    metadata,
                }))
            }
            404 => Ok(DraftLookup::Missing),
            status => Err(CallError::Status {
                status,
                message: format!(
                    "draft store returned an unexpected HTTP status code in read operation: {status}"
                ),
            }),
        }
    }

    async fn write(
        &self,
        ctx: &RequestContext,
        id: &ContentId,
        body: Vec<u8>,
        headers: &DraftWriteHeaders,
    ) -> Result<(), CallError> {
        info!(transaction_id = %headers.transaction_id, uuid = %id, origin = %headers.origin_system_id, "Writing draft to the draft store");

        let request = self
            .service
            .request(ctx, Method::PUT, &self.content_url(id))?
            .headers(forwarded_headers(headers)?)
            .body(body);

        let response = self.service.send(request).await?;
        match response.status.as_u16() {
            200 | 201 => Ok(()),
            status => Err(CallError::Status {
                status,
                message: format!(
                    "draft store returned an unexpected HTTP status code in write operation: {status}"
                ),
            }),
        }
    }
}

/// Caller-supplied write headers, replacing anything the request already carries.
fn forwarded_headers(headers: &DraftWriteHeaders) -> Result<HeaderMap, CallError> {
    let mut map = HeaderMap::new();
    for (name, value) in [
        (TRANSACTION_ID_HEADER, &headers.transaction_id),
        (ORIGIN_SYSTEM_ID_HEADER, &headers.origin_system_id),
        (CONTENT_TYPE_HEADER, &headers.content_type),
    ] {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CallError::Transport(format!("invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| CallError::Transport(format!("invalid {name} header: {e}")))?;
        map.insert(header, value);
    }
    Ok(map)
}
