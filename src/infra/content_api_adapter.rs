use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use tracing::info;

use crate::app::ports::{CanonicalContentPort, CanonicalResponse, ExternalService};
use crate::constants::{API_KEY_HEADER, POLICY_HEADER, SYNTHETIC_CONTENT_UUID};
use crate::error::CallError;
use crate::infra::http_client::{check_gtg, HttpService};
use crate::types::{ContentId, RequestContext};

/// How requests to the canonical source authenticate. Injected at startup.
#[derive(Clone, Default)]
pub enum ContentApiCredentials {
    Basic { username: String, password: String },
    ApiKey(String),
    #[default]
    Anonymous,
}

impl std::fmt::Debug for ContentApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentApiCredentials::Basic { username, .. } => {
                f.debug_struct("Basic").field("username", username).finish_non_exhaustive()
            }
            ContentApiCredentials::ApiKey(_) => f.write_str("ApiKey(..)"),
            ContentApiCredentials::Anonymous => f.write_str("Anonymous"),
        }
    }
}

impl ContentApiCredentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            ContentApiCredentials::Basic { username, password } => request.basic_auth(username, Some(password)),
            ContentApiCredentials::ApiKey(key) => request.header(API_KEY_HEADER, key),
            ContentApiCredentials::Anonymous => request,
        }
    }
}

/// Client for the canonical (published) content source.
pub struct ContentApiClient {
    service: HttpService,
    credentials: ContentApiCredentials,
    policies: Vec<String>,
}

impl ContentApiClient {
    pub fn new(service: HttpService, credentials: ContentApiCredentials, policies: Vec<String>) -> Self {
        Self {
            service,
            credentials,
            policies,
        }
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        for policy in &self.policies {
            request = request.header(POLICY_HEADER, policy);
        }
        self.credentials.apply(request)
    }
}

#[async_trait]
impl ExternalService for ContentApiClient {
    fn endpoint(&self) -> &str {
        self.service.endpoint()
    }

    /// Fetches a known piece of content; the source is healthy when it serves it.
    async fn good_to_go(&self) -> Result<(), String> {
        let url = self.service.url(&format!("/{SYNTHETIC_CONTENT_UUID}"));
        let request = self.credentials.apply(self.service.gtg_request(&url));
        check_gtg(request).await
    }
}

#[async_trait]
impl CanonicalContentPort for ContentApiClient {
    async fn fetch(&self, ctx: &RequestContext, id: &ContentId) -> Result<CanonicalResponse, CallError> {
        let url = self.service.url(&format!("/{id}"));
        info!(transaction_id = %ctx.transaction_id, uuid = %id, url = %url, "Calling canonical content source");

        let request = self.authorize(self.service.request(ctx, Method::GET, &url)?);
        let response = self.service.send(request).await?;

        Ok(CanonicalResponse {
            status: response.status.as_u16(),
            body: response.body,
        })
    }
}
