use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::debug;

use crate::constants::{GTG_PATH, GTG_TIMEOUT_SECS, TRANSACTION_ID_HEADER};
use crate::error::CallError;
use crate::metrics;
use crate::types::RequestContext;

/// Builds the client shared by every collaborator; identifies the service in `User-Agent`.
pub fn build_client(system_code: &str) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(format!("{}/{}", system_code, env!("CARGO_PKG_VERSION")))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
}

/// A fully read response: status, headers and body bytes.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Endpoint plus client for one collaborator.
#[derive(Clone, Debug)]
pub struct HttpService {
    name: &'static str,
    endpoint: String,
    client: Client,
}

impl HttpService {
    pub fn new(name: &'static str, endpoint: impl Into<String>, client: Client) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { name, endpoint, client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Starts a request carrying the transaction id and bounded by what is
    /// left of the request deadline.
    pub fn request(&self, ctx: &RequestContext, method: Method, url: &str) -> Result<RequestBuilder, CallError> {
        let remaining = ctx.deadline.remaining().ok_or(CallError::Timeout)?;
        Ok(self
            .client
            .request(method, url)
            .header(TRANSACTION_ID_HEADER, &ctx.transaction_id)
            .timeout(remaining))
    }

    /// Sends and reads the whole body; the body read counts against the same timeout.
    pub async fn send(&self, request: RequestBuilder) -> Result<HttpResponse, CallError> {
        let started = Instant::now();
        let result = self.send_inner(request).await;
        metrics::record_upstream_call(self.name, started.elapsed());
        result
    }

    async fn send_inner(&self, request: RequestBuilder) -> Result<HttpResponse, CallError> {
        let response = request.send().await.map_err(CallError::from_reqwest)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(CallError::from_reqwest)?.to_vec();
        debug!(service = self.name, status = status.as_u16(), bytes = body.len(), "Collaborator responded");
        Ok(HttpResponse { status, headers, body })
    }

    /// `GET {endpoint}/__gtg`.
    pub async fn good_to_go(&self) -> Result<(), String> {
        check_gtg(self.gtg_request(&self.url(GTG_PATH))).await
    }

    /// Unauthenticated GET with the health-check timeout instead of a request deadline.
    pub fn gtg_request(&self, url: &str) -> RequestBuilder {
        self.client.get(url).timeout(Duration::from_secs(GTG_TIMEOUT_SECS))
    }
}

/// Liveness check; only a 200 counts as healthy.
pub async fn check_gtg(request: RequestBuilder) -> Result<(), String> {
    let response = request
        .send()
        .await
        .map_err(|e| format!("gtg call error: {e}"))?;

    let status = response.status();
    if status != StatusCode::OK {
        return match response.text().await {
            Ok(body) => Err(format!(
                "gtg returned a non-200 HTTP status: {} - {}",
                status.as_u16(),
                body
            )),
            Err(_) => Err("gtg returned a non-200 HTTP status".to_string()),
        };
    }
    Ok(())
}
