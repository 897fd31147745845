use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use hyper::Server;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app::draft_content_use_case::DraftContentUseCase;
use crate::app::ports::{ContentValidatorPort, ExternalService};
use crate::app::resolver::ValidatorResolver;
use crate::app::write_policy::WritePolicy;
use crate::config::{BackendKind, Config};
use crate::constants::{
    BUILD_INFO_PATH, CONTENT_TYPE_HEADER, GTG_PATH, HEALTH_PATH, ORIGIN_SYSTEM_ID_HEADER,
    TRANSACTION_ID_HEADER,
};
use crate::error::DraftError;
use crate::health::HealthService;
use crate::infra::content_api_adapter::{ContentApiClient, ContentApiCredentials};
use crate::infra::draft_store_adapter::DraftStoreClient;
use crate::infra::http_client::{build_client, HttpService};
use crate::infra::validator_adapter::{LegacyMapperClient, SchemaValidatorClient};
use crate::types::{ContentId, DraftWriteHeaders, RequestContext};

#[derive(Clone)]
pub struct AppState {
    pub use_case: Arc<DraftContentUseCase>,
    pub write_policy: Arc<WritePolicy>,
    pub health: Arc<HealthService>,
    pub request_timeout: Duration,
    pub system_code: String,
}

impl AppState {
    /// Wires every collaborator from configuration. The resolver table is built here once.
    pub fn from_config(config: &Config, credentials: ContentApiCredentials) -> anyhow::Result<Self> {
        let client = build_client(&config.server.app_system_code).context("failed to build HTTP client")?;

        let draft_store = Arc::new(DraftStoreClient::new(HttpService::new(
            "draft_store",
            &config.draft_store.endpoint,
            client.clone(),
        )));
        let content_api = Arc::new(ContentApiClient::new(
            HttpService::new("content_api", &config.content_api.endpoint, client.clone()),
            credentials,
            config.content_api.x_policies.clone(),
        ));

        let mut entries = Vec::with_capacity(config.content_types.len());
        let mut gtg_services = Vec::with_capacity(config.content_types.len());
        for (content_type, backend) in &config.content_types {
            let (validator, gtg_service) = match backend.kind {
                BackendKind::Validator => register(SchemaValidatorClient::new(HttpService::new(
                    "validator",
                    &backend.endpoint,
                    client.clone(),
                ))),
                BackendKind::Mapper => register(LegacyMapperClient::new(HttpService::new(
                    "mapper",
                    &backend.endpoint,
                    client.clone(),
                ))),
            };
            info!(content_type = %content_type, endpoint = %backend.endpoint, kind = ?backend.kind, "Registered content validator");
            entries.push((content_type.clone(), validator));
            gtg_services.push(gtg_service);
        }
        let resolver = Arc::new(ValidatorResolver::new(entries));
        let mut content_types: Vec<&str> = resolver.content_types().collect();
        content_types.sort_unstable();
        info!(content_types = ?content_types, "Validator resolver ready");

        let health = HealthService::new(
            &config.server.app_system_code,
            &config.server.app_name,
            &config.server.description,
            draft_store.clone(),
            content_api.clone(),
            &config.health_checks,
            &gtg_services,
        )?;

        let write_policy = WritePolicy::new(
            config.write.allowed_origin_ids.iter().cloned(),
            config.write.content_type_policy,
            resolver.clone(),
        );

        Ok(Self {
            use_case: Arc::new(DraftContentUseCase::new(draft_store, content_api, resolver)),
            write_policy: Arc::new(write_policy),
            health: Arc::new(health),
            request_timeout: config.server.request_timeout(),
            system_code: config.server.app_system_code.clone(),
        })
    }

    fn context(&self, headers: &HeaderMap) -> RequestContext {
        RequestContext::from_inbound(header_str(headers, TRANSACTION_ID_HEADER), self.request_timeout)
    }
}

fn register<C>(client: C) -> (Arc<dyn ContentValidatorPort>, Arc<dyn ExternalService>)
where
    C: ContentValidatorPort + 'static,
{
    let client = Arc::new(client);
    (client.clone(), client)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl IntoResponse for DraftError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({ "message": self.to_string(), "code": self.kind() }));
        (status, body).into_response()
    }
}

async fn read_content(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
) -> Result<Response, DraftError> {
    let id: ContentId = uuid.parse()?;
    let ctx = state.context(&headers);

    let body = state.use_case.read(&ctx, &id).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn write_native_content(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, DraftError> {
    let id: ContentId = uuid.parse()?;
    let ctx = state.context(&headers);

    let origin_system_id = state
        .write_policy
        .check_origin(header_str(&headers, ORIGIN_SYSTEM_ID_HEADER))?;
    let content_type = state
        .write_policy
        .check_content_type(header_str(&headers, CONTENT_TYPE_HEADER))?;

    let write_headers = DraftWriteHeaders {
        transaction_id: ctx.transaction_id.clone(),
        origin_system_id,
        content_type,
    };
    state.use_case.write(&ctx, &id, body.to_vec(), &write_headers).await?;
    Ok(StatusCode::OK)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.health.report().await)
}

async fn gtg(State(state): State<AppState>) -> Response {
    match state.health.gtg().await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(message) => (StatusCode::SERVICE_UNAVAILABLE, message).into_response(),
    }
}

async fn build_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "systemCode": state.system_code,
    }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/drafts/content/:uuid", get(read_content))
        .route("/drafts/nativecontent/:uuid", put(write_native_content))
        .route(HEALTH_PATH, get(health))
        .route(GTG_PATH, get(gtg))
        .route(BUILD_INFO_PATH, get(build_info))
        // Native drafts are forwarded whole, whatever their size.
        .layer(DefaultBodyLimit::disable())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Serves until SIGINT or SIGTERM, then drains in-flight requests.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server listening on http://{}", addr);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
