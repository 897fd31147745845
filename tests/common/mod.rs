#![allow(dead_code)]

use draft_content_api::config::Config;
use draft_content_api::infra::content_api_adapter::ContentApiCredentials;
use draft_content_api::server::{create_router, AppState};
use wiremock::MockServer;

pub const ARTICLE: &str = "application/vnd.ft-upp-article+json";
pub const LEGACY: &str = "application/vnd.ft-legacy-story+json";
pub const UUID: &str = "83a201c6-60cd-11e7-91a7-502f7ee26895";

/// One mock server per collaborator.
pub struct Backends {
    pub draft_store: MockServer,
    pub content_api: MockServer,
    pub validator: MockServer,
    pub mapper: MockServer,
}

impl Backends {
    pub async fn start() -> Self {
        Self {
            draft_store: MockServer::start().await,
            content_api: MockServer::start().await,
            validator: MockServer::start().await,
            mapper: MockServer::start().await,
        }
    }

    pub fn config(&self, content_type_policy: &str, request_timeout_ms: u64) -> Config {
        let toml = format!(
            r#"
[server]
app_system_code = "draft-content-api"
app_name = "Draft Content API"
request_timeout_ms = {request_timeout_ms}

[draft_store]
endpoint = "{draft_store}"

[content_api]
endpoint = "{content_api}/content"
x_policies = ["INCLUDE_RICH_CONTENT"]

[write]
allowed_origin_ids = ["cct", "spark"]
content_type_policy = "{content_type_policy}"

[content_types."{ARTICLE}"]
kind = "validator"
endpoint = "{validator}"

[content_types."{LEGACY}"]
kind = "mapper"
endpoint = "{mapper}"

[health_checks."{validator}"]
id = "check-article-validator"
name = "Article validator"
business_impact = "Article drafts cannot be validated"
panic_guide = "https://runbooks.in.ft.com/draft-content-api"
severity = 1
technical_summary = "Article validator is not available at {{endpoint}}"
checker_name = "Article validator"
"#,
            draft_store = self.draft_store.uri(),
            content_api = self.content_api.uri(),
            validator = self.validator.uri(),
            mapper = self.mapper.uri(),
        );
        Config::from_toml_str(&toml).expect("test config should parse")
    }

    pub fn router(&self, content_type_policy: &str, request_timeout_ms: u64) -> axum::Router {
        let config = self.config(content_type_policy, request_timeout_ms);
        let state = AppState::from_config(
            &config,
            ContentApiCredentials::Basic {
                username: "capi".to_string(),
                password: "secret".to_string(),
            },
        )
        .expect("state should build");
        create_router(state)
    }
}
