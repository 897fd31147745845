use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::app::ports::ExternalService;
use crate::config::HealthCheckConfig;
use crate::constants::GTG_TIMEOUT_SECS;

const PANIC_GUIDE: &str = "https://runbooks.in.ft.com/draft-content-api";

#[derive(Error, Debug)]
#[error("unable to find service with endpoint {0}")]
pub struct UnknownServiceError(pub String);

/// One operator-facing check backed by a collaborator's good-to-go endpoint.
pub struct HealthCheck {
    pub id: String,
    pub name: String,
    pub business_impact: String,
    pub panic_guide: String,
    pub severity: u8,
    pub technical_summary: String,
    checker_name: String,
    service: Arc<dyn ExternalService>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: String,
    pub name: String,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: String,
    pub technical_summary: String,
    pub panic_guide: String,
    pub check_output: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub schema_version: u8,
    pub system_code: String,
    pub name: String,
    pub description: String,
    pub ok: bool,
    pub checks: Vec<CheckResult>,
}

impl HealthCheck {
    /// Bounded by the health-check timeout even when the backend never answers.
    async fn check_gtg(&self) -> Result<String, String> {
        let outcome = tokio::time::timeout(Duration::from_secs(GTG_TIMEOUT_SECS), self.service.good_to_go())
            .await
            .unwrap_or_else(|_| Err(format!("{} did not answer within {}s", self.checker_name, GTG_TIMEOUT_SECS)));

        match outcome {
            Ok(()) => Ok(format!("{} is good-to-go", self.checker_name)),
            Err(e) => {
                error!(url = %self.service.endpoint(), error = %e, "External service healthcheck failed");
                Err(e)
            }
        }
    }

    async fn run(&self) -> CheckResult {
        let (ok, check_output) = match self.check_gtg().await {
            Ok(output) => (true, output),
            Err(e) => (false, e),
        };
        CheckResult {
            id: self.id.clone(),
            name: self.name.clone(),
            ok,
            severity: self.severity,
            business_impact: self.business_impact.clone(),
            technical_summary: self.technical_summary.clone(),
            panic_guide: self.panic_guide.clone(),
            check_output,
            last_updated: Utc::now(),
        }
    }
}

pub struct HealthService {
    system_code: String,
    name: String,
    description: String,
    checks: Vec<HealthCheck>,
}

impl HealthService {
    /// `validators` are the backends a `[health_checks]` entry may refer to by endpoint.
    pub fn new(
        system_code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        draft_store: Arc<dyn ExternalService>,
        content_api: Arc<dyn ExternalService>,
        configured: &BTreeMap<String, HealthCheckConfig>,
        validators: &[Arc<dyn ExternalService>],
    ) -> Result<Self, UnknownServiceError> {
        let mut checks = vec![
            HealthCheck {
                id: "check-draft-content-rw".to_string(),
                name: "Check draft content RW service".to_string(),
                business_impact: "Draft content cannot be provided for suggestions".to_string(),
                panic_guide: PANIC_GUIDE.to_string(),
                severity: 1,
                technical_summary: format!("Draft content RW is not available at {}", draft_store.endpoint()),
                checker_name: "Draft content RW".to_string(),
                service: draft_store,
            },
            HealthCheck {
                id: "check-content-api-health".to_string(),
                name: "Check Content API Health".to_string(),
                business_impact: "Impossible to serve content through PAC".to_string(),
                panic_guide: PANIC_GUIDE.to_string(),
                severity: 1,
                technical_summary: format!("Content API is not available at {}", content_api.endpoint()),
                checker_name: "Content API".to_string(),
                service: content_api,
            },
        ];

        for (endpoint, cfg) in configured {
            let service = find_service(endpoint, validators)?;
            checks.push(HealthCheck {
                id: cfg.id.clone(),
                name: cfg.name.clone(),
                business_impact: cfg.business_impact.clone(),
                panic_guide: cfg.panic_guide.clone(),
                severity: cfg.severity,
                technical_summary: cfg.technical_summary.replace("{endpoint}", endpoint),
                checker_name: cfg.checker_name.clone(),
                service,
            });
        }

        Ok(Self {
            system_code: system_code.into(),
            name: name.into(),
            description: description.into(),
            checks,
        })
    }

    pub async fn report(&self) -> HealthReport {
        let results = join_all(self.checks.iter().map(HealthCheck::run)).await;
        HealthReport {
            schema_version: 1,
            system_code: self.system_code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            ok: results.iter().all(|r| r.ok),
            checks: results,
        }
    }

    /// Checks run concurrently; the first failure to arrive is returned and the rest are dropped.
    pub async fn gtg(&self) -> Result<(), String> {
        try_join_all(self.checks.iter().map(HealthCheck::check_gtg)).await?;
        Ok(())
    }
}

fn find_service(
    endpoint: &str,
    services: &[Arc<dyn ExternalService>],
) -> Result<Arc<dyn ExternalService>, UnknownServiceError> {
    let wanted = endpoint.trim_end_matches('/');
    services
        .iter()
        .find(|s| s.endpoint() == wanted)
        .cloned()
        .ok_or_else(|| UnknownServiceError(endpoint.to_string()))
}
