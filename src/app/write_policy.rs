use std::collections::HashSet;
use std::sync::Arc;

use crate::app::resolver::{normalize_content_type, ValidatorResolver};
use crate::config::ContentTypePolicy;
use crate::error::{DraftError, Result};

/// Header checks applied to a write before anything is sent downstream.
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct WritePolicy {
    allowed_origins: HashSet<String>,
    content_types: ContentTypePolicy,
    resolver: Arc<ValidatorResolver>,
}

impl WritePolicy {
    pub fn new(
        allowed_origins: impl IntoIterator<Item = String>,
        content_types: ContentTypePolicy,
        resolver: Arc<ValidatorResolver>,
    ) -> Self {
        Self {
            allowed_origins: allowed_origins.into_iter().collect(),
            content_types,
            resolver,
        }
    }

    pub fn check_origin(&self, origin: Option<&str>) -> Result<String> {
        match origin {
            Some(origin) if self.allowed_origins.contains(origin) => Ok(origin.to_string()),
            other => Err(DraftError::BadRequest(format!(
                "Invalid origin system id: unsupported or missing value for X-Origin-System-Id: {}",
                other.unwrap_or_default()
            ))),
        }
    }

    /// Returns the content type exactly as sent; only the check uses the normalized form.
    pub fn check_content_type(&self, content_type: Option<&str>) -> Result<String> {
        let raw = content_type.unwrap_or_default();
        let accepted = match self.content_types {
            ContentTypePolicy::AllowListed => self.resolver.contains(raw),
            ContentTypePolicy::Resolver => !normalize_content_type(raw).is_empty(),
        };

        if accepted {
            Ok(raw.to_string())
        } else {
            Err(DraftError::BadRequest(format!(
                "Invalid content type: unsupported or missing value for Content-Type: {raw}"
            )))
        }
    }
}
