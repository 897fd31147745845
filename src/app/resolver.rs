use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::app::ports::ContentValidatorPort;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no validator configured for contentType: {0}")]
pub struct NotConfigured(pub String);

/// Drops media type parameters: `type/x; version=1.0` becomes `type/x`.
pub fn normalize_content_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

/// Immutable content-type to backend table, built once at startup.
///
/// Keys are stored normalized. A key of the form `type/*` acts as a wildcard
/// for its top-level type and is consulted only after an exact match fails.
#[derive(Clone, Default)]
pub struct ValidatorResolver {
    table: HashMap<String, Arc<dyn ContentValidatorPort>>,
}

impl ValidatorResolver {
    pub fn new(entries: impl IntoIterator<Item = (String, Arc<dyn ContentValidatorPort>)>) -> Self {
        let table = entries
            .into_iter()
            .map(|(key, validator)| (normalize_content_type(&key).to_string(), validator))
            .collect();
        Self { table }
    }

    pub fn resolve(&self, content_type: &str) -> Result<Arc<dyn ContentValidatorPort>, NotConfigured> {
        let key = normalize_content_type(content_type);
        if let Some(validator) = self.table.get(key) {
            return Ok(validator.clone());
        }

        key.split_once('/')
            .and_then(|(top, _)| self.table.get(&format!("{top}/*")))
            .cloned()
            .ok_or_else(|| NotConfigured(key.to_string()))
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.resolve(content_type).is_ok()
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for ValidatorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<_> = self
            .table
            .iter()
            .map(|(key, validator)| (key.as_str(), validator.endpoint()))
            .collect();
        entries.sort_unstable();
        f.debug_struct("ValidatorResolver").field("table", &entries).finish()
    }
}
