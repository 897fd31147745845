/// Header and namespace constants shared by the HTTP surface and the collaborator clients.
/// Collaborators agree on these names, so they live in one place.

// Headers propagated end-to-end
pub const TRANSACTION_ID_HEADER: &str = "X-Request-Id";
pub const ORIGIN_SYSTEM_ID_HEADER: &str = "X-Origin-System-Id";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

// Draft store response headers copied into the validator input
pub const LAST_MODIFIED_HEADER: &str = "Last-Modified-RFC3339";
pub const WRITE_REQUEST_ID_HEADER: &str = "Write-Request-Id";

// Canonical source request headers
pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const POLICY_HEADER: &str = "X-Policy";

// Field names the orchestrator adds to a native document before validation
pub const LAST_MODIFIED_FIELD: &str = "lastModified";
pub const DRAFT_REFERENCE_FIELD: &str = "draftReference";

// Canonical namespaces stripped by the transformer
pub const ID_PREFIX: &str = "http://www.ft.com/thing/";
pub const TYPE_PREFIX: &str = "http://www.ft.com/ontology/content/";

/// Content the canonical source always serves; used as its liveness check.
pub const SYNTHETIC_CONTENT_UUID: &str = "4f2f97ea-b8ec-11e4-b8e6-00144feab7de";

pub const GTG_PATH: &str = "/__gtg";
pub const HEALTH_PATH: &str = "/__health";
pub const BUILD_INFO_PATH: &str = "/__build-info";

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 8_000;
pub const GTG_TIMEOUT_SECS: u64 = 10;
