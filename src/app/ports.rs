use async_trait::async_trait;

use crate::error::CallError;
use crate::types::{ContentId, DraftWriteHeaders, RequestContext};

/// A backend the service depends on, polled by the health checks.
#[async_trait]
pub trait ExternalService: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn good_to_go(&self) -> Result<(), String>;

    async fn is_good_to_go(&self) -> bool {
        self.good_to_go().await.is_ok()
    }
}

/// Response metadata the draft store sends alongside a native document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftMetadata {
    pub content_type: String,
    pub last_modified: Option<String>,
    pub write_reference: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeDraft {
    pub body: Vec<u8>,
    pub metadata: DraftMetadata,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftLookup {
    Found(NativeDraft),
    Missing,
}

#[async_trait]
pub trait DraftStorePort: ExternalService {
    async fn read(&self, ctx: &RequestContext, id: &ContentId) -> Result<DraftLookup, CallError>;

    async fn write(
        &self,
        ctx: &RequestContext,
        id: &ContentId,
        body: Vec<u8>,
        headers: &DraftWriteHeaders,
    ) -> Result<(), CallError>;
}

/// Raw canonical response; the orchestrator decides what each status means.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait CanonicalContentPort: ExternalService {
    async fn fetch(&self, ctx: &RequestContext, id: &ContentId) -> Result<CanonicalResponse, CallError>;
}

/// One validation/mapping backend, registered per content type.
#[async_trait]
pub trait ContentValidatorPort: ExternalService {
    async fn validate(
        &self,
        ctx: &RequestContext,
        id: &ContentId,
        native_body: Vec<u8>,
        content_type: &str,
    ) -> Result<Vec<u8>, CallError>;
}
