use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::app::ports::{CanonicalContentPort, DraftLookup, DraftStorePort, NativeDraft};
use crate::app::resolver::ValidatorResolver;
use crate::app::transform::canonical_to_draft;
use crate::constants::{DRAFT_REFERENCE_FIELD, LAST_MODIFIED_FIELD};
use crate::error::{CallError, DraftError, Result};
use crate::metrics;
use crate::types::{ContentId, DraftWriteHeaders, NativeDocument, RequestContext};

/// Drives the draft read (with canonical fallback) and the native write.
pub struct DraftContentUseCase {
    draft_store: Arc<dyn DraftStorePort>,
    canonical: Arc<dyn CanonicalContentPort>,
    resolver: Arc<ValidatorResolver>,
}

impl DraftContentUseCase {
    pub fn new(
        draft_store: Arc<dyn DraftStorePort>,
        canonical: Arc<dyn CanonicalContentPort>,
        resolver: Arc<ValidatorResolver>,
    ) -> Self {
        Self {
            draft_store,
            canonical,
            resolver,
        }
    }

    /// Returns the draft-shaped JSON body for `id`.
    pub async fn read(&self, ctx: &RequestContext, id: &ContentId) -> Result<Vec<u8>> {
        ensure_time_left(ctx)?;

        let lookup = self
            .draft_store
            .read(ctx, id)
            .await
            .map_err(|e| call_failure(ctx, e, "draft store read"));

        let result = match lookup {
            Ok(DraftLookup::Found(draft)) => self.validate_draft(ctx, id, draft).await,
            Ok(DraftLookup::Missing) => {
                warn!(transaction_id = %ctx.transaction_id, uuid = %id, "Draft not found, trying canonical content");
                let result = self.read_canonical(ctx, id).await;
                metrics::record_read_outcome("canonical", &result);
                return result;
            }
            Err(e) => Err(e),
        };
        metrics::record_read_outcome("draft", &result);
        result
    }

    /// Forwards the raw native body to the draft store.
    pub async fn write(
        &self,
        ctx: &RequestContext,
        id: &ContentId,
        body: Vec<u8>,
        headers: &DraftWriteHeaders,
    ) -> Result<()> {
        info!(transaction_id = %ctx.transaction_id, uuid = %id, "Writing native content to draft store");

        let result = match ensure_time_left(ctx) {
            Ok(()) => self
                .draft_store
                .write(ctx, id, body, headers)
                .await
                .map_err(|e| call_failure(ctx, e, "draft store write")),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            error!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Error in writing draft content");
        }
        metrics::record_write_outcome(&result);
        result
    }

    async fn validate_draft(&self, ctx: &RequestContext, id: &ContentId, draft: NativeDraft) -> Result<Vec<u8>> {
        let content_type = draft.metadata.content_type.clone();
        let native_body = validator_input(draft).map_err(|e| {
            warn!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Error constructing validator input");
            e
        })?;

        let validator = self.resolver.resolve(&content_type).map_err(|e| {
            error!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Unable to validate content");
            DraftError::Configuration(e.to_string())
        })?;

        ensure_time_left(ctx)?;
        debug!(transaction_id = %ctx.transaction_id, uuid = %id, validator = validator.endpoint(), "Validating draft");

        validator
            .validate(ctx, id, native_body, &content_type)
            .await
            .map_err(|e| {
                warn!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Validator error");
                match e {
                    CallError::Status { status: 404 | 415, message } if !ctx.deadline.is_expired() => {
                        DraftError::ContentTypeUnsupported(message)
                    }
                    CallError::Status { status: 400 | 422, message } if !ctx.deadline.is_expired() => {
                        DraftError::NotValid(message)
                    }
                    other => call_failure(ctx, other, "validator"),
                }
            })
    }

    async fn read_canonical(&self, ctx: &RequestContext, id: &ContentId) -> Result<Vec<u8>> {
        ensure_time_left(ctx)?;

        let response = self.canonical.fetch(ctx, id).await.map_err(|e| {
            error!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Error in calling canonical content source");
            call_failure(ctx, e, "canonical content")
        })?;

        match response.status {
            200 => {}
            404 => return Err(DraftError::NotFound),
            // A downstream 504 must not look like this service's own deadline expiry.
            504 => {
                return Err(DraftError::Upstream(
                    "canonical content source timed out".to_string(),
                ))
            }
            status => return Err(DraftError::UpstreamStatus { status }),
        }

        let canonical: NativeDocument = serde_json::from_slice(&response.body).map_err(|e| {
            error!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Failed unmarshalling canonical response");
            DraftError::Upstream(format!("unable to parse canonical content: {e}"))
        })?;

        let draft = canonical_to_draft(&canonical).map_err(|e| {
            error!(transaction_id = %ctx.transaction_id, uuid = %id, error = %e, "Failed transforming canonical response");
            DraftError::Upstream(e.to_string())
        })?;

        serde_json::to_vec(&draft).map_err(|e| DraftError::Upstream(e.to_string()))
    }
}

/// Copy of the native document with the draft store's write metadata attached.
/// The added fields only exist in what the validator receives.
fn validator_input(draft: NativeDraft) -> Result<Vec<u8>> {
    let mut document: NativeDocument = serde_json::from_slice(&draft.body)
        .map_err(|e| DraftError::Upstream(format!("unable to unmarshal native content: {e}")))?;

    document.insert(
        LAST_MODIFIED_FIELD.to_string(),
        Value::String(draft.metadata.last_modified.unwrap_or_default()),
    );
    document.insert(
        DRAFT_REFERENCE_FIELD.to_string(),
        Value::String(draft.metadata.write_reference.unwrap_or_default()),
    );

    serde_json::to_vec(&document)
        .map_err(|e| DraftError::Upstream(format!("unable to marshal native content: {e}")))
}

fn ensure_time_left(ctx: &RequestContext) -> Result<()> {
    if ctx.deadline.is_expired() {
        Err(DraftError::Timeout)
    } else {
        Ok(())
    }
}

/// Maps a collaborator failure; an expired deadline wins over whatever came back.
fn call_failure(ctx: &RequestContext, err: CallError, collaborator: &str) -> DraftError {
    if ctx.deadline.is_expired() {
        return DraftError::Timeout;
    }
    match err {
        CallError::Timeout => DraftError::Timeout,
        CallError::Status { status, message } => {
            DraftError::Upstream(format!("{collaborator} returned HTTP {status}: {message}"))
        }
        other => DraftError::Upstream(format!("{collaborator}: {other}")),
    }
}
