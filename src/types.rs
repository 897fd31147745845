use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::DraftError;

/// Native draft documents are opaque JSON objects owned by the draft store.
pub type NativeDocument = serde_json::Map<String, serde_json::Value>;

/// Identifier of one content document, validated before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(Uuid);

impl FromStr for ContentId {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(ContentId)
            .map_err(|_| DraftError::BadRequest(format!("Invalid content UUID: {s}")))
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// Absolute expiry shared by every collaborator call made for one inbound request.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    /// Time left before expiry, `None` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        if now >= self.expires_at {
            None
        } else {
            Some(self.expires_at - now)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_none()
    }
}

/// Per-request values threaded through every port call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub transaction_id: String,
    pub deadline: Deadline,
}

impl RequestContext {
    pub fn new(transaction_id: impl Into<String>, deadline: Deadline) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            deadline,
        }
    }

    /// Uses the inbound transaction id when present, otherwise mints one.
    pub fn from_inbound(transaction_id: Option<&str>, budget: Duration) -> Self {
        let tid = match transaction_id.map(str::trim) {
            Some(tid) if !tid.is_empty() => tid.to_string(),
            _ => new_transaction_id(),
        };
        Self::new(tid, Deadline::after(budget))
    }
}

pub fn new_transaction_id() -> String {
    format!("tid_{}", Uuid::new_v4().simple())
}

/// Headers the write path forwards verbatim to the draft store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftWriteHeaders {
    pub transaction_id: String,
    pub origin_system_id: String,
    pub content_type: String,
}
