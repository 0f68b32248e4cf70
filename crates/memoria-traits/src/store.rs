//! Thread metadata storage abstraction.
//!
//! The observer produces a current task and a suggested continuation for each
//! conversation thread. Where those values live is up to the host application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Per-thread state derived from observer output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_continuation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ThreadMetadata {
    pub fn new(current_task: Option<String>, suggested_continuation: Option<String>) -> Self {
        Self {
            current_task,
            suggested_continuation,
            updated_at: Some(Utc::now()),
        }
    }

    /// True when neither field carries a value.
    pub fn is_empty(&self) -> bool {
        self.current_task.is_none() && self.suggested_continuation.is_none()
    }
}

/// Persists [`ThreadMetadata`] keyed by thread id.
#[async_trait]
pub trait ThreadMetadataStore: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Option<ThreadMetadata>>;
    async fn save(&self, thread_id: &str, metadata: ThreadMetadata) -> Result<()>;
}
