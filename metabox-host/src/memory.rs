//! In-memory [`Host`] implementation.
//!
//! Grants every capability, accepts every nonce and supports no type
//! features until configured otherwise, which keeps test setup short. The
//! rich editor renders as a plain textarea so HTML assertions stay readable.

use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

use crate::error::{HostError, Result};
use crate::traits::{EditorConfig, Host};
use crate::types::{MetaValue, Record, RecordId};

/// An in-memory host backed by a concurrent map, suitable for tests and
/// examples.
#[derive(Debug, Default)]
pub struct MemoryHost {
    meta: DashMap<(RecordId, String), MetaValue>,
    attachments: DashMap<String, String>,
    denied_caps: HashSet<String>,
    type_features: HashSet<(String, String)>,
    expected_nonce: Option<String>,
    editable: bool,
    fail_writes: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            editable: true,
            ..Self::default()
        }
    }

    /// Deny one capability for the current actor.
    pub fn deny_capability(mut self, capability: impl Into<String>) -> Self {
        self.denied_caps.insert(capability.into());
        self
    }

    /// Only accept this exact nonce from now on.
    pub fn expect_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.expected_nonce = Some(nonce.into());
        self
    }

    /// Declare that a record type supports a feature.
    pub fn with_type_feature(mut self, kind: impl Into<String>, feature: impl Into<String>) -> Self {
        self.type_features.insert((kind.into(), feature.into()));
        self
    }

    /// Register an attachment id → URL mapping for the media collaborator.
    pub fn with_attachment(self, id: impl Into<String>, url: impl Into<String>) -> Self {
        self.attachments.insert(id.into(), url.into());
        self
    }

    /// Make the current actor unable to edit any record.
    pub fn read_only_actor(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Make every store write fail, for degraded-path tests.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Number of stored entries across all records.
    pub fn meta_len(&self) -> usize {
        self.meta.len()
    }
}

impl Host for MemoryHost {
    fn get_meta(&self, record: RecordId, key: &str) -> Result<Option<MetaValue>> {
        Ok(self
            .meta
            .get(&(record, key.to_string()))
            .map(|v| v.clone()))
    }

    fn set_meta(&self, record: RecordId, key: &str, value: MetaValue) -> Result<()> {
        if self.fail_writes {
            return Err(HostError::Store {
                key: key.to_string(),
                message: "writes disabled".into(),
            });
        }
        debug!(%record, key, "set meta");
        self.meta.insert((record, key.to_string()), value);
        Ok(())
    }

    fn delete_meta(&self, record: RecordId, key: &str) -> Result<()> {
        if self.fail_writes {
            return Err(HostError::Store {
                key: key.to_string(),
                message: "writes disabled".into(),
            });
        }
        self.meta.remove(&(record, key.to_string()));
        Ok(())
    }

    fn actor_can(&self, capability: &str, _record: Option<RecordId>) -> bool {
        !self.denied_caps.contains(capability)
    }

    fn can_edit(&self, _record: &Record) -> bool {
        self.editable
    }

    fn type_supports(&self, kind: &str, feature: &str) -> bool {
        self.type_features
            .contains(&(kind.to_string(), feature.to_string()))
    }

    fn verify_nonce(&self, nonce: &str, _action: &str) -> bool {
        match &self.expected_nonce {
            Some(expected) => nonce == expected,
            None => true,
        }
    }

    fn render_rich_editor(&self, value: &str, element_id: &str, config: &EditorConfig) -> String {
        format!(
            "<textarea id=\"{}\" name=\"{}\" rows=\"{}\" class=\"rich-editor {}\">{}</textarea>",
            element_id, config.textarea_name, config.textarea_rows, config.editor_class, value
        )
    }

    fn attachment_url(&self, attachment_id: &str) -> Option<String> {
        self.attachments.get(attachment_id).map(|u| u.clone())
    }
}
