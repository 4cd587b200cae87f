//! A registered block: screen eligibility, rendering and the save pipeline.

use indexmap::IndexMap;
use tracing::{debug, warn};

use metabox_fields::{instance_id, BlockSpec, FieldType, Sanitize};
use metabox_host::{Host, MetaValue, Record, Submission};
use metabox_render::html::fill;
use metabox_render::{render_field, BlockContext, Theme};

use crate::registry::BlockRegistry;
use crate::sanitize;

/// Result of one block's save pass. Skips are normal control flow; the save
/// pipeline never errors outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved { written: usize, deleted: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The submission carries no group for this block instance.
    NoSubmission,
    /// The host is autosaving; bound values only persist on real submits.
    Autosave,
    /// The anti-forgery token failed verification.
    BadNonce,
    /// The record's type is not eligible for this block.
    RecordTypeMismatch,
    /// The actor may not edit this record or lacks the block capability.
    NotPermitted,
}

/// One registered block: an immutable spec plus its derived identity and
/// resolved theme.
#[derive(Debug)]
pub struct Block {
    spec: BlockSpec,
    instance_id: String,
    key_prefix: String,
    theme: Theme,
}

impl Block {
    pub(crate) fn new(spec: BlockSpec, registry: &BlockRegistry) -> Self {
        let instance_id = instance_id(&spec);
        let key_prefix = spec.key_prefix();
        let theme = registry.theme_for(&spec);
        Self {
            spec,
            instance_id,
            key_prefix,
            theme,
        }
    }

    pub fn spec(&self) -> &BlockSpec {
        &self.spec
    }

    /// Short content hash of the spec; namespaces form fields so identical
    /// blocks on one screen do not collide.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The submission group this block reads its values from.
    pub fn group_name(&self) -> String {
        format!("{}_meta", self.instance_id)
    }

    /// The action string nonces for this record must be issued under.
    pub fn nonce_action(record: &Record) -> String {
        format!("update-record_{}", record.id)
    }

    /// The block heading for the host screen.
    pub fn title(&self, record: &Record) -> String {
        self.spec.title.resolve(record)
    }

    /// Whether this block belongs on the record's editing screen.
    pub fn is_eligible(&self, record: &Record, host: &dyn Host) -> bool {
        if !self.matches_record_type(record, host) {
            return false;
        }
        if let Some(cap) = &self.spec.capability {
            if !host.actor_can(cap, Some(record.id)) {
                return false;
            }
        }
        if let Some(disable) = &self.spec.disable {
            if (disable.0)(record) {
                return false;
            }
        }
        true
    }

    fn matches_record_type(&self, record: &Record, host: &dyn Host) -> bool {
        if !self.spec.record_types.is_empty() && !self.spec.record_types.contains(&record.kind) {
            return false;
        }
        if self.spec.excluded_record_types.contains(&record.kind) {
            return false;
        }
        if let Some(feature) = &self.spec.record_type_feature {
            if !host.type_supports(&record.kind, feature) {
                return false;
            }
        }
        true
    }

    /// Render the block body for a record's editing screen. `None` when the
    /// block is not eligible there.
    pub fn render(&self, record: &Record, host: &dyn Host, registry: &BlockRegistry) -> Option<String> {
        if !self.is_eligible(record, host) {
            return None;
        }

        let ctx = BlockContext {
            block_id: &self.spec.id,
            key_prefix: &self.key_prefix,
            instance_id: &self.instance_id,
            theme: &self.theme,
        };

        let mut hidden = String::new();
        let mut rows = String::new();
        for (key, field) in &self.spec.fields {
            let Some(out) = render_field(&ctx, key, field, record, host, registry.field_types())
            else {
                continue;
            };
            if out.hidden {
                hidden.push_str(&out.html);
                continue;
            }
            // The rich editor is block-level markup, so its row swaps the
            // paragraph wrapper for a div.
            let wrap = if out.rich_text {
                self.theme
                    .field_wrap
                    .replace("<p ", "<div ")
                    .replace("</p>", "</div><br>")
            } else {
                self.theme.field_wrap.clone()
            };
            let class = format!("{key}__holder");
            rows.push_str(&fill(&wrap, &[("class", &class), ("field", &out.html)]));
        }

        let mut out = String::new();
        if !self.theme.css.is_empty() {
            out.push_str(&format!("<style>{}</style>", self.theme.css));
        }
        let desc = self.spec.desc.resolve(record);
        if !desc.is_empty() {
            out.push_str(&format!("<div class=\"mbx-desc description\">{desc}</div>"));
        }
        out.push_str(&hidden);
        out.push_str(&fill(&self.theme.fields_wrap, &[("fields", &rows)]));
        out.push_str("<div class=\"clearfix\"></div>");
        Some(out)
    }

    /// Persist this block's slice of a submission.
    ///
    /// Only declared, non-gated fields are read from the group; anything
    /// else in the submission is ignored. Empty values delete the stored
    /// entry. Store failures are logged and skipped, never fatal.
    pub fn save(
        &self,
        record: &Record,
        submission: &Submission,
        host: &dyn Host,
        registry: &BlockRegistry,
    ) -> SaveOutcome {
        let Some(group) = submission.group(&self.group_name()) else {
            return SaveOutcome::Skipped(SkipReason::NoSubmission);
        };
        if submission.autosave {
            return SaveOutcome::Skipped(SkipReason::Autosave);
        }
        let nonce = submission.nonce.as_deref().unwrap_or("");
        if !host.verify_nonce(nonce, &Self::nonce_action(record)) {
            debug!(block = %self.spec.id, "nonce verification failed");
            return SaveOutcome::Skipped(SkipReason::BadNonce);
        }
        if !self.matches_record_type(record, host) {
            return SaveOutcome::Skipped(SkipReason::RecordTypeMismatch);
        }
        if !host.can_edit(record) {
            return SaveOutcome::Skipped(SkipReason::NotPermitted);
        }
        if let Some(cap) = &self.spec.capability {
            if !host.actor_can(cap, Some(record.id)) {
                return SaveOutcome::Skipped(SkipReason::NotPermitted);
            }
        }

        // Allow-list pass: collect submitted values for declared fields that
        // pass their own gates. Forged or undeclared keys never survive.
        let mut raw: IndexMap<String, MetaValue> = IndexMap::new();
        for (key, field) in &self.spec.fields {
            if key.is_empty() || field.effective_type(key) == FieldType::Separator {
                continue;
            }
            if let Some(cap) = &field.capability {
                if !host.actor_can(cap, Some(record.id)) {
                    continue;
                }
            }
            let meta_key = self.spec.meta_key(key);
            if let Some(disable) = &field.disable {
                if (disable.0)(record, &meta_key) {
                    continue;
                }
            }
            if let Some(value) = group.get(&meta_key) {
                raw.insert(meta_key, value.clone());
            }
        }

        // A block-level sanitizer replaces the per-type defaults when present.
        let block_hook = self
            .spec
            .save_sanitize
            .clone()
            .or_else(|| registry.sanitize_hook(&self.spec.id));
        let mut hook_cleaned = match &block_hook {
            Some(hook) => (hook.0)(raw.clone(), record.id),
            None => IndexMap::new(),
        };

        let mut written = 0;
        let mut deleted = 0;
        for (key, field) in &self.spec.fields {
            let meta_key = self.spec.meta_key(key);
            let Some(submitted) = raw.get(&meta_key) else {
                continue;
            };
            let value = match &field.sanitize {
                Sanitize::With(f) => (f.0)(submitted.clone()),
                Sanitize::None => submitted.clone(),
                Sanitize::Auto => match &block_hook {
                    // A value the hook dropped counts as cleared.
                    Some(_) => hook_cleaned.shift_remove(&meta_key).unwrap_or_default(),
                    None => sanitize::default_for_type(&field.effective_type(key), submitted.clone()),
                },
            };

            if let Some(update) = &field.update {
                (update.0)(record, &meta_key, &value);
                continue;
            }

            let result = if value.is_empty() {
                host.delete_meta(record.id, &meta_key).map(|()| deleted += 1)
            } else {
                host.set_meta(record.id, &meta_key, value).map(|()| written += 1)
            };
            if let Err(err) = result {
                warn!(block = %self.spec.id, key = %meta_key, %err, "store write failed, continuing");
            }
        }

        debug!(block = %self.spec.id, record = %record.id, written, deleted, "saved block values");
        SaveOutcome::Saved { written, deleted }
    }
}
