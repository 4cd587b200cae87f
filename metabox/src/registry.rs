//! Block registration and shared extension hooks.
//!
//! A [`BlockRegistry`] owns every registered block plus the extension points
//! consumers reach for at startup: custom field-type handlers, a theme
//! transform, and per-block sanitize hooks. Most programs use the process
//! [`BlockRegistry::global`] instance; tests build their own so state never
//! leaks between cases.

use std::sync::{Arc, LazyLock, RwLock};

use dashmap::DashMap;
use tracing::debug;

use metabox_fields::{BlockSanitizeFn, BlockSpec, Hook, ThemePatch};
use metabox_host::{Host, MetaValue, Record, RecordId, Submission};
use metabox_render::{FieldTypeHandler, FieldTypeRegistry, Theme};

use crate::block::{Block, SaveOutcome};

/// Transform applied to every resolved theme before a block adopts it.
pub type ThemeHook = Hook<dyn Fn(Theme, &BlockSpec) -> Theme + Send + Sync>;

static GLOBAL: LazyLock<BlockRegistry> = LazyLock::new(BlockRegistry::new);

pub struct BlockRegistry {
    // Keyed by "{id}:{instance_id}" so re-registering an identical spec
    // replaces it while structurally different specs sharing an id coexist.
    blocks: DashMap<String, Arc<Block>>,
    field_types: FieldTypeRegistry,
    sanitize_hooks: DashMap<String, BlockSanitizeFn>,
    theme_hook: RwLock<Option<ThemeHook>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            blocks: DashMap::new(),
            field_types: FieldTypeRegistry::new(),
            sanitize_hooks: DashMap::new(),
            theme_hook: RwLock::new(None),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static BlockRegistry {
        &GLOBAL
    }

    /// Register a block spec, resolving its theme and identity.
    pub fn register(&self, spec: BlockSpec) -> Arc<Block> {
        let block = Arc::new(Block::new(spec, self));
        debug!(
            block = %block.spec().id,
            instance = %block.instance_id(),
            fields = block.spec().fields.len(),
            "registered block"
        );
        let key = format!("{}:{}", block.spec().id, block.instance_id());
        self.blocks.insert(key, Arc::clone(&block));
        block
    }

    /// First registered block with this id.
    pub fn get(&self, block_id: &str) -> Option<Arc<Block>> {
        self.blocks
            .iter()
            .find(|entry| entry.value().spec().id == block_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn blocks(&self) -> Vec<Arc<Block>> {
        self.blocks
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Blocks that should appear on this record's editing screen.
    pub fn eligible_for(&self, record: &Record, host: &dyn Host) -> Vec<Arc<Block>> {
        self.blocks
            .iter()
            .filter(|entry| entry.value().is_eligible(record, host))
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Run the save pipeline of every registered block against one
    /// submission. Blocks whose group is absent report a skip, not an error.
    pub fn save_submission(
        &self,
        record: &Record,
        submission: &Submission,
        host: &dyn Host,
    ) -> Vec<(String, SaveOutcome)> {
        self.blocks()
            .into_iter()
            .map(|block| {
                let outcome = block.save(record, submission, host, self);
                (block.spec().id.clone(), outcome)
            })
            .collect()
    }

    // --- Field type handlers ---

    pub fn field_types(&self) -> &FieldTypeRegistry {
        &self.field_types
    }

    pub fn register_field_type(
        &self,
        type_name: impl Into<String>,
        handler: Arc<dyn FieldTypeHandler>,
    ) {
        self.field_types.register(type_name, handler);
    }

    // --- Theme hook ---

    /// Install a transform over every block's resolved theme. Replaces any
    /// previously installed hook.
    pub fn set_theme_hook(&self, f: impl Fn(Theme, &BlockSpec) -> Theme + Send + Sync + 'static) {
        let mut slot = self.theme_hook.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Hook(Arc::new(f)));
    }

    /// Resolve a spec's theme: named/patched base, then block-level template
    /// overrides, then the installed hook.
    pub fn theme_for(&self, spec: &BlockSpec) -> Theme {
        let mut theme = metabox_render::resolve(&spec.theme);
        theme.apply(&ThemePatch {
            css: spec.css.clone(),
            fields_wrap: spec.fields_wrap.clone(),
            field_wrap: spec.field_wrap.clone(),
            title_patt: spec.title_patt.clone(),
            field_patt: spec.field_patt.clone(),
            desc_patt: spec.desc_patt.clone(),
            desc_before_patt: spec.desc_before_patt.clone(),
        });
        let slot = self.theme_hook.read().unwrap_or_else(|e| e.into_inner());
        if let Some(hook) = slot.as_ref() {
            theme = (hook.0)(theme, spec);
        }
        theme
    }

    // --- Save sanitize hooks ---

    /// Install a whole-map sanitizer for one block id, consulted when the
    /// spec carries no `save_sanitize` of its own.
    pub fn register_sanitize_hook(
        &self,
        block_id: impl Into<String>,
        f: impl Fn(indexmap::IndexMap<String, MetaValue>, RecordId) -> indexmap::IndexMap<String, MetaValue>
            + Send
            + Sync
            + 'static,
    ) {
        self.sanitize_hooks.insert(block_id.into(), Hook(Arc::new(f)));
    }

    pub fn sanitize_hook(&self, block_id: &str) -> Option<BlockSanitizeFn> {
        self.sanitize_hooks.get(block_id).map(|h| h.clone())
    }

    /// Drop every block and hook. Intended for tests against `global()`.
    pub fn clear(&self) {
        self.blocks.clear();
        self.sanitize_hooks.clear();
        let mut slot = self.theme_hook.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
