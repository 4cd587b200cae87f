//! The [`Host`] trait — everything the engine consumes from the CMS.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{MetaValue, Record, RecordId};

/// Fully resolved configuration handed to the host's rich-text editor widget.
///
/// Defaults mirror the conventional admin-editor setup: paragraph autoformat
/// on, five rows, toolbar on, media buttons and drag-drop upload off. Blocks
/// override individual knobs through their field's editor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// The form name the editor's textarea must submit under.
    pub textarea_name: String,
    pub editor_class: String,
    pub autop: bool,
    pub textarea_rows: u32,
    pub tabindex: Option<u32>,
    pub editor_css: String,
    pub teeny: bool,
    pub tinymce: bool,
    pub quicktags: bool,
    pub media_buttons: bool,
    pub drag_drop_upload: bool,
}

impl EditorConfig {
    pub fn new(textarea_name: impl Into<String>) -> Self {
        Self {
            textarea_name: textarea_name.into(),
            editor_class: String::new(),
            autop: true,
            textarea_rows: 5,
            tabindex: None,
            editor_css: String::new(),
            teeny: false,
            tinymce: true,
            quicktags: true,
            media_buttons: false,
            drag_drop_upload: false,
        }
    }
}

/// The host environment a block engine runs against.
///
/// Implementations are expected to be cheap to call and internally
/// synchronized; the engine itself is synchronous and request-scoped.
pub trait Host: Send + Sync {
    // --- Per-record key/value store ---

    /// Read one stored value. `Ok(None)` means "absent, use the default".
    fn get_meta(&self, record: RecordId, key: &str) -> Result<Option<MetaValue>>;

    /// Create or update one stored value.
    fn set_meta(&self, record: RecordId, key: &str, value: MetaValue) -> Result<()>;

    /// Remove one stored value. Removing an absent key is not an error.
    fn delete_meta(&self, record: RecordId, key: &str) -> Result<()>;

    // --- Actor permissions ---

    /// Whether the current actor holds `capability`, optionally in the
    /// context of one record.
    fn actor_can(&self, capability: &str, record: Option<RecordId>) -> bool;

    /// Whether the current actor may edit this record at all.
    fn can_edit(&self, record: &Record) -> bool;

    // --- Record-type eligibility ---

    /// Whether a record type declares support for a named feature.
    fn type_supports(&self, kind: &str, feature: &str) -> bool;

    // --- Anti-forgery ---

    /// Verify a submitted token against the expected action string.
    fn verify_nonce(&self, nonce: &str, action: &str) -> bool;

    // --- Widget collaborators ---

    /// Render the host's rich-text editor widget for a value.
    fn render_rich_editor(&self, value: &str, element_id: &str, config: &EditorConfig) -> String;

    /// Resolve a media attachment id to its URL, if the host knows it.
    fn attachment_url(&self, attachment_id: &str) -> Option<String>;
}
