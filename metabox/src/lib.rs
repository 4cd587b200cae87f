//! Declarative custom-field blocks for record editing screens.
//!
//! A block is a typed group of fields declared once in code. Registering it
//! derives a stable instance id, resolves a presentation theme, and yields a
//! controller that renders the fields as HTML for a record's editing screen
//! and persists the submitted values back to the host's key/value store.
//!
//! The host side of the seam is the [`Host`] trait: meta storage, actor
//! permissions, nonce verification and widget collaborators. [`MemoryHost`]
//! implements it in memory for tests and examples.
//!
//! ```
//! use metabox::{
//!     BlockRegistry, BlockSpec, FieldSpec, FieldType, Host, MemoryHost, Record, Submission,
//! };
//!
//! let registry = BlockRegistry::new();
//! let block = registry.register(
//!     BlockSpec::new("book")
//!         .title("Book details")
//!         .field("author", FieldSpec::text().title("Author"))
//!         .field("pages", FieldSpec::new(FieldType::Number).title("Pages")),
//! );
//!
//! let host = MemoryHost::new();
//! let record = Record::new(1, "article");
//! let html = block.render(&record, &host, &registry).unwrap();
//! assert!(html.contains("Author"));
//!
//! let submission = Submission::new()
//!     .with_value(block.group_name(), "book_pages", "312");
//! block.save(&record, &submission, &host, &registry);
//! assert_eq!(host.get_meta(record.id, "book_pages").unwrap(), Some("312".into()));
//! ```

pub mod block;
pub mod logging;
pub mod registry;
pub mod sanitize;

pub use block::{Block, SaveOutcome, SkipReason};
pub use registry::{BlockRegistry, ThemeHook};

pub use metabox_fields::{
    instance_id, BlockSpec, BlockText, EditorSettings, FieldSpec, FieldText, FieldType, Options,
    Sanitize, ThemePatch, ThemeSpec,
};
pub use metabox_host::{
    EditorConfig, Host, HostError, MemoryHost, MetaValue, Record, RecordId, Submission,
};
pub use metabox_render::{FieldContext, FieldTypeHandler, FieldTypeRegistry, Theme};
