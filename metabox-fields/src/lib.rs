//! Declarative schema for custom-field blocks.
//!
//! A [`BlockSpec`] names a group of fields shown together on a record's admin
//! edit screen; each [`FieldSpec`] describes one typed input bound to one
//! stored value. The schema is data plus optional callables: render
//! callbacks, sanitizers and disable predicates ride along as `Arc<dyn Fn>`
//! behind the [`Hook`] wrapper and never influence instance identity.
//!
//! Identity matters because the same block id can be registered with several
//! configurations: [`instance_id`] hashes the structural parts of a spec into
//! a short stable token that namespaces the block's submitted form data.

pub mod callback;
pub mod instance;
pub mod types;

pub use callback::{
    BlockDisableFn, BlockSanitizeFn, BlockText, DisableFn, FieldText, Hook, OutputFn, RenderArgs,
    RenderFn, Sanitize, SanitizeFn, UpdateFn,
};
pub use instance::instance_id;
pub use types::{BlockSpec, EditorSettings, FieldSpec, FieldType, Options, ThemePatch, ThemeSpec};
