//! Host-CMS seam for the metabox crates.
//!
//! Everything the field-block engine needs from the surrounding content
//! management system is expressed here as the [`Host`] trait: the per-record
//! key/value store, actor permission checks, anti-forgery token verification,
//! record-type eligibility, and the rich-text-editor / media-attachment
//! collaborators. The engine never talks to a concrete CMS directly.
//!
//! [`MemoryHost`] is a complete in-memory implementation used throughout the
//! workspace's tests and usable as a fixture by downstream consumers.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{HostError, Result};
pub use memory::MemoryHost;
pub use traits::{EditorConfig, Host};
pub use types::{MetaValue, Record, RecordId, Submission};
