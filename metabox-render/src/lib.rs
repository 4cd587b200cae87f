//! Theme resolution and HTML rendering for field blocks.
//!
//! The renderer is a small dispatch engine: each field type maps to one
//! rendering strategy, an explicit per-field callback trumps everything, and
//! a registered handler trumps the built-ins — which is how consumers add
//! their own field types or replace stock ones.
//!
//! Rendering is pure string assembly over the resolved [`Theme`] templates;
//! nothing here touches the store except reading the current value.

pub mod html;
pub mod renderer;
pub mod theme;

pub use renderer::{
    render_field, BlockContext, FieldContext, FieldOutput, FieldTypeHandler, FieldTypeRegistry,
};
pub use theme::{resolve, Theme};
