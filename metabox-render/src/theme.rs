//! Built-in presentation themes and theme resolution.
//!
//! A theme is six named-slot string templates plus a CSS blob. Slots are
//! written `{title}`, `{field}`, `{desc}`, `{class}`, `{fields}` and filled
//! by [`crate::html::fill`]; templates are plain data so blocks and fields
//! can override any of them.

use serde::Serialize;
use tracing::warn;

use metabox_fields::{ThemePatch, ThemeSpec};

/// A fully resolved template set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    /// CSS emitted once before the block, inside a `<style>` tag.
    pub css: String,
    /// Wraps the concatenation of all wrapped fields. Slot: `{fields}`.
    pub fields_wrap: String,
    /// Wraps one field row. Slots: `{class}`, `{field}`.
    pub field_wrap: String,
    /// Wraps a field title. Slot: `{title}`.
    pub title_patt: String,
    /// Wraps the control itself. Slot: `{field}`.
    pub field_patt: String,
    /// Wraps a description placed after the control. Slot: `{desc}`.
    pub desc_patt: String,
    /// Wraps a description placed before the control. Slot: `{desc}`.
    pub desc_before_patt: String,
}

impl Theme {
    /// Plain one-per-line layout. Also the fallback base for overrides.
    pub fn line() -> Self {
        Self {
            css: String::new(),
            fields_wrap: "{fields}".into(),
            field_wrap: "<p class=\"{class}\">{field}</p>".into(),
            title_patt: "<strong class=\"tit\"><label>{title}</label></strong>".into(),
            field_patt: "{field}".into(),
            desc_patt:
                "<br><span class=\"description\" style=\"opacity:0.6;\">{desc}</span>".into(),
            desc_before_patt:
                "<span class=\"description\" style=\"opacity:0.6;\">{desc}</span><br>".into(),
        }
    }

    /// Two-column table layout; the title cell renders even when empty.
    pub fn table() -> Self {
        Self {
            css: ".mbx-table td{ padding:.6em .5em; } .mbx-table tr:hover{ background:rgba(0,0,0,.03); }"
                .into(),
            fields_wrap: "<table class=\"form-table mbx-table\">{fields}</table>".into(),
            field_wrap: "<tr class=\"{class}\">{field}</tr>".into(),
            title_patt: "<td style=\"width:10em;\" class=\"tit\">{title}</td>".into(),
            field_patt: "<td class=\"field\">{field}</td>".into(),
            desc_patt:
                "<br><span class=\"description\" style=\"opacity:0.8;\">{desc}</span>".into(),
            desc_before_patt:
                "<span class=\"description\" style=\"opacity:0.8;\">{desc}</span><br>".into(),
        }
    }

    /// Two-column CSS-grid layout. Wrappers use `display:contents` so the
    /// title and field cells become grid items themselves.
    pub fn grid() -> Self {
        Self {
            css: ".mbx-grid{ display:grid; grid-template-columns:12em 1fr; gap:.6em .8em; align-items:center; }"
                .into(),
            fields_wrap: "<div class=\"mbx-grid\">{fields}</div>".into(),
            field_wrap: "<div class=\"{class}\" style=\"display:contents;\">{field}</div>".into(),
            title_patt: "<div class=\"tit\"><label>{title}</label></div>".into(),
            field_patt: "<div class=\"field\">{field}</div>".into(),
            desc_patt:
                "<br><span class=\"description\" style=\"opacity:0.6;\">{desc}</span>".into(),
            desc_before_patt:
                "<span class=\"description\" style=\"opacity:0.6;\">{desc}</span><br>".into(),
        }
    }

    /// Look up a built-in theme by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "line" => Some(Self::line()),
            "table" => Some(Self::table()),
            "grid" => Some(Self::grid()),
            _ => None,
        }
    }

    /// Apply overrides; a set patch key wins over the current value.
    pub fn apply(&mut self, patch: &ThemePatch) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(v) = &patch.$field {
                    self.$field = v.clone();
                }
            };
        }
        take!(css);
        take!(fields_wrap);
        take!(field_wrap);
        take!(title_patt);
        take!(field_patt);
        take!(desc_patt);
        take!(desc_before_patt);
    }
}

/// Resolve a block's theme spec into a full template set.
///
/// Unknown names never fail: they log and fall back to the `line` base.
pub fn resolve(spec: &ThemeSpec) -> Theme {
    match spec {
        ThemeSpec::Named(name) => Theme::builtin(name).unwrap_or_else(|| {
            warn!(theme = %name, "unknown theme name, falling back to line");
            Theme::line()
        }),
        ThemeSpec::Patch { base, overrides } => {
            let mut theme = match base {
                None => Theme::line(),
                Some(name) => Theme::builtin(name).unwrap_or_else(|| {
                    warn!(theme = %name, "unknown theme base, falling back to line");
                    Theme::line()
                }),
            };
            theme.apply(overrides);
            theme
        }
    }
}
