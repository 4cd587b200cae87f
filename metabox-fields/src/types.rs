//! Block and field schema types.
//!
//! A [`BlockSpec`] is built fluently in code, field by field, and stays
//! immutable after registration. Field order is render order, which is why
//! `fields` and select options live in `IndexMap`s.

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use metabox_host::{MetaValue, Record};

use crate::callback::{
    BlockDisableFn, BlockSanitizeFn, BlockText, DisableFn, FieldText, Hook, OutputFn, RenderArgs,
    RenderFn, Sanitize, UpdateFn,
};

/// The type of a field — selects the render strategy and the default
/// sanitizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Url,
    Tel,
    Color,
    Password,
    Date,
    Month,
    Week,
    Range,
    Textarea,
    Select,
    Radio,
    Checkbox,
    CheckboxMulti,
    Hidden,
    Separator,
    RichText,
    Image,
    /// A type resolved through the registered-handler map.
    Custom(String),
}

impl FieldType {
    /// The registry / diagnostic name of this type.
    pub fn name(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Url => "url",
            FieldType::Tel => "tel",
            FieldType::Color => "color",
            FieldType::Password => "password",
            FieldType::Date => "date",
            FieldType::Month => "month",
            FieldType::Week => "week",
            FieldType::Range => "range",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::CheckboxMulti => "checkbox_multi",
            FieldType::Hidden => "hidden",
            FieldType::Separator => "separator",
            FieldType::RichText => "rich_text",
            FieldType::Image => "image",
            FieldType::Custom(name) => name,
        }
    }

    /// The `type` attribute used by the default `<input>` strategy.
    pub fn input_type(&self) -> &str {
        match self {
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Url => "url",
            FieldType::Tel => "tel",
            FieldType::Color => "color",
            FieldType::Password => "password",
            FieldType::Date => "date",
            FieldType::Month => "month",
            FieldType::Week => "week",
            FieldType::Range => "range",
            _ => "text",
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

/// Per-type extra configuration: choices for select/radio, the checked value
/// for a checkbox, the storage mode for an image.
///
/// A plain list means "the label doubles as the value"; an ordered map means
/// "keys are values, entries are labels".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(untagged)]
pub enum Options {
    #[default]
    None,
    List(Vec<String>),
    Map(IndexMap<String, String>),
}

impl Options {
    pub fn is_empty(&self) -> bool {
        match self {
            Options::None => true,
            Options::List(v) => v.is_empty(),
            Options::Map(m) => m.is_empty(),
        }
    }

    /// First entry, used as a checkbox's checked value and an image field's
    /// storage mode.
    pub fn first(&self) -> Option<&str> {
        match self {
            Options::None => None,
            Options::List(v) => v.first().map(String::as_str),
            Options::Map(m) => m.values().next().map(String::as_str),
        }
    }

    /// `(value, label)` pairs in declaration order. For a list the label is
    /// its own value.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        match self {
            Options::None => Vec::new(),
            Options::List(v) => v.iter().map(|l| (l.as_str(), l.as_str())).collect(),
            Options::Map(m) => m.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for Options {
    fn from(items: [&str; N]) -> Self {
        Options::List(items.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Options {
    fn from(items: [(&str, &str); N]) -> Self {
        Options::Map(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Overrides for the host rich-text editor, merged over the stock defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct EditorSettings {
    pub autop: Option<bool>,
    pub textarea_rows: Option<u32>,
    pub tabindex: Option<u32>,
    pub editor_css: Option<String>,
    pub teeny: Option<bool>,
    pub tinymce: Option<bool>,
    pub quicktags: Option<bool>,
    pub media_buttons: Option<bool>,
    pub drag_drop_upload: Option<bool>,
}

/// Overrides for individual theme templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ThemePatch {
    pub css: Option<String>,
    pub fields_wrap: Option<String>,
    pub field_wrap: Option<String>,
    pub title_patt: Option<String>,
    pub field_patt: Option<String>,
    pub desc_patt: Option<String>,
    pub desc_before_patt: Option<String>,
}

impl ThemePatch {
    pub fn is_empty(&self) -> bool {
        self == &ThemePatch::default()
    }
}

/// How a block picks its presentation theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ThemeSpec {
    /// A built-in theme by name. Unknown names fall back to `line`.
    Named(String),
    /// Template overrides on a base theme; `base: None` means `line`.
    Patch {
        base: Option<String>,
        overrides: ThemePatch,
    },
}

impl ThemeSpec {
    pub fn named(name: impl Into<String>) -> Self {
        ThemeSpec::Named(name.into())
    }

    pub fn patch(overrides: ThemePatch) -> Self {
        ThemeSpec::Patch {
            base: None,
            overrides,
        }
    }

    pub fn patched(base: impl Into<String>, overrides: ThemePatch) -> Self {
        ThemeSpec::Patch {
            base: Some(base.into()),
            overrides,
        }
    }
}

impl Default for ThemeSpec {
    fn default() -> Self {
        ThemeSpec::Named("table".into())
    }
}

/// One named, typed input within a block.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub type_: FieldType,
    pub title: FieldText,
    /// Description rendered after the input.
    pub desc: FieldText,
    /// Description rendered before the input.
    pub desc_before: FieldText,
    pub placeholder: String,
    /// Explicit HTML id; defaults to `{block_id}_{key}`.
    pub html_id: String,
    pub css_class: String,
    /// Free-form attribute string placed inside the input tag.
    pub attr: String,
    /// Default value when the store has none.
    pub default: String,
    pub options: Options,
    pub editor: Option<EditorSettings>,
    /// Capability required to see and change this field.
    pub capability: Option<String>,
    // Per-field theme pattern overrides; win over block and theme values.
    pub title_patt: Option<String>,
    pub field_patt: Option<String>,
    pub desc_patt: Option<String>,
    pub desc_before_patt: Option<String>,
    pub sanitize: Sanitize,
    #[serde(skip)]
    pub disable: Option<DisableFn>,
    #[serde(skip)]
    pub output: Option<OutputFn>,
    #[serde(skip)]
    pub update: Option<UpdateFn>,
    #[serde(skip)]
    pub callback: Option<RenderFn>,
}

impl FieldSpec {
    pub fn new(type_: FieldType) -> Self {
        Self {
            type_,
            ..Self::default()
        }
    }

    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    /// The type actually rendered: keys prefixed `sep_` force a separator.
    pub fn effective_type(&self, key: &str) -> FieldType {
        if key.starts_with("sep_") {
            FieldType::Separator
        } else {
            self.type_.clone()
        }
    }

    pub fn title(mut self, title: impl Into<FieldText>) -> Self {
        self.title = title.into();
        self
    }

    pub fn desc(mut self, desc: impl Into<FieldText>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn desc_before(mut self, desc: impl Into<FieldText>) -> Self {
        self.desc_before = desc.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn html_id(mut self, id: impl Into<String>) -> Self {
        self.html_id = id.into();
        self
    }

    pub fn css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = class.into();
        self
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = attr.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    pub fn options(mut self, options: impl Into<Options>) -> Self {
        self.options = options.into();
        self
    }

    pub fn editor(mut self, settings: EditorSettings) -> Self {
        self.editor = Some(settings);
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn sanitize(mut self, sanitize: Sanitize) -> Self {
        self.sanitize = sanitize;
        self
    }

    pub fn disable(mut self, f: impl Fn(&Record, &str) -> bool + Send + Sync + 'static) -> Self {
        self.disable = Some(Hook(Arc::new(f)));
        self
    }

    pub fn output(
        mut self,
        f: impl Fn(&Record, &str, MetaValue) -> MetaValue + Send + Sync + 'static,
    ) -> Self {
        self.output = Some(Hook(Arc::new(f)));
        self
    }

    pub fn update(mut self, f: impl Fn(&Record, &str, &MetaValue) + Send + Sync + 'static) -> Self {
        self.update = Some(Hook(Arc::new(f)));
        self
    }

    pub fn callback(mut self, f: impl Fn(&RenderArgs<'_>) -> String + Send + Sync + 'static) -> Self {
        self.callback = Some(Hook(Arc::new(f)));
        self
    }
}

/// One registered group of custom fields for eligible record types.
#[derive(Debug, Clone, Serialize, Default)]
pub struct BlockSpec {
    /// Stable prefix for the block's value keys. A leading `_` suppresses
    /// the prefix.
    pub id: String,
    pub title: BlockText,
    pub desc: BlockText,
    /// Eligible record types; empty means all.
    pub record_types: Vec<String>,
    pub excluded_record_types: Vec<String>,
    /// Feature a record type must support for the block to appear.
    pub record_type_feature: Option<String>,
    /// Capability required to view or act on the whole block.
    pub capability: Option<String>,
    /// Placement hints passed through to the host screen.
    pub priority: String,
    pub context: String,
    pub theme: ThemeSpec,
    // Block-level pattern defaults; win over theme values, lose to per-field.
    pub css: Option<String>,
    pub fields_wrap: Option<String>,
    pub field_wrap: Option<String>,
    pub title_patt: Option<String>,
    pub field_patt: Option<String>,
    pub desc_patt: Option<String>,
    pub desc_before_patt: Option<String>,
    pub fields: IndexMap<String, FieldSpec>,
    #[serde(skip)]
    pub disable: Option<BlockDisableFn>,
    #[serde(skip)]
    pub save_sanitize: Option<BlockSanitizeFn>,
}

impl BlockSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            priority: "high".into(),
            context: "normal".into(),
            ..Self::default()
        }
    }

    /// The storage-key prefix: `{id}_`, or nothing when `id` starts with `_`.
    pub fn key_prefix(&self) -> String {
        if self.id.starts_with('_') {
            String::new()
        } else {
            format!("{}_", self.id)
        }
    }

    /// The storage key for one field.
    pub fn meta_key(&self, field_key: &str) -> String {
        format!("{}{}", self.key_prefix(), field_key)
    }

    pub fn title(mut self, title: impl Into<BlockText>) -> Self {
        self.title = title.into();
        self
    }

    pub fn desc(mut self, desc: impl Into<BlockText>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn record_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_record_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_record_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn record_type_feature(mut self, feature: impl Into<String>) -> Self {
        self.record_type_feature = Some(feature.into());
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn theme(mut self, theme: ThemeSpec) -> Self {
        self.theme = theme;
        self
    }

    pub fn field(mut self, key: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(key.into(), spec);
        self
    }

    pub fn disable(mut self, f: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        self.disable = Some(Hook(Arc::new(f)));
        self
    }

    pub fn save_sanitize(
        mut self,
        f: impl Fn(
                IndexMap<String, MetaValue>,
                metabox_host::RecordId,
            ) -> IndexMap<String, MetaValue>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.save_sanitize = Some(Hook(Arc::new(f)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_prefix_follows_underscore_rule() {
        assert_eq!(BlockSpec::new("gallery").key_prefix(), "gallery_");
        assert_eq!(BlockSpec::new("_gallery").key_prefix(), "");
        assert_eq!(BlockSpec::new("gallery").meta_key("color"), "gallery_color");
        assert_eq!(BlockSpec::new("_gallery").meta_key("color"), "color");
    }

    #[test]
    fn sep_key_prefix_forces_separator() {
        let f = FieldSpec::text();
        assert_eq!(f.effective_type("sep_1"), FieldType::Separator);
        assert_eq!(f.effective_type("color"), FieldType::Text);

        let select = FieldSpec::new(FieldType::Select);
        assert_eq!(select.effective_type("sep_x"), FieldType::Separator);
    }

    #[test]
    fn options_pairs_list_label_doubles_as_value() {
        let opts = Options::from(["Alpha", "Beta"]);
        assert_eq!(opts.pairs(), vec![("Alpha", "Alpha"), ("Beta", "Beta")]);
    }

    #[test]
    fn options_pairs_map_keys_are_values() {
        let opts = Options::from([("a", "Alpha"), ("b", "Beta")]);
        assert_eq!(opts.pairs(), vec![("a", "Alpha"), ("b", "Beta")]);
        assert_eq!(opts.first(), Some("Alpha"));
    }

    #[test]
    fn fields_keep_insertion_order() {
        let block = BlockSpec::new("blk")
            .field("zeta", FieldSpec::text())
            .field("alpha", FieldSpec::text())
            .field("mid", FieldSpec::text());
        let keys: Vec<_> = block.fields.keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn default_placement_hints() {
        let block = BlockSpec::new("blk");
        assert_eq!(block.priority, "high");
        assert_eq!(block.context, "normal");
    }

    #[test]
    fn input_type_for_basic_fields() {
        assert_eq!(FieldType::Email.input_type(), "email");
        assert_eq!(FieldType::Range.input_type(), "range");
        assert_eq!(FieldType::Text.input_type(), "text");
        assert_eq!(FieldType::Custom("stars".into()).input_type(), "text");
    }

    #[test]
    fn custom_type_name_passes_through() {
        assert_eq!(FieldType::Custom("stars".into()).name(), "stars");
        assert_eq!(FieldType::CheckboxMulti.name(), "checkbox_multi");
    }
}
