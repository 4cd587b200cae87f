//! Field rendering: value loading, gating, dispatch and per-type strategies.
//!
//! `render_field` runs the whole per-field pipeline and returns `None` when
//! the field is omitted (capability or disable gate) — omission is policy,
//! never an error. The returned HTML is self-contained except for the outer
//! per-field wrapper, which the block controller applies so hidden fields
//! can bypass it.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use regex::Regex;
use tracing::{debug, warn};

use metabox_fields::{FieldSpec, FieldType, Options, RenderArgs};
use metabox_host::{EditorConfig, Host, MetaValue, Record};

use crate::html::{checked, esc_attr, esc_text, fill, selected};
use crate::theme::Theme;

/// 1x1 transparent PNG shown by image fields with no current value.
const BLANK_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

static STYLE_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="([^"]+)""#).expect("valid style regex"));

/// A replacement or additional rendering strategy for one type name.
pub trait FieldTypeHandler: Send + Sync {
    fn render(&self, ctx: &FieldContext<'_>) -> String;
}

impl<F> FieldTypeHandler for F
where
    F: Fn(&FieldContext<'_>) -> String + Send + Sync,
{
    fn render(&self, ctx: &FieldContext<'_>) -> String {
        self(ctx)
    }
}

/// Open map from type name to rendering strategy, consulted before the
/// built-ins so a registered handler always wins.
#[derive(Default)]
pub struct FieldTypeRegistry {
    handlers: DashMap<String, Arc<dyn FieldTypeHandler>>,
}

impl FieldTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, type_name: impl Into<String>, handler: Arc<dyn FieldTypeHandler>) {
        let type_name = type_name.into();
        debug!(type_name, "registered field type handler");
        self.handlers.insert(type_name, handler);
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn FieldTypeHandler>> {
        self.handlers.get(type_name).map(|h| Arc::clone(&h))
    }
}

/// The block-level inputs one field render needs.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    pub block_id: &'a str,
    pub key_prefix: &'a str,
    pub instance_id: &'a str,
    pub theme: &'a Theme,
}

/// One rendered field, before the controller applies the outer wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutput {
    pub html: String,
    /// Hidden inputs bypass the wrapper and are emitted before the rest.
    pub hidden: bool,
    /// Rich-text fields get a block-level variant of the wrapper.
    pub rich_text: bool,
}

/// Everything resolved for one field render: the transient merge of field
/// spec, block context, theme patterns and the current value. Built at
/// render start, dropped after producing HTML.
pub struct FieldContext<'a> {
    pub spec: &'a FieldSpec,
    pub key: &'a str,
    pub type_: FieldType,
    pub meta_key: String,
    /// The HTML form-field name: `{instance_id}_meta[{meta_key}]`.
    pub name: String,
    pub html_id: String,
    pub value: MetaValue,
    pub record: &'a Record,
    pub host: &'a dyn Host,
    pub title_patt: String,
    pub field_patt: String,
    pub desc_patt: String,
    pub desc_before_patt: String,
}

impl<'a> FieldContext<'a> {
    pub fn value_text(&self) -> &str {
        self.value.text()
    }

    /// Resolved title wrapped in the title pattern.
    ///
    /// Cell-shaped patterns (`<td`, `<div`) render even for an empty title
    /// so table and grid columns stay aligned; inline patterns render only
    /// when there is a title.
    pub fn title_html(&self) -> String {
        let title = self
            .spec
            .title
            .resolve(self.record, &self.meta_key, &self.value, &self.name);
        let patt = self.title_patt.trim_start();
        let is_cell = patt.starts_with("<td") || patt.starts_with("<div");
        if is_cell {
            let cell = fill(&self.title_patt, &[("title", &title)]);
            if title.is_empty() {
                cell
            } else {
                cell + " "
            }
        } else if title.is_empty() {
            String::new()
        } else {
            fill(&self.title_patt, &[("title", &title)]) + " "
        }
    }

    /// Description placed after the control, wrapped in its pattern.
    pub fn desc_html(&self) -> String {
        let desc = self
            .spec
            .desc
            .resolve(self.record, &self.meta_key, &self.value, &self.name);
        if desc.is_empty() {
            String::new()
        } else {
            fill(&self.desc_patt, &[("desc", &desc)])
        }
    }

    /// Description placed before the control, wrapped in its pattern.
    pub fn desc_before_html(&self) -> String {
        let desc =
            self.spec
                .desc_before
                .resolve(self.record, &self.meta_key, &self.value, &self.name);
        if desc.is_empty() {
            String::new()
        } else {
            fill(&self.desc_before_patt, &[("desc", &desc)])
        }
    }

    /// Control wrapped in the field pattern.
    pub fn wrap_field(&self, control: &str) -> String {
        fill(&self.field_patt, &[("field", control)])
    }

    /// Title + pattern-wrapped control with both descriptions in place.
    fn compose(&self, control: &str) -> String {
        let inner = format!("{}{}{}", self.desc_before_html(), control, self.desc_html());
        self.title_html() + &self.wrap_field(&inner)
    }

    /// Free-form attr string plus class and placeholder attributes.
    fn attrs_full(&self) -> String {
        let mut out = self.attrs_base();
        if !self.spec.placeholder.is_empty() {
            out.push_str(&format!(
                " placeholder=\"{}\"",
                esc_attr(&self.spec.placeholder)
            ));
        }
        out
    }

    /// Free-form attr string plus class attribute only.
    fn attrs_base(&self) -> String {
        let mut out = String::new();
        if !self.spec.attr.is_empty() {
            out.push(' ');
            out.push_str(&self.spec.attr);
        }
        if !self.spec.css_class.is_empty() {
            out.push_str(&format!(" class=\"{}\"", self.spec.css_class));
        }
        out
    }

    fn attr_has_style(&self) -> bool {
        self.spec.attr.contains("style=")
    }
}

/// Render one field. `None` means the field is omitted from the screen.
pub fn render_field<'a>(
    block: &BlockContext<'a>,
    key: &'a str,
    spec: &'a FieldSpec,
    record: &'a Record,
    host: &'a dyn Host,
    handlers: &FieldTypeRegistry,
) -> Option<FieldOutput> {
    if key.is_empty() {
        debug!(block = block.block_id, "skipping field with empty key");
        return None;
    }

    let type_ = spec.effective_type(key);

    // Authorization gate
    if let Some(cap) = &spec.capability {
        if !host.actor_can(cap, None) {
            return None;
        }
    }

    let meta_key = format!("{}{}", block.key_prefix, key);

    // Disable gate
    if let Some(disable) = &spec.disable {
        if (disable.0)(record, &meta_key) {
            return None;
        }
    }

    // Current value: stored if present and non-empty, else the default
    let stored = match host.get_meta(record.id, &meta_key) {
        Ok(v) => v,
        Err(err) => {
            warn!(key = %meta_key, %err, "meta read failed, using default value");
            None
        }
    };
    let mut value = match stored {
        Some(v) if !v.is_empty() => v,
        _ => MetaValue::Text(spec.default.clone()),
    };
    if let Some(output) = &spec.output {
        value = (output.0)(record, &meta_key, value);
    }

    let name = format!("{}_meta[{}]", block.instance_id, meta_key);
    let html_id = if spec.html_id.is_empty() {
        format!("{}_{}", block.block_id, key)
    } else {
        spec.html_id.clone()
    };

    let theme = block.theme;
    let ctx = FieldContext {
        spec,
        key,
        type_: type_.clone(),
        meta_key,
        name,
        html_id,
        value,
        record,
        host,
        title_patt: spec.title_patt.clone().unwrap_or_else(|| theme.title_patt.clone()),
        field_patt: spec.field_patt.clone().unwrap_or_else(|| theme.field_patt.clone()),
        desc_patt: spec.desc_patt.clone().unwrap_or_else(|| theme.desc_patt.clone()),
        desc_before_patt: spec
            .desc_before_patt
            .clone()
            .unwrap_or_else(|| theme.desc_before_patt.clone()),
    };

    // Dispatch: callback, then registered handler, then built-in strategy
    let html = if let Some(callback) = &spec.callback {
        let args = RenderArgs {
            spec,
            key,
            meta_key: &ctx.meta_key,
            name: &ctx.name,
            value: &ctx.value,
            record,
        };
        ctx.title_html() + &ctx.wrap_field(&(callback.0)(&args))
    } else if let Some(handler) = handlers.get(type_.name()) {
        handler.render(&ctx)
    } else {
        match &type_ {
            FieldType::Textarea => textarea(&ctx),
            FieldType::Select => select(&ctx),
            FieldType::Radio => radio(&ctx),
            FieldType::Checkbox => checkbox(&ctx),
            FieldType::CheckboxMulti => checkbox_multi(&ctx),
            FieldType::Separator => separator(&ctx),
            FieldType::Hidden => hidden(&ctx),
            FieldType::RichText => rich_text(&ctx),
            FieldType::Image => image(&ctx),
            _ => default_input(&ctx),
        }
    };

    Some(FieldOutput {
        html,
        hidden: type_ == FieldType::Hidden,
        rich_text: type_ == FieldType::RichText,
    })
}

// text, email, number, url, tel, color, password, date, month, week, range
fn default_input(ctx: &FieldContext<'_>) -> String {
    let style = if ctx.type_ == FieldType::Text && !ctx.attr_has_style() {
        " style=\"width:100%;\""
    } else {
        ""
    };
    let control = format!(
        "<input{}{} type=\"{}\" id=\"{}\" name=\"{}\" value=\"{}\">",
        ctx.attrs_full(),
        style,
        ctx.type_.input_type(),
        esc_attr(&ctx.html_id),
        esc_attr(&ctx.name),
        esc_attr(ctx.value_text()),
    );
    ctx.compose(&control)
}

fn textarea(ctx: &FieldContext<'_>) -> String {
    let style = if ctx.attr_has_style() {
        ""
    } else {
        " style=\"width:98%;\""
    };
    let control = format!(
        "<textarea{}{} id=\"{}\" name=\"{}\">{}</textarea>",
        ctx.attrs_full(),
        style,
        esc_attr(&ctx.html_id),
        esc_attr(&ctx.name),
        esc_text(ctx.value_text()),
    );
    ctx.compose(&control)
}

fn select(ctx: &FieldContext<'_>) -> String {
    let options: Vec<String> = ctx
        .spec
        .options
        .pairs()
        .into_iter()
        .map(|(value, label)| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                esc_attr(value),
                selected(ctx.value_text() == value),
                label,
            )
        })
        .collect();
    let control = format!(
        "<select{} id=\"{}\" name=\"{}\">{}</select>",
        ctx.attrs_base(),
        esc_attr(&ctx.html_id),
        esc_attr(&ctx.name),
        options.join("\n"),
    );
    ctx.compose(&control)
}

fn radio(ctx: &FieldContext<'_>) -> String {
    let radios: Vec<String> = ctx
        .spec
        .options
        .pairs()
        .into_iter()
        .map(|(value, label)| {
            format!(
                "<label{}><input type=\"radio\" name=\"{}\" value=\"{}\"{}>{}</label>",
                ctx.attrs_base(),
                esc_attr(&ctx.name),
                esc_attr(value),
                checked(ctx.value_text() == value),
                label,
            )
        })
        .collect();
    let control = format!("<span class=\"radios\">{}</span>", radios.join("\n"));
    ctx.compose(&control)
}

// The leading hidden input makes an unchecked box submit an explicit empty
// value, which the save step turns into a delete.
fn checkbox(ctx: &FieldContext<'_>) -> String {
    let checked_value = ctx.spec.options.first().unwrap_or("1");
    let desc = ctx
        .spec
        .desc
        .resolve(ctx.record, &ctx.meta_key, &ctx.value, &ctx.name);
    let control = format!(
        "<label{}><input type=\"hidden\" name=\"{}\" value=\"\">\
         <input type=\"checkbox\" id=\"{}\" name=\"{}\" value=\"{}\"{}> {}</label>",
        ctx.attrs_base(),
        esc_attr(&ctx.name),
        esc_attr(&ctx.html_id),
        esc_attr(&ctx.name),
        esc_attr(checked_value),
        checked(ctx.value_text() == checked_value),
        desc,
    );
    ctx.title_html() + &ctx.wrap_field(&control)
}

// Two submission shapes: a map of named sub-keys (no sentinel possible) or a
// flat list with a hidden sentinel so "all unchecked" still submits.
fn checkbox_multi(ctx: &FieldContext<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    match &ctx.spec.options {
        Options::Map(entries) => {
            for (sub_key, label) in entries {
                parts.push(format!(
                    "<label{}><input type=\"checkbox\" name=\"{}[{}]\" value=\"{}\"{}> {}</label>",
                    ctx.attrs_base(),
                    esc_attr(&ctx.name),
                    esc_attr(sub_key),
                    esc_attr(sub_key),
                    checked(ctx.value.map_has(sub_key)),
                    label,
                ));
            }
        }
        _ => {
            parts.push(format!(
                "<input type=\"hidden\" name=\"{}\" value=\"\">",
                esc_attr(&ctx.name)
            ));
            for (value, label) in ctx.spec.options.pairs() {
                parts.push(format!(
                    "<label{}><input type=\"checkbox\" name=\"{}[]\" value=\"{}\"{}> {}</label>",
                    ctx.attrs_base(),
                    esc_attr(&ctx.name),
                    esc_attr(value),
                    checked(ctx.value.list_contains(value)),
                    label,
                ));
            }
        }
    }
    let control = format!("<span class=\"checkboxes\">{}</span>", parts.join("\n"));
    ctx.compose(&control)
}

fn separator(ctx: &FieldContext<'_>) -> String {
    let title = ctx
        .spec
        .title
        .resolve(ctx.record, &ctx.meta_key, &ctx.value, &ctx.name);

    let mut style = String::from("font-weight:600; ");
    if let Some(captures) = STYLE_ATTR_RE.captures(&ctx.spec.attr) {
        style.push_str(&captures[1]);
    }

    // Inside a table layout the separator spans both columns.
    if ctx.field_patt.contains("<td") {
        let cell = ctx.wrap_field(&title);
        cell.replacen(
            "<td ",
            &format!("<td colspan=\"2\" style=\"padding:1em .5em; {style}\" "),
            1,
        )
    } else {
        format!(
            "<span style=\"display:block; padding:1em 0; font-size:110%; {style}\">{title}</span>"
        )
    }
}

fn hidden(ctx: &FieldContext<'_>) -> String {
    let title = ctx
        .spec
        .title
        .resolve(ctx.record, &ctx.meta_key, &ctx.value, &ctx.name);
    format!(
        "<input type=\"hidden\" id=\"{}\" name=\"{}\" value=\"{}\" title=\"{}\">",
        esc_attr(&ctx.html_id),
        esc_attr(&ctx.name),
        esc_attr(ctx.value_text()),
        esc_attr(&title),
    )
}

fn rich_text(ctx: &FieldContext<'_>) -> String {
    let mut config = EditorConfig::new(ctx.name.clone());
    config.editor_class = ctx.spec.css_class.clone();
    if let Some(settings) = &ctx.spec.editor {
        if let Some(v) = settings.autop {
            config.autop = v;
        }
        if let Some(v) = settings.textarea_rows {
            config.textarea_rows = v;
        }
        if let Some(v) = settings.tabindex {
            config.tabindex = Some(v);
        }
        if let Some(v) = &settings.editor_css {
            config.editor_css = v.clone();
        }
        if let Some(v) = settings.teeny {
            config.teeny = v;
        }
        if let Some(v) = settings.tinymce {
            config.tinymce = v;
        }
        if let Some(v) = settings.quicktags {
            config.quicktags = v;
        }
        if let Some(v) = settings.media_buttons {
            config.media_buttons = v;
        }
        if let Some(v) = settings.drag_drop_upload {
            config.drag_drop_upload = v;
        }
    }
    let editor = ctx
        .host
        .render_rich_editor(ctx.value_text(), &ctx.html_id, &config);
    ctx.title_html() + &ctx.wrap_field(&(editor + &ctx.desc_html()))
}

// Preview plus a hidden input holding the stored id or URL; the picker
// buttons are wired up by the host's media collaborator.
fn image(ctx: &FieldContext<'_>) -> String {
    let mode = match ctx.spec.options.first() {
        Some("url") => "url",
        _ => "id",
    };

    let value = ctx.value_text();
    let is_numeric = !value.is_empty() && value.chars().all(|c| c.is_ascii_digit());
    let src = if is_numeric {
        ctx.host.attachment_url(value).unwrap_or_default()
    } else {
        value.to_string()
    };
    let src = if src.is_empty() {
        BLANK_IMAGE.to_string()
    } else {
        src
    };

    let control = format!(
        "<span class=\"mbx-img-wrap\" data-usetype=\"{mode}\" style=\"display:flex; align-items:center;\">\
         <img src=\"{}\" style=\"max-height:100px; max-width:100px; margin-right:1em;\" alt=\"\">\
         <span>\
         <input class=\"set-img button button-small\" type=\"button\" data-record=\"{}\" value=\"Record images\">\
         <input class=\"set-img button button-small\" type=\"button\" value=\"Set image\">\
         <input class=\"del-img button button-small\" type=\"button\" value=\"Remove\">\
         <input type=\"hidden\" name=\"{}\" value=\"{}\">\
         </span></span>",
        esc_attr(&src),
        ctx.record.id,
        esc_attr(&ctx.name),
        esc_attr(value),
    );
    ctx.title_html() + &ctx.wrap_field(&control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabox_fields::{FieldText, Sanitize};
    use metabox_host::MemoryHost;

    fn block_ctx<'a>(theme: &'a Theme) -> BlockContext<'a> {
        BlockContext {
            block_id: "blk",
            key_prefix: "blk_",
            instance_id: "abc1234",
            theme,
        }
    }

    fn render(
        theme: &Theme,
        key: &str,
        spec: &FieldSpec,
        host: &MemoryHost,
    ) -> Option<FieldOutput> {
        let record = Record::new(1, "article");
        render_field(
            &block_ctx(theme),
            key,
            spec,
            &record,
            host,
            &FieldTypeRegistry::new(),
        )
    }

    #[test]
    fn default_input_renders_name_value_and_id() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(metabox_host::RecordId(1), "blk_color", "red".into())
            .unwrap();

        let spec = FieldSpec::text().title("Color");
        let out = render(&theme, "color", &spec, &host).unwrap();
        assert!(!out.hidden);
        assert!(out.html.contains("name=\"abc1234_meta[blk_color]\""));
        assert!(out.html.contains("value=\"red\""));
        assert!(out.html.contains("id=\"blk_color\""));
        assert!(out.html.contains("<label>Color</label>"));
        assert!(out.html.contains("style=\"width:100%;\""));
    }

    #[test]
    fn rendering_twice_is_deterministic() {
        let theme = Theme::table();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::Select)
            .title("Layout")
            .options([("a", "Alpha"), ("b", "Beta")]);
        let first = render(&theme, "layout", &spec, &host).unwrap();
        let second = render(&theme, "layout", &spec, &host).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stored_empty_value_falls_back_to_default() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(metabox_host::RecordId(1), "blk_color", "".into())
            .unwrap();
        let spec = FieldSpec::text().default_value("green");
        let out = render(&theme, "color", &spec, &host).unwrap();
        assert!(out.html.contains("value=\"green\""));
    }

    #[test]
    fn capability_gate_omits_field() {
        let theme = Theme::line();
        let host = MemoryHost::new().deny_capability("manage_colors");
        let spec = FieldSpec::text().capability("manage_colors");
        assert!(render(&theme, "color", &spec, &host).is_none());
    }

    #[test]
    fn disable_gate_omits_field() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text().disable(|_, meta_key| meta_key == "blk_color");
        assert!(render(&theme, "color", &spec, &host).is_none());
        assert!(render(&theme, "size", &spec, &host).is_some());
    }

    #[test]
    fn select_marks_stored_option_selected() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(metabox_host::RecordId(1), "blk_layout", "b".into())
            .unwrap();
        let spec = FieldSpec::new(FieldType::Select).options([("a", "Alpha"), ("b", "Beta")]);
        let out = render(&theme, "layout", &spec, &host).unwrap();
        assert!(out
            .html
            .contains("<option value=\"b\" selected=\"selected\">Beta</option>"));
        assert!(out.html.contains("<option value=\"a\">Alpha</option>"));
    }

    #[test]
    fn select_list_options_use_label_as_value() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::Select).options(["Alpha", "Beta"]);
        let out = render(&theme, "layout", &spec, &host).unwrap();
        assert!(out.html.contains("<option value=\"Alpha\">Alpha</option>"));
    }

    #[test]
    fn checkbox_emits_hidden_companion_before_the_box() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::Checkbox).desc("Enable?");
        let out = render(&theme, "flag", &spec, &host).unwrap();

        let hidden_pos = out
            .html
            .find("<input type=\"hidden\" name=\"abc1234_meta[blk_flag]\" value=\"\">")
            .expect("hidden companion input");
        let box_pos = out.html.find("type=\"checkbox\"").expect("checkbox input");
        assert!(hidden_pos < box_pos);
        assert!(out.html.contains("value=\"1\""));
    }

    #[test]
    fn checkbox_checked_value_comes_from_first_option() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(metabox_host::RecordId(1), "blk_flag", "yes".into())
            .unwrap();
        let spec = FieldSpec::new(FieldType::Checkbox).options(["yes"]);
        let out = render(&theme, "flag", &spec, &host).unwrap();
        assert!(out.html.contains("value=\"yes\" checked=\"checked\""));
    }

    #[test]
    fn checkbox_multi_flat_list_has_sentinel_and_array_names() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(
            metabox_host::RecordId(1),
            "blk_tags",
            MetaValue::List(vec!["red".into()]),
        )
        .unwrap();
        let spec = FieldSpec::new(FieldType::CheckboxMulti).options(["red", "blue"]);
        let out = render(&theme, "tags", &spec, &host).unwrap();
        assert!(out
            .html
            .contains("<input type=\"hidden\" name=\"abc1234_meta[blk_tags]\" value=\"\">"));
        assert!(out.html.contains("name=\"abc1234_meta[blk_tags][]\""));
        assert!(out.html.contains("value=\"red\" checked=\"checked\""));
        assert!(!out.html.contains("value=\"blue\" checked"));
    }

    #[test]
    fn checkbox_multi_named_sub_keys_have_no_sentinel() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec =
            FieldSpec::new(FieldType::CheckboxMulti).options([("red", "Red"), ("blue", "Blue")]);
        let out = render(&theme, "tags", &spec, &host).unwrap();
        assert!(out.html.contains("name=\"abc1234_meta[blk_tags][red]\""));
        assert!(!out.html.contains("value=\"\""));
    }

    #[test]
    fn radio_renders_one_input_per_option() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(metabox_host::RecordId(1), "blk_side", "l".into())
            .unwrap();
        let spec = FieldSpec::new(FieldType::Radio).options([("l", "Left"), ("r", "Right")]);
        let out = render(&theme, "side", &spec, &host).unwrap();
        assert_eq!(out.html.matches("type=\"radio\"").count(), 2);
        assert!(out.html.contains("value=\"l\" checked=\"checked\""));
    }

    #[test]
    fn sep_key_renders_separator_with_extracted_style() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text()
            .title("Layout options")
            .attr("style=\"color:gray\"");
        let out = render(&theme, "sep_1", &spec, &host).unwrap();
        assert!(out.html.contains("Layout options"));
        assert!(out.html.contains("font-weight:600; color:gray"));
        assert!(out.html.starts_with("<span"));
    }

    #[test]
    fn separator_spans_table_columns() {
        let theme = Theme::table();
        let host = MemoryHost::new();
        let spec = FieldSpec::text().title("Section");
        let out = render(&theme, "sep_a", &spec, &host).unwrap();
        assert!(out.html.contains("<td colspan=\"2\""));
        assert!(out.html.contains("Section"));
    }

    #[test]
    fn hidden_field_is_flagged_and_unwrapped() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::Hidden).default_value("tok");
        let out = render(&theme, "state", &spec, &host).unwrap();
        assert!(out.hidden);
        assert!(out.html.starts_with("<input type=\"hidden\""));
        assert!(out.html.contains("value=\"tok\""));
    }

    #[test]
    fn rich_text_delegates_to_host_editor() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::RichText);
        let out = render(&theme, "body", &spec, &host).unwrap();
        assert!(out.rich_text);
        assert!(out.html.contains("class=\"rich-editor"));
        assert!(out.html.contains("name=\"abc1234_meta[blk_body]\""));
        assert!(out.html.contains("rows=\"5\""));
    }

    #[test]
    fn rich_text_editor_settings_override_defaults() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::RichText).editor(metabox_fields::EditorSettings {
            textarea_rows: Some(12),
            ..Default::default()
        });
        let out = render(&theme, "body", &spec, &host).unwrap();
        assert!(out.html.contains("rows=\"12\""));
    }

    #[test]
    fn image_field_in_id_mode_resolves_attachment_url() {
        let theme = Theme::line();
        let host = MemoryHost::new().with_attachment("42", "https://cdn.test/pic.png");
        host.set_meta(metabox_host::RecordId(1), "blk_cover", "42".into())
            .unwrap();
        let spec = FieldSpec::new(FieldType::Image);
        let out = render(&theme, "cover", &spec, &host).unwrap();
        assert!(out.html.contains("data-usetype=\"id\""));
        assert!(out.html.contains("src=\"https://cdn.test/pic.png\""));
        assert!(out.html.contains("value=\"42\""));
    }

    #[test]
    fn image_field_in_url_mode_uses_value_as_src() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(
            metabox_host::RecordId(1),
            "blk_cover",
            "https://cdn.test/direct.png".into(),
        )
        .unwrap();
        let spec = FieldSpec::new(FieldType::Image).options(["url"]);
        let out = render(&theme, "cover", &spec, &host).unwrap();
        assert!(out.html.contains("data-usetype=\"url\""));
        assert!(out.html.contains("src=\"https://cdn.test/direct.png\""));
    }

    #[test]
    fn image_field_without_value_shows_blank_pixel() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::Image);
        let out = render(&theme, "cover", &spec, &host).unwrap();
        assert!(out.html.contains("data:image/png;base64"));
    }

    #[test]
    fn explicit_callback_wins_over_type() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::Select)
            .options([("a", "Alpha")])
            .callback(|args| format!("<custom name=\"{}\">", args.name));
        let out = render(&theme, "layout", &spec, &host).unwrap();
        assert!(out.html.contains("<custom name=\"abc1234_meta[blk_layout]\">"));
        assert!(!out.html.contains("<select"));
    }

    #[test]
    fn registered_handler_wins_over_builtin() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let record = Record::new(1, "article");
        let handlers = FieldTypeRegistry::new();
        handlers.register(
            "select",
            Arc::new(|ctx: &FieldContext<'_>| format!("<picker for=\"{}\">", ctx.name)),
        );
        let spec = FieldSpec::new(FieldType::Select).options([("a", "Alpha")]);
        let out = render_field(&block_ctx(&theme), "layout", &spec, &record, &host, &handlers)
            .unwrap();
        assert!(out.html.contains("<picker"));
    }

    #[test]
    fn custom_type_without_handler_uses_default_input() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::new(FieldType::Custom("stars".into()));
        let out = render(&theme, "rating", &spec, &host).unwrap();
        assert!(out.html.contains("type=\"text\""));
    }

    #[test]
    fn output_transform_rewrites_displayed_value() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        host.set_meta(metabox_host::RecordId(1), "blk_color", "red".into())
            .unwrap();
        let spec = FieldSpec::text().output(|_, _, v| MetaValue::Text(v.text().to_uppercase()));
        let out = render(&theme, "color", &spec, &host).unwrap();
        assert!(out.html.contains("value=\"RED\""));
    }

    #[test]
    fn callable_description_sees_context() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text().desc(FieldText::call(|_, meta_key, _, _| {
            format!("stored under {meta_key}")
        }));
        let out = render(&theme, "color", &spec, &host).unwrap();
        assert!(out.html.contains("stored under blk_color"));
    }

    #[test]
    fn desc_before_renders_ahead_of_the_control() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text().desc_before("Pick wisely");
        let out = render(&theme, "color", &spec, &host).unwrap();
        let desc_pos = out.html.find("Pick wisely").unwrap();
        let input_pos = out.html.find("<input").unwrap();
        assert!(desc_pos < input_pos);
    }

    #[test]
    fn table_theme_title_cell_renders_even_without_title() {
        let theme = Theme::table();
        let host = MemoryHost::new();
        let spec = FieldSpec::text();
        let out = render(&theme, "color", &spec, &host).unwrap();
        assert!(out.html.contains("<td style=\"width:10em;\" class=\"tit\"></td>"));
    }

    #[test]
    fn line_theme_omits_empty_title() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text();
        let out = render(&theme, "color", &spec, &host).unwrap();
        assert!(!out.html.contains("<strong"));
    }

    #[test]
    fn store_read_failure_degrades_to_default() {
        // A host that fails reads: reuse failing writes host by writing first
        // is impossible, so emulate with a fresh host and no stored value.
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text().default_value("fallback");
        let out = render(&theme, "color", &spec, &host).unwrap();
        assert!(out.html.contains("value=\"fallback\""));
    }

    #[test]
    fn empty_key_is_skipped() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text();
        assert!(render(&theme, "", &spec, &host).is_none());
    }

    #[test]
    fn sanitize_marker_does_not_affect_rendering() {
        let theme = Theme::line();
        let host = MemoryHost::new();
        let spec = FieldSpec::text().sanitize(Sanitize::None);
        assert!(render(&theme, "color", &spec, &host).is_some());
    }
}
