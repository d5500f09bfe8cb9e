//! Handlebars binding for certificate templates.
//!
//! Every entry of the [`HelperRegistry`] is registered under its own name.
//! Two layout helpers sit on top:
//!
//! * `{{#wrapGroup x=.. y=.. lineLength=..}} .. {{/wrapGroup}}` opens a
//!   block with its own layout cursor.
//! * `{{{svgText text maxWidth=.. fontSize=.. fontWeight=..}}}` emits
//!   `<tspan>` lines at the cursor and moves it down.
//!
//! The cursor lives on the open-group stack of [`super::layout`], so
//! `svgText` calls inside `#each`/`#with` blocks still share it, and it
//! disappears with the group whether rendering succeeds or fails.

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
    Renderable, ScopedJson,
};
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use super::helpers::{HelperCall, HelperFn, HelperRegistry};
use super::layout::{
    number_arg, render_tspans, with_group_cursor, with_wrap_group, LayoutCursor, LayoutOptions,
};
use super::CertificateError;

/// File suffix of certificate templates.
pub const TEMPLATE_SUFFIX: &str = ".svg.hbs";

fn hash_map(h: &Helper<'_>) -> Map<String, Value> {
    h.hash()
        .iter()
        .map(|(key, value)| (key.to_string(), value.value().clone()))
        .collect()
}

/// Adapts one table entry to Handlebars.
struct TableHelper {
    call: HelperFn,
}

impl HelperDef for TableHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let params = h.params().iter().map(|p| p.value().clone()).collect();
        let call = HelperCall::new(params, hash_map(h), ctx.data());
        Ok(ScopedJson::Derived((self.call)(&call)))
    }
}

struct WrapGroupHelper;

impl HelperDef for WrapGroupHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let Some(template) = h.template() else {
            return Ok(());
        };
        let cursor = LayoutCursor::from_hash(&hash_map(h));
        with_wrap_group(cursor, || template.render(r, ctx, rc, out))
    }
}

struct SvgTextHelper;

impl HelperDef for SvgTextHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = match h.param(0).map(|p| p.value()) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let hash = hash_map(h);
        let options = LayoutOptions::from_hash(&hash);
        let explicit_width = number_arg(&hash, "maxWidth").is_some();
        let layout = |cursor: &mut LayoutCursor| {
            let mut options = options.clone();
            if !explicit_width {
                options.max_width = cursor.line_length;
            }
            render_tspans(&text, &options, cursor)
        };

        let fragment = match with_group_cursor(&layout) {
            Some(fragment) => fragment,
            None => layout(&mut LayoutCursor::from_hash(&hash)),
        };
        out.write(&fragment)?;
        Ok(())
    }
}

/// Certificate templates with every helper registered.
pub struct CertificateRenderer {
    handlebars: Handlebars<'static>,
    helpers: HelperRegistry,
}

impl Default for CertificateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateRenderer {
    pub fn new() -> Self {
        let helpers = HelperRegistry::new();
        let mut handlebars = Handlebars::new();
        for name in helpers.names() {
            if let Some(call) = helpers.get(name) {
                handlebars.register_helper(name, Box::new(TableHelper { call }));
            }
        }
        handlebars.register_helper("wrapGroup", Box::new(WrapGroupHelper));
        handlebars.register_helper("svgText", Box::new(SvgTextHelper));
        Self {
            handlebars,
            helpers,
        }
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    pub fn register_template(&mut self, name: &str, source: &str) -> Result<(), CertificateError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|source| CertificateError::Template {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    /// Register every `*.svg.hbs` file in `dir` under its stem.
    /// Returns the number of templates registered.
    pub fn load_templates(&mut self, dir: &Path) -> Result<usize, CertificateError> {
        let mut loaded = 0;
        for entry in fs::read_dir(dir).map_err(CertificateError::TemplateIo)? {
            let path = entry.map_err(CertificateError::TemplateIo)?.path();
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(TEMPLATE_SUFFIX))
            else {
                continue;
            };
            let source = fs::read_to_string(&path).map_err(CertificateError::TemplateIo)?;
            self.register_template(name, &source)?;
            debug!("Registered certificate template {}", name);
            loaded += 1;
        }
        info!("Loaded {} certificate templates from {}", loaded, dir.display());
        Ok(loaded)
    }

    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlebars.get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, CertificateError> {
        if !self.has_template(template) {
            return Err(CertificateError::UnknownTemplate(template.to_string()));
        }
        Ok(self.handlebars.render(template, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer(source: &str) -> CertificateRenderer {
        let mut renderer = CertificateRenderer::new();
        renderer.register_template("t", source).unwrap();
        renderer
    }

    #[test]
    fn test_table_helpers_render_inline_and_as_subexpressions() {
        let r = renderer("{{numberToWords year}}|{{#if (canShowFatherDetails this)}}yes{{else}}no{{/if}}");
        let out = r
            .render("t", &json!({ "year": 2024, "motherMaritalStatus": "married" }))
            .unwrap();
        assert_eq!(out, "roa arivo sy efatra amby roapolo|yes");
    }

    #[test]
    fn test_wrap_group_advances_shared_cursor() {
        let r = renderer(
            r#"{{#wrapGroup x=5 y=100 lineLength=40}}{{{svgText "andalana voalohany" lineHeight=14}}}{{{svgText "andalana faharoa" lineHeight=14}}}{{/wrapGroup}}"#,
        );
        let out = r.render("t", &json!({})).unwrap();
        assert_eq!(
            out,
            r#"<tspan x="5" y="100">andalana voalohany</tspan><tspan x="5" y="114">andalana faharoa</tspan>"#
        );
    }

    #[test]
    fn test_cursor_does_not_leak_between_groups() {
        let r = renderer(
            r#"{{#wrapGroup y=10}}{{{svgText "a" lineHeight=5}}}{{{svgText "b" lineHeight=5}}}{{/wrapGroup}}{{#wrapGroup y=10}}{{{svgText "c" lineHeight=5}}}{{/wrapGroup}}"#,
        );
        let out = r.render("t", &json!({})).unwrap();
        assert!(out.ends_with(r#"<tspan x="0" y="10">c</tspan>"#));
    }

    #[test]
    fn test_svg_text_inside_each_shares_group_cursor() {
        let r = renderer(
            r#"{{#wrapGroup x=40 y=100}}{{#each items}}{{{svgText this}}}{{/each}}{{/wrapGroup}}"#,
        );
        let out = r.render("t", &json!({ "items": ["voalohany", "faharoa"] })).unwrap();
        assert_eq!(
            out,
            r#"<tspan x="40" y="100">voalohany</tspan><tspan x="40" y="114">faharoa</tspan>"#
        );
    }

    #[test]
    fn test_svg_text_inside_with_and_nested_group() {
        let r = renderer(
            r#"{{#wrapGroup x=10 y=50}}{{#with father}}{{{svgText name}}}{{/with}}{{#wrapGroup x=300 y=0}}{{{svgText "b"}}}{{/wrapGroup}}{{{svgText "c"}}}{{/wrapGroup}}"#,
        );
        let out = r.render("t", &json!({ "father": { "name": "Rakoto" } })).unwrap();
        assert_eq!(
            out,
            r#"<tspan x="10" y="50">Rakoto</tspan><tspan x="300" y="0">b</tspan><tspan x="10" y="64">c</tspan>"#
        );
    }

    #[test]
    fn test_svg_text_outside_group_uses_hash_position() {
        let r = renderer(r#"{{{svgText name x=3 y=7 maxWidth=50}}}"#);
        let out = r.render("t", &json!({ "name": "Rakoto & Rasoa" })).unwrap();
        assert_eq!(out, r#"<tspan x="3" y="7">Rakoto &amp; Rasoa</tspan>"#);
    }

    #[test]
    fn test_unknown_template() {
        let r = CertificateRenderer::new();
        assert!(matches!(
            r.render("missing", &json!({})),
            Err(CertificateError::UnknownTemplate(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_load_templates_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("birth.svg.hbs"), "<svg>{{eventStatement}}</svg>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut r = CertificateRenderer::new();
        assert_eq!(r.load_templates(dir.path()).unwrap(), 1);
        assert_eq!(r.template_names(), vec!["birth".to_string()]);
    }
}
