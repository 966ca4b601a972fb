//! Template render strategies
//!
//! A render function turns raw template text plus merged page data into the
//! HTML that gets served. Render functions are capability values passed in at
//! construction; the default strategy substitutes `<% name %>` variables with
//! an embedded template engine whose include root is the process working
//! directory. When the `templating` feature is disabled the default strategy
//! degrades to returning the template text unmodified, with a one-time
//! warning.

use crate::logger::Warnings;
use std::collections::HashMap;
use std::sync::Arc;

/// Render-time data for one page
pub type TemplateData = HashMap<String, serde_json::Value>;

/// Pluggable render strategy: `(raw_template_text, merged_data) -> html`
pub type RenderFn = Arc<dyn Fn(&str, &TemplateData) -> String + Send + Sync>;

/// Build the built-in default render strategy.
///
/// Rendering never fails the request: engine errors and engine absence both
/// degrade to the unrendered template text with a deduplicated warning.
#[cfg(feature = "templating")]
#[must_use]
pub fn default_renderer(warnings: Warnings) -> RenderFn {
    let env = build_environment();
    Arc::new(move |template: &str, data: &TemplateData| match env.render_str(template, data) {
        Ok(rendered) => rendered,
        Err(err) => {
            warnings.warn_once(
                &format!("render:{err}"),
                &format!("template render failed, serving unrendered text: {err}"),
            );
            template.to_string()
        }
    })
}

/// Build the built-in default render strategy.
///
/// Compiled without the `templating` feature: the engine is unavailable, so
/// templates are served unrendered and a single warning is emitted.
#[cfg(not(feature = "templating"))]
#[must_use]
pub fn default_renderer(warnings: Warnings) -> RenderFn {
    Arc::new(move |template: &str, _data: &TemplateData| {
        warnings.warn_once(
            "render-engine-unavailable",
            "template engine unavailable (built without the `templating` feature); serving templates unrendered",
        );
        template.to_string()
    })
}

/// Template environment with `%`-delimited variables and the working
/// directory as the include root.
#[cfg(feature = "templating")]
fn build_environment() -> minijinja::Environment<'static> {
    use minijinja::syntax::SyntaxConfig;

    let mut env = minijinja::Environment::new();
    match SyntaxConfig::builder()
        .variable_delimiters("<%", "%>")
        .build()
    {
        Ok(syntax) => env.set_syntax(syntax),
        Err(err) => crate::logger::log_warning(&format!(
            "failed to configure template delimiters, keeping defaults: {err}"
        )),
    }

    let include_root = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    env.set_loader(minijinja::path_loader(include_root));
    env
}
