//! Page resolution module
//!
//! Owns the mapping from logical page names to page definitions and the
//! path-normalization rules that turn an incoming request path into a lookup
//! key. Resolution failure is not an error: callers treat a miss as "pass
//! through to the next handler."

pub mod scan;

use crate::render::{RenderFn, TemplateData};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Mapping from logical page name to definition, built once at startup
pub type PageTable = HashMap<String, PageDefinition>;

/// One configured page.
///
/// Either a bare template path, a template descriptor with per-page data and
/// an optional render override, or a virtual entry-module scaffold. The
/// shape is discriminated by the presence of `template` vs `entry`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageDefinition {
    Path(String),
    Template(TemplatePage),
    Virtual(VirtualPage),
}

/// Template-backed page
#[derive(Clone, Deserialize)]
pub struct TemplatePage {
    pub template: String,
    #[serde(default)]
    pub data: TemplateData,
    /// Per-page render override, programmatic only
    #[serde(skip)]
    pub render: Option<RenderFn>,
}

impl fmt::Debug for TemplatePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatePage")
            .field("template", &self.template)
            .field("data", &self.data)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Virtual page synthesized from an entry module, no template on disk
#[derive(Debug, Clone, Deserialize)]
pub struct VirtualPage {
    pub entry: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Template path, merged data, and render strategy for one request
pub struct MergedPage {
    pub template: String,
    pub data: TemplateData,
    pub render: RenderFn,
}

/// Normalize a request path into a page-table lookup key.
///
/// Strips the working-directory prefix, the configured root prefix (after
/// ensuring it carries a trailing slash), a trailing `.html`, and a leading
/// slash; backslashes become forward slashes. Idempotent once the leading
/// slash and suffix are gone.
#[must_use]
pub fn normalize_name(request_path: &str, root_prefix: Option<&str>) -> String {
    let mut name = request_path.replace('\\', "/");

    if let Ok(cwd) = std::env::current_dir() {
        let cwd = cwd.to_string_lossy().replace('\\', "/");
        if !cwd.is_empty() && cwd != "/" {
            if let Some(stripped) = name.strip_prefix(&cwd) {
                name = stripped.to_string();
            }
        }
    }

    if let Some(root) = root_prefix {
        if !root.is_empty() {
            let root = if root.ends_with('/') {
                root.to_string()
            } else {
                format!("{root}/")
            };
            name = name.replacen(&root, "", 1);
        }
    }

    if let Some(stripped) = name.strip_suffix(".html") {
        name = stripped.to_string();
    }
    if let Some(stripped) = name.strip_prefix('/') {
        name = stripped.to_string();
    }
    name
}

/// Resolve a request path to a page definition.
///
/// Probes candidate keys in order so that `/about`, `/about/`, and
/// `/about/index` all address the logical page `about`. A miss yields `None`,
/// never an error.
#[must_use]
pub fn resolve<'a>(
    table: &'a PageTable,
    request_path: &str,
    root_prefix: Option<&str>,
) -> Option<&'a PageDefinition> {
    let name = normalize_name(request_path, root_prefix);
    candidate_names(&name)
        .into_iter()
        .find_map(|candidate| table.get(&candidate))
}

/// Candidate lookup keys for a normalized name, most specific first:
/// the name itself, its trailing-slash variants, the implicit `/index`
/// form, and the form with the first literal `index` token removed.
fn candidate_names(name: &str) -> Vec<String> {
    let without_index = collapse_slashes(&name.replacen("index", "", 1));
    let raw = [
        name.to_string(),
        collapse_slashes(&format!("{name}/")),
        name.trim_end_matches('/').to_string(),
        collapse_slashes(&format!("{name}/index")),
        without_index.clone(),
        without_index.trim_end_matches('/').to_string(),
    ];

    let mut candidates: Vec<String> = Vec::with_capacity(raw.len());
    for candidate in raw {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

fn collapse_slashes(s: &str) -> String {
    let mut out = s.to_string();
    while out.contains("//") {
        out = out.replace("//", "/");
    }
    out
}

/// Combine a page definition with the global data and render strategy.
///
/// Page data wins over global data on key collision; the render strategy is
/// the page override, else the global render, else the built-in default.
/// Virtual pages carry no template and yield `None`.
#[must_use]
pub fn merge_page_options(
    def: &PageDefinition,
    global_data: &TemplateData,
    global_render: Option<&RenderFn>,
    default_render: &RenderFn,
) -> Option<MergedPage> {
    let pick_global = || {
        global_render
            .cloned()
            .unwrap_or_else(|| Arc::clone(default_render))
    };

    match def {
        PageDefinition::Path(template) => Some(MergedPage {
            template: template.clone(),
            data: global_data.clone(),
            render: pick_global(),
        }),
        PageDefinition::Template(page) => {
            let mut data = global_data.clone();
            data.extend(page.data.clone());
            Some(MergedPage {
                template: page.template.clone(),
                data,
                render: page.render.clone().unwrap_or_else(pick_global),
            })
        }
        PageDefinition::Virtual(_) => None,
    }
}
