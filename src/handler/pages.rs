//! Virtual page request handling
//!
//! Bridges the middleware chain to the page resolver: resolves a page for an
//! HTML-like request, loads or synthesizes its HTML, applies code injection,
//! and builds the response. Requests that resolve to no page pass through to
//! the next handler.

use crate::config::AppState;
use crate::http;
use crate::inject::{self, InjectionRule};
use crate::pages::{self, PageDefinition, VirtualPage};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{Method, Response};
use std::collections::HashMap;
use tokio::fs;

/// Body used when a virtual page configures none
pub const DEFAULT_VIRTUAL_BODY: &str = "<div id=\"app\"></div>";

/// Boilerplate document for entry-module pages. `#TITLE#`, `#ENTRY#`, and
/// `#BODY#` are each substituted exactly once, first occurrence only.
const VIRTUAL_DOCUMENT: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>#TITLE#</title>
</head>
<body>
#BODY#
<script src="#ENTRY#" type="module"></script>
</body>
</html>
"##;

/// Whether an id is an HTML-like candidate: ends with `.html` or denotes a
/// directory (trailing slash)
#[must_use]
pub fn should_handle(id: &str) -> bool {
    id.ends_with(".html") || id.ends_with('/')
}

/// Load the HTML for an HTML-like id.
///
/// Template-backed pages merge global and page data, read the template from
/// disk (a missing file degrades to empty content with a one-time warning),
/// and run the render strategy. Virtual pages synthesize the boilerplate
/// document. `None` means no page resolved and the caller should pass
/// through.
pub async fn load(id: &str, state: &AppState) -> Option<String> {
    if !should_handle(id) {
        return None;
    }

    let def = pages::resolve(&state.pages, id, state.root_prefix())?;
    if let PageDefinition::Virtual(page) = def {
        return Some(render_virtual(page));
    }

    let merged = pages::merge_page_options(
        def,
        &state.config.pages.data,
        state.global_render.as_ref(),
        &state.default_render,
    )?;

    let template_path = state
        .project_root
        .join(merged.template.trim_start_matches('/'));
    let text = match fs::read_to_string(&template_path).await {
        Ok(text) => text,
        Err(_) => {
            state.warnings.warn_once(
                &format!("template:{}", merged.template),
                &format!(
                    "template file {} not found, serving empty page",
                    template_path.display()
                ),
            );
            String::new()
        }
    };
    Some((merged.render)(&text, &merged.data))
}

/// Synthesize the full document for a virtual page
#[must_use]
pub fn render_virtual(page: &VirtualPage) -> String {
    VIRTUAL_DOCUMENT
        .replacen("#TITLE#", page.title.as_deref().unwrap_or(""), 1)
        .replacen("#BODY#", page.body.as_deref().unwrap_or(DEFAULT_VIRTUAL_BODY), 1)
        .replacen("#ENTRY#", &page.entry, 1)
}

/// Apply injection rules to served HTML.
///
/// The lookup key is the trailing path segment of the id; the wildcard rule
/// applies first, then the filename rule, each on the previous output.
/// `None` when the id is not HTML-like.
#[must_use]
pub fn transform(
    code: &str,
    id: &str,
    rules: &HashMap<String, InjectionRule>,
) -> Option<String> {
    if !should_handle(id) {
        return None;
    }
    let file_name = id.rsplit('/').next().unwrap_or(id);
    Some(inject::apply_rules(code, file_name, rules))
}

/// Catch-all page middleware.
///
/// Computes the effective URL (the original path when it ends in `/`, else
/// the fallback-rewrite output), applies the optional URL transformer, and
/// serves the resolved page. `None` passes the request to the next handler.
pub async fn respond(parts: &Parts, state: &AppState) -> Option<Response<Full<Bytes>>> {
    let raw_path = parts.uri.path();
    let rewritten = crate::routing::fallback::rewrite(raw_path, &state.rewrites);
    let mut url = if raw_path.ends_with('/') {
        raw_path.to_string()
    } else {
        rewritten
    };

    if let Some(transformer) = &state.url_transformer {
        url = transformer(&url, parts);
    }

    if url != "/" && !url.ends_with('/') && !url.ends_with(".html") {
        return None;
    }
    if url == "/" || url == "/index.html" {
        url = format!("/{}.html", state.config.pages.index_page);
    }
    let url = match urlencoding::decode(&url) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => url.clone(),
    };

    let html = load(&url, state).await?;
    let code = transform(&html, &url, &state.config.pages.inject)?;

    let is_head = parts.method == Method::HEAD;
    Some(http::build_html_response(code, is_head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, LoggingConfig, PagesConfig, PerformanceConfig, ServerConfig,
    };
    use crate::inject::{InjectPosition, InjectionRule};
    use crate::pages::TemplatePage;
    use crate::render::TemplateData;
    use hyper::Request;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;

    fn test_config(project_root: &Path, entries: HashMap<String, PageDefinition>) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                root: String::new(),
                public_dir: "public".to_string(),
                project_root: Some(project_root.to_string_lossy().into_owned()),
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
            },
            pages: PagesConfig {
                entries: Some(entries),
                ..PagesConfig::default()
            },
        }
    }

    fn parts_for(uri: &str) -> Parts {
        let (parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_should_handle_filter() {
        assert!(should_handle("/about.html"));
        assert!(should_handle("/about/"));
        assert!(should_handle("/"));
        assert!(!should_handle("/app.js"));
        assert!(!should_handle("/about"));
    }

    #[test]
    fn test_virtual_document_synthesis() {
        let page = VirtualPage {
            entry: "/src/main.ts".to_string(),
            title: Some("App".to_string()),
            body: None,
        };
        let html = render_virtual(&page);

        assert_eq!(html.matches("<title>App</title>").count(), 1);
        assert_eq!(
            html.matches("<script src=\"/src/main.ts\" type=\"module\"></script>")
                .count(),
            1
        );
        assert_eq!(html.matches(DEFAULT_VIRTUAL_BODY).count(), 1);
        // Byte-exact apart from the three substitutions
        assert_eq!(
            html,
            VIRTUAL_DOCUMENT
                .replace("#TITLE#", "App")
                .replace("#BODY#", DEFAULT_VIRTUAL_BODY)
                .replace("#ENTRY#", "/src/main.ts")
        );
    }

    #[test]
    fn test_virtual_document_defaults() {
        let page = VirtualPage {
            entry: "/src/main.ts".to_string(),
            title: None,
            body: Some("<main>custom</main>".to_string()),
        };
        let html = render_virtual(&page);
        assert!(html.contains("<title></title>"));
        assert!(html.contains("<main>custom</main>"));
        assert!(!html.contains("#BODY#"));
    }

    #[tokio::test]
    async fn test_load_reads_template_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();

        let mut entries = HashMap::new();
        entries.insert(
            "about".to_string(),
            PageDefinition::Path("/about.html".to_string()),
        );
        let state = AppState::new(test_config(dir.path(), entries));

        let html = load("/about.html", &state).await.unwrap();
        assert_eq!(html, "<h1>About</h1>");
    }

    #[cfg(feature = "templating")]
    #[tokio::test]
    async fn test_load_renders_template_data() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.html"), "<h1><% title %></h1>").unwrap();

        let mut data = TemplateData::new();
        data.insert("title".to_string(), serde_json::Value::from("About Us"));
        let mut entries = HashMap::new();
        entries.insert(
            "about".to_string(),
            PageDefinition::Template(TemplatePage {
                template: "/about.html".to_string(),
                data,
                render: None,
            }),
        );
        let state = AppState::new(test_config(dir.path(), entries));

        let html = load("/about.html", &state).await.unwrap();
        assert_eq!(html, "<h1>About Us</h1>");
    }

    #[tokio::test]
    async fn test_missing_template_serves_empty_and_warns_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut entries = HashMap::new();
        entries.insert(
            "about".to_string(),
            PageDefinition::Path("/about.html".to_string()),
        );
        let state = AppState::new(test_config(dir.path(), entries));

        assert_eq!(load("/about.html", &state).await.unwrap(), "");
        assert_eq!(load("/about.html", &state).await.unwrap(), "");
        assert_eq!(state.warnings.count(), 1);
    }

    #[tokio::test]
    async fn test_load_unresolved_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(test_config(dir.path(), HashMap::new()));
        assert!(load("/missing.html", &state).await.is_none());
        // Non-HTML ids never handle
        assert!(load("/app.js", &state).await.is_none());
    }

    #[test]
    fn test_transform_uses_trailing_segment_key() {
        let mut rules = HashMap::new();
        rules.insert(
            "about.html".to_string(),
            InjectionRule {
                pos: InjectPosition::After,
                find: "<head>".to_string(),
                replacement: "<meta name=\"x\">".to_string(),
            },
        );

        let out = transform("<head>\n</head>", "/deep/path/about.html", &rules).unwrap();
        assert_eq!(out, "<head>\n<meta name=\"x\">\n</head>");

        let untouched = transform("<head>\n</head>", "/other.html", &rules).unwrap();
        assert_eq!(untouched, "<head>\n</head>");

        assert!(transform("code", "/app.js", &rules).is_none());
    }

    #[tokio::test]
    async fn test_respond_resolves_trailing_slash_request() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();

        let mut entries = HashMap::new();
        entries.insert(
            "about".to_string(),
            PageDefinition::Path("/about.html".to_string()),
        );
        let state = AppState::new(test_config(dir.path(), entries));

        let resp = respond(&parts_for("/about/"), &state).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_respond_maps_bare_root_to_index_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Home</h1>").unwrap();

        let mut entries = HashMap::new();
        entries.insert(
            "index".to_string(),
            PageDefinition::Path("/index.html".to_string()),
        );
        let state = AppState::new(test_config(dir.path(), entries));

        assert!(respond(&parts_for("/"), &state).await.is_some());
        assert!(respond(&parts_for("/index.html"), &state).await.is_some());
    }

    #[tokio::test]
    async fn test_respond_passes_on_unresolved_and_non_html() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(test_config(dir.path(), HashMap::new()));

        assert!(respond(&parts_for("/missing.html"), &state).await.is_none());
        assert!(respond(&parts_for("/assets/app.js"), &state).await.is_none());
    }

    #[tokio::test]
    async fn test_respond_applies_rewrites_for_deep_links() {
        let dir = tempfile::tempdir().unwrap();

        let mut entries = HashMap::new();
        entries.insert(
            "app".to_string(),
            PageDefinition::Virtual(VirtualPage {
                entry: "/src/app.ts".to_string(),
                title: Some("App".to_string()),
                body: None,
            }),
        );
        let mut config = test_config(dir.path(), entries);
        config.pages.rewrites = vec![crate::routing::fallback::RewriteRule {
            from: "^/app/".to_string(),
            to: "/app.html".to_string(),
        }];
        let state = AppState::new(config);

        // Deep link without trailing slash goes through the rewrite
        let resp = respond(&parts_for("/app/users"), &state).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_respond_applies_url_transformer() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();

        let mut entries = HashMap::new();
        entries.insert(
            "about".to_string(),
            PageDefinition::Path("/about.html".to_string()),
        );
        let state = AppState::new(test_config(dir.path(), entries)).with_url_transformer(
            std::sync::Arc::new(|url: &str, _parts: &Parts| url.replace("/legacy-", "/")),
        );

        assert!(respond(&parts_for("/legacy-about.html"), &state)
            .await
            .is_some());
    }
}
