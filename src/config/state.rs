// Application state module
// Read-only runtime state shared across request tasks

use std::path::PathBuf;
use std::sync::Arc;

use super::types::Config;
use crate::logger::Warnings;
use crate::pages::{scan, PageTable};
use crate::render::{self, RenderFn};
use crate::routing::fallback::{self, CompiledRewrite};

/// Pluggable URL transformer: `(effective_url, request_parts) -> url`
pub type UrlTransformer =
    Arc<dyn Fn(&str, &hyper::http::request::Parts) -> String + Send + Sync>;

/// Application state.
///
/// Built once at startup and treated as read-only for the remainder of the
/// process lifetime; request tasks share it behind one `Arc` and never take
/// a lock.
pub struct AppState {
    pub config: Config,
    pub pages: PageTable,
    pub project_root: PathBuf,
    pub rewrites: Vec<CompiledRewrite>,
    pub warnings: Warnings,
    pub default_render: RenderFn,
    pub global_render: Option<RenderFn>,
    pub url_transformer: Option<UrlTransformer>,
}

impl AppState {
    /// Build state from configuration: resolve the project root, build the
    /// page table (explicit entries or filesystem scan), compile rewrite
    /// rules, and install the built-in render strategy.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let warnings = Warnings::new();
        let project_root = config
            .server
            .project_root
            .clone()
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let pages = scan::build_table(
            config.pages.entries.as_ref(),
            &config.pages.extra_glob_patterns,
            &project_root,
            config.pages.basename_alias,
        );
        let rewrites = fallback::compile_rewrites(&config.pages.rewrites);
        let default_render = render::default_renderer(warnings.clone());

        Self {
            config,
            pages,
            project_root,
            rewrites,
            warnings,
            default_render,
            global_render: None,
            url_transformer: None,
        }
    }

    /// Install a global render strategy overriding the built-in default
    #[must_use]
    pub fn with_render(mut self, render: RenderFn) -> Self {
        self.global_render = Some(render);
        self
    }

    /// Install a URL transformer applied ahead of page resolution
    #[must_use]
    pub fn with_url_transformer(mut self, transformer: UrlTransformer) -> Self {
        self.url_transformer = Some(transformer);
        self
    }

    /// Configured public base prefix, `None` when unset
    #[must_use]
    pub fn root_prefix(&self) -> Option<&str> {
        if self.config.server.root.is_empty() {
            None
        } else {
            Some(&self.config.server.root)
        }
    }
}
