// Configuration types module
// Defines all configuration-related data structures

use crate::inject::InjectionRule;
use crate::pages::PageDefinition;
use crate::render::TemplateData;
use crate::routing::fallback::RewriteRule;
use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub pages: PagesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public base prefix stripped from request paths, empty for none
    #[serde(default)]
    pub root: String,
    /// Static fallthrough directory, relative to the project root
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// Template and scan root; the working directory when unset
    #[serde(default)]
    pub project_root: Option<String>,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

/// Performance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
}

/// Virtual page configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Explicit page table; absent triggers filesystem auto-discovery
    pub entries: Option<HashMap<String, PageDefinition>>,
    /// Page served for `/` and `/index.html`
    pub index_page: String,
    /// Data merged into every page's render input (page data wins)
    pub data: TemplateData,
    /// Glob patterns unioned with the built-in default during scanning
    pub extra_glob_patterns: Vec<String>,
    /// Register basename-only aliases for scanned pages
    pub basename_alias: bool,
    /// Injection rules keyed by HTML filename or `*`
    pub inject: HashMap<String, InjectionRule>,
    /// History-API fallback rules, passed to the rewrite module untouched
    pub rewrites: Vec<RewriteRule>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            entries: None,
            index_page: default_index_page(),
            data: TemplateData::new(),
            extra_glob_patterns: Vec::new(),
            basename_alias: false,
            inject: HashMap::new(),
            rewrites: Vec::new(),
        }
    }
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_index_page() -> String {
    "index".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_config_defaults() {
        let pages = PagesConfig::default();
        assert_eq!(pages.index_page, "index");
        assert!(pages.entries.is_none());
        assert!(!pages.basename_alias);
    }

    #[test]
    fn test_pages_section_deserializes_from_toml() {
        let toml = r#"
            index_page = "home"
            extra_glob_patterns = ["pages/**/*.html"]

            [entries.about]
            template = "/about.html"

            [entries.app]
            entry = "/src/app.ts"
            title = "App"

            [data]
            lang = "en"

            [inject."*"]
            pos = "after"
            find = "<head>"
            replacement = "<meta name=\"injected\">"

            [[rewrites]]
            from = "^/app/"
            to = "/app.html"
        "#;
        let pages: PagesConfig = toml::from_str(toml).unwrap();
        assert_eq!(pages.index_page, "home");
        let entries = pages.entries.unwrap();
        assert!(matches!(entries["about"], PageDefinition::Template(_)));
        assert!(matches!(entries["app"], PageDefinition::Virtual(_)));
        assert_eq!(pages.rewrites.len(), 1);
        assert!(pages.inject.contains_key("*"));
    }
}
