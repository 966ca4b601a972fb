//! Development HTTP server that materializes virtual HTML pages.
//!
//! Pages that exist only in configuration, as a template path with
//! render-time data or an entry-module scaffold, are resolved from the
//! request path and rendered on demand. Served HTML can carry single-line
//! code injections, and
//! SPA deep links are routed through history-API fallback rewrites. Anything
//! no page claims falls through to static file serving.
//!
//! Strategy slots (the render function and the URL transformer) are plain
//! `Arc<dyn Fn>` values installed on [`config::AppState`] at construction.

pub mod config;
pub mod handler;
pub mod http;
pub mod inject;
pub mod logger;
pub mod pages;
pub mod render;
pub mod routing;
pub mod server;

pub use config::{AppState, Config, UrlTransformer};
pub use render::{RenderFn, TemplateData};
