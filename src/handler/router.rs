//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Handlers implement a
//! `(request) -> response | pass` contract and are composed here in order:
//! virtual pages, static fallthrough, 404.

use crate::config::AppState;
use crate::handler::{pages, static_files};
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, _body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&parts.method) {
        return Ok(resp);
    }

    // 2. Virtual pages, then static fallthrough, then 404
    let response = match pages::respond(&parts, &state).await {
        Some(resp) => resp,
        None => match static_files::serve(&parts, &state).await {
            Some(resp) => resp,
            None => http::build_404_response(),
        },
    };

    // 3. Access log
    if state.config.logging.access_log {
        logger::log_access(
            method.as_str(),
            &path,
            response.status().as_u16(),
            content_length(&response),
        );
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Declared body size of a response, for access logging
fn content_length(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, LoggingConfig, PagesConfig, PerformanceConfig, ServerConfig,
    };
    use crate::pages::PageDefinition;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;

    fn state_for(project_root: &Path, entries: HashMap<String, PageDefinition>) -> Arc<AppState> {
        Arc::new(AppState::new(Config {
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
        }))
    }

    fn get(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_page_then_static_then_404() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();
        fs::create_dir(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("public/app.js"), "console.log(1)").unwrap();

        let mut entries = HashMap::new();
        entries.insert(
            "about".to_string(),
            PageDefinition::Path("/about.html".to_string()),
        );
        let state = state_for(dir.path(), entries);

        // Virtual page wins
        let resp = handle_request(get("/about/"), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap().to_str().unwrap(),
            "text/html; charset=utf-8"
        );

        // Static fallthrough for non-page assets
        let resp = handle_request(get("/app.js"), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("Content-Type").unwrap().to_str().unwrap(),
            "application/javascript"
        );

        // Nothing resolves
        let resp = handle_request(get("/missing.html"), state).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_root_serves_index_page() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>Home</h1>").unwrap();

        let mut entries = HashMap::new();
        entries.insert(
            "index".to_string(),
            PageDefinition::Path("/index.html".to_string()),
        );
        let state = state_for(dir.path(), entries);

        let resp = handle_request(get("/"), state).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path(), HashMap::new());

        let req = Request::builder()
            .method(Method::POST)
            .uri("/about.html")
            .body(())
            .unwrap();
        let resp = handle_request(req, state).await.unwrap();
        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn test_options_is_answered() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path(), HashMap::new());

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .body(())
            .unwrap();
        let resp = handle_request(req, state).await.unwrap();
        assert_eq!(resp.status(), 204);
    }
}
