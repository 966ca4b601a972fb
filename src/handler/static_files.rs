//! Static file fallthrough
//!
//! Requests no virtual page claims are served from the configured public
//! directory, with MIME detection and canonicalization-based protection
//! against path traversal.

use crate::config::AppState;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{Method, Response};
use std::path::Path;
use tokio::fs;

/// Serve the request path from the public directory, `None` when no file
/// backs it.
pub async fn serve(parts: &Parts, state: &AppState) -> Option<Response<Full<Bytes>>> {
    let public_root = state.project_root.join(&state.config.server.public_dir);
    let (content, content_type) =
        load_from_directory(&public_root, parts.uri.path(), state.root_prefix()).await?;

    let is_head = parts.method == Method::HEAD;
    Some(http::build_file_response(content, content_type, is_head))
}

/// Load a file from `public_root` with index resolution for directories
async fn load_from_directory(
    public_root: &Path,
    path: &str,
    root_prefix: Option<&str>,
) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash and prevent directory traversal
    let clean_path = path.trim_start_matches('/').replace("..", "");

    // Remove the configured base prefix from the path
    let prefix_clean = root_prefix.unwrap_or("").trim_matches('/');
    let relative_path = if prefix_clean.is_empty() {
        clean_path.as_str()
    } else {
        clean_path
            .strip_prefix(&format!("{prefix_clean}/"))
            .unwrap_or(&clean_path)
    };

    let mut file_path = public_root.join(relative_path);

    // A missing public directory is normal for a pure virtual-page setup
    let public_canonical = public_root.canonicalize().ok()?;

    // Directory requests resolve to their index file
    if file_path.is_dir() || relative_path.is_empty() || relative_path.ends_with('/') {
        file_path = file_path.join("index.html");
    }

    // File not found is common (404), no need to log at warning level
    let file_canonical = file_path.canonicalize().ok()?;
    if !file_canonical.starts_with(&public_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_canonical.display()
        ));
        return None;
    }

    let content = fs::read(&file_canonical).await.ok()?;
    let content_type =
        mime::get_content_type(file_canonical.extension().and_then(|e| e.to_str()));
    Some((content, content_type))
}
