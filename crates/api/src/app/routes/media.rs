//! Static media serving under `/media/`.
//!
//! Files are read from `media_root`; the request path is sanitized so a
//! crafted path can never escape that directory. Rejections read as 404.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::app::{errors, services::AppServices};

/// GET /media/{path}.
pub async fn serve(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): Path<String>,
) -> axum::response::Response {
    let Some(relative) = sanitize_path(&path) else {
        return errors::hidden_not_found();
    };

    let full = PathBuf::from(&services.config.media_root).join(&relative);
    match tokio::fs::read(&full).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type(&relative))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %full.display(), "media read failed: {e}");
            }
            errors::hidden_not_found()
        }
    }
}

/// Reduce a request path to a safe relative path, or reject it.
///
/// Rejects empty paths, absolute paths, backslashes, NUL bytes and any `..`
/// segment. Empty segments (`a//b`) are dropped.
fn sanitize_path(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.contains('\\') || raw.contains('\0') || raw.starts_with('/') {
        return None;
    }

    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

fn content_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_relative_paths() {
        assert_eq!(
            sanitize_path("listings/42/photo.jpg").as_deref(),
            Some("listings/42/photo.jpg")
        );
    }

    #[test]
    fn collapses_empty_and_dot_segments() {
        assert_eq!(sanitize_path("a//b/./c.png").as_deref(), Some("a/b/c.png"));
    }

    #[test]
    fn rejects_traversal_and_absolutes() {
        assert_eq!(sanitize_path("../etc/passwd"), None);
        assert_eq!(sanitize_path("a/../../b"), None);
        assert_eq!(sanitize_path("/etc/passwd"), None);
        assert_eq!(sanitize_path("a\\b"), None);
        assert_eq!(sanitize_path("a\0b"), None);
        assert_eq!(sanitize_path(""), None);
        assert_eq!(sanitize_path("./."), None);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type("x/photo.JPG"), "image/jpeg");
        assert_eq!(content_type("x/plan.pdf"), "application/pdf");
        assert_eq!(content_type("x/blob"), "application/octet-stream");
    }

    #[test]
    fn script_capable_types_are_not_inferred() {
        // SVG can carry script; it is served as an opaque download.
        assert_eq!(content_type("x/logo.svg"), "application/octet-stream");
        assert_eq!(content_type("x/page.html"), "application/octet-stream");
    }
}
