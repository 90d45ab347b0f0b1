//! Server side: an `axum` router that answers peer requests.

use crate::error::CacheError;
use crate::group;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

/// Builds a router answering `GET {base_path}/:group/:key`.
///
/// An unknown group is a 404, a loader error is a 500 with the error's
/// message as the body, and success is a 200 with the raw bytes as an
/// `application/octet-stream` body. The caller mounts this under whatever
/// base path it was built with, e.g.:
///
/// ```ignore
/// let app = Router::new().nest("/_geecache", shardcache::transport::router());
/// ```
pub fn router() -> Router {
    Router::new().route("/:group/:key", get(handle_get))
}

async fn handle_get(Path((group_name, key)): Path<(String, String)>) -> Response {
    let Some(group) = group::get_group(&group_name) else {
        let err = CacheError::NoSuchGroup(group_name);
        return (StatusCode::NOT_FOUND, err.to_string()).into_response();
    };

    match group.get(&key) {
        Ok(view) => (
            StatusCode::OK,
            [("content-type", "application/octet-stream")],
            view.to_vec(),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
