use crate::snapshot::SnapshotStore;
use anyhow::Context;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use serde_json::json;
use std::future::Future;
use tokio::net::TcpListener;

pub const STANDINGS_ROUTE: &str = "/api/standings";

pub fn router(store: SnapshotStore) -> Router {
    Router::new()
        .route(STANDINGS_ROUTE, get(get_standings))
        .with_state(store)
}

/// Serves until `shutdown` resolves.
pub async fn serve(
    addr: &str,
    store: SnapshotStore,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!("serving standings at http://{addr}{STANDINGS_ROUTE}");
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed")
}

/// The snapshot file, verbatim.
async fn get_standings(State(store): State<SnapshotStore>) -> Response {
    match store.read_raw().await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Ok(None) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "standings have not been computed yet" })),
        )
            .into_response(),
        Err(e) => {
            error!("{e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "could not read standings" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn call(store: SnapshotStore, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = router(store)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    #[tokio::test]
    async fn serves_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standings_cache.json");
        // Not reformatted on the way out.
        let payload = b"{\"standings\":  [],\n \"bracket\": null}";
        std::fs::write(&path, payload).unwrap();

        let (status, content_type, body) = call(SnapshotStore::new(path), STANDINGS_ROUTE).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, payload.to_vec());
    }

    #[tokio::test]
    async fn missing_snapshot_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("standings_cache.json"));

        let (status, _, body) = call(store, STANDINGS_ROUTE).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn unreadable_snapshot_is_a_server_error() {
        // A directory where the file should be.
        let dir = tempfile::tempdir().unwrap();
        let (status, _, _) = call(SnapshotStore::new(dir.path()), STANDINGS_ROUTE).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn other_routes_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("standings_cache.json"));
        let (status, _, _) = call(store, "/api/bracket").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
