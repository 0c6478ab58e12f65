//! Route handlers.

use super::Receiver;
use crate::notification::AlertNotification;
use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, State};
use axum::http::{Method, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, warn};

/// Builds the receiver's routes.
pub fn router(receiver: Arc<Receiver>) -> Router {
    Router::new()
        .route("/", get(view_issues))
        .route(
            "/v1/receiver",
            post(receive_notification).fallback(method_not_allowed),
        )
        .with_state(receiver)
}

/// Handles an Alertmanager notification.
///
/// Once the payload decodes the answer is always 200: the webhook protocol has no
/// way to report a failed reconciliation, and Alertmanager resends on its own
/// schedule anyway.
async fn receive_notification(
    State(receiver): State<Arc<Receiver>>,
    remote: Option<ConnectInfo<SocketAddr>>,
    body: Body,
) -> StatusCode {
    let remote = remote_addr(remote);

    let bytes = match to_bytes(body, receiver.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(remote = %remote, error = %e, "Failed to read request body");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let notification = match AlertNotification::decode(&bytes) {
        Ok(notification) => notification,
        Err(e) => {
            warn!(remote = %remote, error = %e, "Failed to parse webhook message");
            return StatusCode::BAD_REQUEST;
        }
    };

    // Already logged and tallied by `handle`.
    let _ = receiver.handle(&notification).await;
    StatusCode::OK
}

async fn method_not_allowed(method: Method, remote: Option<ConnectInfo<SocketAddr>>) -> StatusCode {
    warn!(method = %method, remote = %remote_addr(remote), "Client used unsupported method");
    StatusCode::METHOD_NOT_ALLOWED
}

/// Renders the open issues as an HTML table.
async fn view_issues(State(receiver): State<Arc<Receiver>>) -> Html<String> {
    let summary = receiver.summary();

    let page = match receiver.directory.list_open_issues().await {
        Ok(issues) => receiver
            .renderer
            .render_issue_viewer(&issues, None, &summary),
        Err(e) => {
            warn!(error = %e, "Failed to list issues for viewer");
            receiver
                .renderer
                .render_issue_viewer(&[], Some(&e.to_string()), &summary)
        }
    };

    Html(page.unwrap_or_else(|e| e.to_string()))
}

fn remote_addr(remote: Option<ConnectInfo<SocketAddr>>) -> String {
    remote.map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{IssueDirectory, MemoryDirectory};
    use crate::templates::TemplateRenderer;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    const FIRING: &str = r#"{
        "version": "4",
        "groupKey": "{}:{alertname=\"DiskFull\"}",
        "status": "firing",
        "groupLabels": {"alertname": "DiskFull"},
        "externalURL": "http://localhost:9093"
    }"#;

    fn app(directory: &Arc<MemoryDirectory>) -> (Router, Arc<Receiver>) {
        let directory: Arc<dyn IssueDirectory> = directory.clone();
        let receiver = Arc::new(
            Receiver::new(directory, Arc::new(TemplateRenderer::new())).with_identity_locks(true),
        );
        (router(receiver.clone()), receiver)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/receiver")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn get_on_receiver_is_not_allowed() {
        let directory = Arc::new(MemoryDirectory::new());
        let (app, _) = app(&directory);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/v1/receiver")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(directory.create_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let directory = Arc::new(MemoryDirectory::new());
        let (app, receiver) = app(&directory);

        let response = app.oneshot(post_json("{\"groupKey\": ")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(receiver.summary().total(), 0);
    }

    #[tokio::test]
    async fn oversized_body_is_internal_error() {
        let directory = Arc::new(MemoryDirectory::new());
        let directory_dyn: Arc<dyn IssueDirectory> = directory.clone();
        let receiver = Arc::new(
            Receiver::new(directory_dyn, Arc::new(TemplateRenderer::new())).with_max_body_bytes(16),
        );

        let response = router(receiver).oneshot(post_json(FIRING)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(directory.create_calls(), 0);
    }

    #[tokio::test]
    async fn firing_notification_creates_issue() {
        let directory = Arc::new(MemoryDirectory::new());
        let (app, receiver) = app(&directory);

        let response = app.oneshot(post_json(FIRING)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(directory.create_calls(), 1);
        assert_eq!(
            directory.open_issues()[0].title,
            "[{}:{alertname=\"DiskFull\"}] DiskFull"
        );
        assert_eq!(receiver.summary().created, 1);
    }

    #[tokio::test]
    async fn reconcile_failure_still_returns_ok() {
        let directory = Arc::new(MemoryDirectory::new());
        let (app, receiver) = app(&directory);

        let body = FIRING.replace("\"firing\"", "\"pending\"");
        let response = app.clone().oneshot(post_json(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        directory.set_unavailable(true);
        let response = app.oneshot(post_json(FIRING)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(receiver.summary().failed, 2);
        assert_eq!(directory.create_calls(), 0);
    }

    #[tokio::test]
    async fn viewer_lists_open_issues() {
        let directory = Arc::new(MemoryDirectory::new());
        directory.seed_open_issue("[{}:{alertname=\"DiskFull\"}] DiskFull");
        let (app, _) = app(&directory);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("<a href=\"memory://issues/1\">"));
        assert!(page.contains("DiskFull&quot;}] DiskFull"));
    }

    #[tokio::test]
    async fn viewer_renders_errors_inline() {
        let directory = Arc::new(MemoryDirectory::new());
        directory.set_unavailable(true);
        let (app, _) = app(&directory);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("Issue tracker unavailable"));
    }
}
