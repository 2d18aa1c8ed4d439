//! HTTP surface: one render endpoint, everything else is a 404.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::coordinator::RequestCoordinator;

/// Query parameters accepted by the render endpoint.
#[derive(Debug, Deserialize)]
struct RenderParams {
    url: Option<String>,
}

/// Build the router: `GET /?url=…` renders; any other path or method 404s.
pub fn create_router(coordinator: Arc<RequestCoordinator>) -> Router {
    Router::new()
        // A non-GET on "/" is a 404 here, not a 405
        .route("/", get(render_pdf).fallback(not_found))
        .fallback(not_found)
        .with_state(coordinator)
}

/// Bind the listener and serve until the process exits.
pub async fn run(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Arc::new(RequestCoordinator::new(config.clone()));
    let app = create_router(coordinator);

    let addr: SocketAddr = config.listen_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("webprint listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// `GET /?url=<percent-encoded-url>` — render the target page to PDF.
async fn render_pdf(
    State(coordinator): State<Arc<RequestCoordinator>>,
    Query(params): Query<RenderParams>,
) -> Response {
    // Validate before any browser work; a missing URL must not cost a launch.
    let Some(url) = params.url.filter(|u| !u.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "URL parameter is required");
    };

    match coordinator.handle(&url).await {
        Ok(pdf) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_LENGTH, pdf.len().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=article.pdf".to_string(),
                ),
            ],
            pdf,
        )
            .into_response(),
        Err(e) => {
            error!("Error handling request: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Plain-text 404 for unmatched routes and methods.
async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found\n").into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
