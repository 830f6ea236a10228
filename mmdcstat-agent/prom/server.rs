use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::prom::MmdcMetricExporter;

async fn metrics_handler(State(exporter): State<Arc<MmdcMetricExporter>>) -> impl IntoResponse {
    let content_type = TextEncoder::new().format_type().to_string();
    match exporter.encode() {
        Ok(body) => (StatusCode::OK, [("Content-Type", content_type)], body),
        Err(e) => {
            tracing::error!("Failed to encode MMDC metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", content_type)],
                String::new(),
            )
        }
    }
}

pub fn router(exporter: Arc<MmdcMetricExporter>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(exporter)
}

/// Serve `/metrics` until `cancel` fires
pub async fn serve(
    addr: SocketAddr,
    exporter: Arc<MmdcMetricExporter>,
    cancel: CancellationToken,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Serving Prometheus metrics on {}", listener.local_addr()?);

    axum::serve(listener, router(exporter))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    tracing::info!("Metrics server stopped");
    Ok(())
}
