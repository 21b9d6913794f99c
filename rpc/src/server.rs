//! Axum-based RPC server.
//!
//! `POST /` takes an action-tagged JSON request and answers with
//! `{"result": ...}` or `{"error": ...}`. `GET /metrics` serves Prometheus text.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ballot_ledger::MemoryLedger;
use ballot_types::RpcResponse;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::RpcMetrics;

struct RpcState {
    ledger: Arc<MemoryLedger>,
    metrics: RpcMetrics,
}

pub struct RpcServer {
    state: Arc<RpcState>,
}

impl RpcServer {
    pub fn new(ledger: Arc<MemoryLedger>) -> Result<Self, RpcError> {
        Ok(Self {
            state: Arc::new(RpcState {
                ledger,
                metrics: RpcMetrics::new()?,
            }),
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_rpc))
            .route("/metrics", get(handle_metrics))
            .with_state(Arc::clone(&self.state))
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "RPC server listening");
        }
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("RPC server stopped");
        Ok(())
    }
}

async fn handle_rpc(State(state): State<Arc<RpcState>>, body: Bytes) -> Json<RpcResponse> {
    let (action, response) = match handlers::parse(&body) {
        Ok(request) => {
            let action = request.action();
            debug!(action, "rpc request");
            (action, handlers::dispatch(state.ledger.as_ref(), request).await)
        }
        Err(error) => ("invalid", RpcResponse::Error(error)),
    };

    let metrics = &state.metrics;
    metrics.requests.with_label_values(&[action]).inc();
    if let RpcResponse::Error(error) = &response {
        metrics.errors.with_label_values(&[action]).inc();
        debug!(action, %error, "rpc request refused");
    }
    metrics.block_height.set(i64::try_from(state.ledger.block_height()).unwrap_or(i64::MAX));
    metrics
        .pending_transactions
        .set(i64::try_from(state.ledger.pending_count()).unwrap_or(i64::MAX));

    Json(response)
}

async fn handle_metrics(State(state): State<Arc<RpcState>>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
