//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}
