//! JSON-RPC server for a ballot ledger node.
//!
//! Provides endpoints for:
//! - Proposal, candidate and result reads
//! - Vote-status checks
//! - Transaction submission and confirmation
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::RpcServer;
