//! Prometheus metrics for the RPC server.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::error::RpcError;

pub struct RpcMetrics {
    pub registry: Registry,

    /// Requests handled, by action.
    pub requests: IntCounterVec,
    /// Requests answered with an error, by action.
    pub errors: IntCounterVec,

    pub block_height: IntGauge,
    pub pending_transactions: IntGauge,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, RpcError> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("ballot_rpc_requests_total", "Total RPC requests handled"),
            &["action"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let errors = IntCounterVec::new(
            Opts::new("ballot_rpc_errors_total", "Total RPC requests answered with an error"),
            &["action"],
        )?;
        registry.register(Box::new(errors.clone()))?;

        let block_height = IntGauge::new("ballot_ledger_block_height", "Current ledger block height")?;
        registry.register(Box::new(block_height.clone()))?;

        let pending_transactions = IntGauge::new(
            "ballot_ledger_pending_transactions",
            "Submitted transactions not yet mined",
        )?;
        registry.register(Box::new(pending_transactions.clone()))?;

        Ok(Self {
            registry,
            requests,
            errors,
            block_height,
            pending_transactions,
        })
    }

    pub fn encode(&self) -> Result<String, RpcError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
