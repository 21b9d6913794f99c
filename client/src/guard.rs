//! Duplicate-submit guard.
//!
//! While a submission for a key is in flight, another submission for the same
//! key is refused. This only debounces repeated requests from one caller; the
//! ledger's own invariants are what keep the data correct.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ClientError, ClientResult};

#[derive(Clone, Default)]
pub struct SubmitGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` until the returned permit is dropped.
    pub fn acquire(&self, key: impl Into<String>) -> ClientResult<SubmitPermit> {
        let key = key.into();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.clone()) {
            return Err(ClientError::SubmitInFlight(key));
        }
        Ok(SubmitPermit {
            key,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its key on drop, whether the submission succeeded or failed.
pub struct SubmitPermit {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for SubmitPermit {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused_until_release() {
        let guard = SubmitGuard::new();
        let permit = guard.acquire("vote:1").unwrap();
        assert!(matches!(
            guard.acquire("vote:1"),
            Err(ClientError::SubmitInFlight(key)) if key == "vote:1"
        ));
        // Other keys are independent.
        let _other = guard.acquire("vote:2").unwrap();
        drop(permit);
        assert!(!guard.is_in_flight("vote:1"));
        assert!(guard.acquire("vote:1").is_ok());
    }
}
