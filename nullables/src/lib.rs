//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the client (clock, wallet, config
//! assistant, ledger transport) has a stand-in here that:
//! - returns deterministic values
//! - can be steered programmatically
//! - never touches the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod assistant;
pub mod clock;
pub mod ledger;
pub mod wallet;

pub use assistant::NullAssistant;
pub use clock::NullClock;
pub use ledger::{FlakyLedger, UnreachableLedger};
pub use wallet::NullWallet;
