//! Client side of the ballot ledger.
//!
//! - [`LedgerConnector`] hands out read handles (no identity) and write
//!   handles (bound to a connected wallet account).
//! - [`ProposalActions`] and [`queries`] are the application surface: writes
//!   report a structured [`ActionOutcome`], reads degrade to empty answers.
//! - [`ResultSummary`] derives totals, percentages and the Yes/No outcome.
//! - [`Poller`] re-fetches on an interval and publishes only the newest answer.

pub mod actions;
pub mod assist;
pub mod config;
pub mod connector;
pub mod error;
pub mod form;
pub mod guard;
pub mod handle;
pub mod outcome;
pub mod poll;
pub mod queries;
pub mod rpc;
pub mod tally;
pub mod wallet;

pub use actions::ProposalActions;
pub use assist::{AssistError, ConfigAssistant, HttpAssistant, TemplateAssistant};
pub use config::ClientConfig;
pub use connector::LedgerConnector;
pub use error::{ClientError, ClientResult};
pub use form::{FieldError, ProposalForm, ValidProposal};
pub use guard::{SubmitGuard, SubmitPermit};
pub use handle::{Confirmation, PendingTx, ReadHandle, WriteHandle};
pub use outcome::ActionOutcome;
pub use poll::{watch_has_voted, watch_results, LatestOnly, Poller};
pub use rpc::RpcLedger;
pub use tally::{BinaryOutcome, ResultSummary, TallyLine};
pub use wallet::{StaticWallet, WalletProvider};
