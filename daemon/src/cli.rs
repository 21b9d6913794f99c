//! Command-line interface. Flags and environment variables override the
//! config file.

use std::path::PathBuf;

use ballot_utils::LogFormat;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ballot", version, about = "Proposal and voting ledger")]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "BALLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint of the ledger node.
    #[arg(long, env = "BALLOT_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Account to sign writes with.
    #[arg(long, env = "BALLOT_WALLET")]
    pub wallet: Option<String>,

    /// Only this account may start or close proposals.
    #[arg(long, env = "BALLOT_ADMIN")]
    pub admin: Option<String>,

    /// Endpoint of the configuration-string assistant.
    #[arg(long, env = "BALLOT_ASSISTANT_URL")]
    pub assistant_url: Option<String>,

    /// Log level or filter, e.g. "info" or "debug,ballot_ledger=trace".
    #[arg(long, env = "BALLOT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOT_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Print command output as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Operate a ledger node.
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },

    /// List proposals, active first.
    List {
        /// Only proposals created by this address.
        #[arg(long)]
        creator: Option<String>,

        /// Only active proposals.
        #[arg(long, conflicts_with = "past")]
        active: bool,

        /// Only closed proposals.
        #[arg(long)]
        past: bool,
    },

    /// Show one proposal.
    Show { id: u64 },

    /// Create a proposal.
    Propose {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Candidate name; repeat for each. Defaults to Yes and No.
        #[arg(long = "candidate")]
        candidates: Vec<String>,

        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Start a pending proposal.
    Start { id: u64 },

    /// Close an active proposal.
    Close { id: u64 },

    /// Cancel a pending proposal you created.
    Cancel { id: u64 },

    /// Vote for a candidate by name, or by index as `N` or `#N`.
    Vote { id: u64, candidate: String },

    /// Show current results.
    Results {
        id: u64,

        /// Keep polling and reprint on change until interrupted.
        #[arg(long)]
        watch: bool,
    },

    /// Check whether an address has voted on a proposal.
    HasVoted {
        id: u64,

        /// Defaults to the configured wallet.
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LedgerAction {
    /// Serve an in-process ledger over JSON-RPC.
    Run {
        #[arg(long, env = "BALLOT_LEDGER_BIND")]
        bind: Option<String>,

        #[arg(long, env = "BALLOT_LEDGER_PORT")]
        port: Option<u16>,

        /// Operator allowed to start and close proposals; repeatable.
        #[arg(long = "operator", env = "BALLOT_OPERATORS", value_delimiter = ',')]
        operators: Vec<String>,

        /// Snapshot file loaded on start and written on shutdown.
        #[arg(long, env = "BALLOT_DATA_FILE")]
        data_file: Option<PathBuf>,

        /// Keep accepting votes after a proposal's end date until it is closed.
        #[arg(long)]
        accept_votes_after_end: bool,
    },
}
