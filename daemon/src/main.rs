//! `ballot`: run a dev ledger node, or drive proposals against one.

mod cli;
mod commands;
mod config;
mod node;

use anyhow::Context;
use ballot_types::Address;
use ballot_utils::init_logging;
use clap::Parser;

use crate::cli::{Cli, Command, LedgerAction};
use crate::commands::App;
use crate::config::DaemonConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    apply_global_overrides(&mut config, &cli);
    init_logging(config.logging.format, &config.logging.level);
    if let Some(path) = &cli.config {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    match cli.command {
        Command::Ledger {
            action:
                LedgerAction::Run {
                    bind,
                    port,
                    operators,
                    data_file,
                    accept_votes_after_end,
                },
        } => {
            let mut node = config.ledger;
            if let Some(bind) = bind {
                node.bind = bind;
            }
            if let Some(port) = port {
                node.port = port;
            }
            if !operators.is_empty() {
                node.policy.operators = operators
                    .iter()
                    .map(|raw| Address::parse(raw))
                    .collect::<Result<_, _>>()
                    .context("invalid --operator")?;
            }
            if data_file.is_some() {
                node.data_file = data_file;
            }
            node.policy.accept_votes_after_end |= accept_votes_after_end;
            node::run(node).await
        }
        command => App::new(config.client, cli.json)?.run(command).await,
    }
}

/// CLI flags and environment variables win over the config file.
fn apply_global_overrides(config: &mut DaemonConfig, cli: &Cli) {
    if let Some(url) = &cli.rpc_url {
        config.client.rpc_url = url.clone();
    }
    if let Some(wallet) = &cli.wallet {
        config.client.wallet_address = Some(wallet.clone());
    }
    if let Some(admin) = &cli.admin {
        config.client.admin_address = Some(admin.clone());
    }
    if let Some(url) = &cli.assistant_url {
        config.client.assistant_url = Some(url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
}
