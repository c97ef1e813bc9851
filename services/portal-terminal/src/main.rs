//! Terminal host for the wave portal. Lists, sends and follows waves through
//! a JSON-RPC node whose unlocked account signs.

mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{info, warn};
use wp_contract_client::config::CONTRACT_ADDRESS_VAR;
use wp_contract_client::{PortalConfig, TokioDelay, WavePortalContract};
use wp_portal_core::PortalController;
use wp_wallet_bridge::{DEFAULT_RPC_URL, HttpProvider, WalletBridge};

type TerminalController = PortalController<Rc<HttpProvider>, WavePortalContract<Rc<HttpProvider>, TokioDelay>>;

/// Wave at the portal contract from a terminal.
#[derive(Debug, Parser)]
#[command(name = "portal-terminal", version)]
struct Cli {
    /// JSON-RPC endpoint of the node.
    #[arg(long, env = "WAVE_PORTAL_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Contract address. Takes precedence over WAVE_PORTAL_CONTRACT_ADDRESS.
    #[arg(long)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every wave recorded on the contract.
    List {
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Send a wave and wait until it is mined.
    Wave {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Print new waves as they are mined, until Ctrl-C.
    Watch,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let contract_override = cli.contract.clone();
    let config = PortalConfig::from_lookup(|key| {
        if key == CONTRACT_ADDRESS_VAR && contract_override.is_some() {
            return contract_override.clone();
        }
        std::env::var(key).ok()
    })
    .context("invalid wave portal configuration")?;

    let provider = Rc::new(HttpProvider::new(Some(cli.rpc_url)));
    info!("using node {} and contract {}", provider.endpoint(), config.contract_address);

    let contract = WavePortalContract::connect(provider.clone(), &config, TokioDelay)
        .context("failed to bind the wave portal contract")?;
    let controller = PortalController::new(WalletBridge::new(provider), contract)
        .with_event_dedupe(config.dedupe_live_events);

    match cli.command {
        Command::List { json } => list(&controller, json).await,
        Command::Wave { message } => wave(&controller, &message.join(" ")).await,
        Command::Watch => watch(&controller, &config).await,
    }
}

async fn list(controller: &TerminalController, json: bool) -> anyhow::Result<()> {
    controller.load_waves().await.context("failed to load waves")?;
    let waves = controller.waves();

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &waves)?;
        writeln!(out)?;
    } else {
        render::write_waves(&mut out, &waves)?;
    }
    Ok(())
}

async fn wave(controller: &TerminalController, message: &str) -> anyhow::Result<()> {
    controller.mount().await;
    if controller.current_account().is_none() {
        controller
            .connect_wallet()
            .await
            .context("the node has no account to sign with")?;
    }

    let receipt = controller.submit_wave(message).await.context("wave failed")?;
    controller.unmount();

    let mut out = io::stdout().lock();
    match receipt.block_number {
        Some(block) => writeln!(out, "Mined {} in block {}\n", receipt.tx_hash, block)?,
        None => writeln!(out, "Mined {}\n", receipt.tx_hash)?,
    }
    render::write_waves(&mut out, &controller.waves())?;
    Ok(())
}

async fn watch(controller: &TerminalController, config: &PortalConfig) -> anyhow::Result<()> {
    controller.mount().await;
    if controller.current_account().is_none() {
        controller.load_waves().await.context("failed to load waves")?;
    }
    render::write_waves(&mut io::stdout().lock(), &controller.waves())?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(config.poll_interval) => {}
        }

        let before = controller.waves().len();
        match controller.poll_events().await {
            Ok(0) => {}
            Ok(_) => {
                let waves = controller.waves();
                let mut out = io::stdout().lock();
                for record in waves.iter().skip(before) {
                    render::write_wave(&mut out, record)?;
                }
            }
            Err(err) => warn!("event poll failed: {}", err),
        }
    }

    controller.unmount();
    info!("stopped watching");
    Ok(())
}
