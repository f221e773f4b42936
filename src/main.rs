//! Profile console binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────┐
//!                 │                PROFILE CONSOLE                 │
//!                 │                                                │
//!   Operator      │  ┌─────────┐   ┌─────────┐   ┌──────────────┐ │
//!   ──────────────┼─▶│ console │──▶│ session │──▶│    wallet    │─┼──▶ chain
//!                 │  │  REPL   │   │ machine │   │(slot-injected│ │
//!                 │  └────┬────┘   └─────────┘   │  provider)   │ │
//!                 │       │                      └──────▲───────┘ │
//!                 │       │        ┌─────────┐          │         │
//!                 │       ├───────▶│executor │──────────┘         │
//!                 │       │        └─────────┘                    │
//!                 │       │        ┌─────────┐                    │
//!                 │       └───────▶│   abi   │──▶ artifact        │
//!                 │                │resolver │    locations       │
//!                 │                └─────────┘                    │
//!                 └────────────────────────────────────────────────┘
//! ```
//!
//! Startup: discovery window, one artifact resolution, then the command
//! loop. A signing key in the environment populates the provider slot; with
//! no key the console still runs, reporting provider absence on connect.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use profile_console::abi::{AbiResolver, AbiTransport, FileTransport, HttpTransport};
use profile_console::config::ConsoleConfig;
use profile_console::console::{Console, TerminalNotifier};
use profile_console::notify::Notifier;
use profile_console::ops::Executor;
use profile_console::session::Session;
use profile_console::wallet::rpc::PRIVATE_KEY_ENV_VAR;
use profile_console::wallet::{ProviderSlot, RpcWallet};

#[derive(Debug, Parser)]
#[command(
    name = "profile-console",
    version,
    about = "Operator console for a UserProfile contract"
)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the JSON-RPC endpoint.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override the default contract address for `load`.
    #[arg(long)]
    contract: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_console=info,notify=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(rpc_url) = args.rpc_url {
        config.wallet.rpc_url = rpc_url;
    }
    if let Some(contract) = args.contract {
        config.contract.address = Some(contract);
    }

    tracing::info!(
        rpc_url = %config.wallet.rpc_url,
        discovery_window_ms = config.discovery.window_ms,
        abi_candidates = config.abi.candidates.len(),
        "Configuration loaded"
    );

    let rpc_url: Url = config.wallet.parsed_rpc_url()?;

    let slot = Arc::new(ProviderSlot::new());
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);
    let session = Arc::new(Session::new(slot.clone(), notifier.clone()));
    let executor = Executor::new(session.clone(), notifier.clone());

    // A key in the environment stands in for an installed wallet. Running
    // without one is fine; connect reports the absence.
    match std::env::var(PRIVATE_KEY_ENV_VAR) {
        Ok(_) => match RpcWallet::from_env(rpc_url, config.wallet.rpc_timeout()) {
            Ok(wallet) => slot.inject(Arc::new(wallet)),
            Err(e) => {
                tracing::warn!(error = %e, "Signing key present but unusable; provider slot stays empty");
            }
        },
        Err(_) => {
            tracing::info!(
                env_var = PRIVATE_KEY_ENV_VAR,
                "No signing key in the environment; provider slot stays empty"
            );
        }
    }

    let transport: Arc<dyn AbiTransport> = match &config.abi.base_url {
        Some(base) => Arc::new(HttpTransport::new(Some(base.parse()?))),
        None => Arc::new(FileTransport::new(config.abi.artifact_root.clone())),
    };
    let resolver = AbiResolver::new(transport, config.abi.candidates.clone());

    let console = Console::new(config, session, executor, resolver, notifier);
    console.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
