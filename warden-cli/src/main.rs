//! Warden CLI
//!
//! Command-line interface for deterministic per-user Solana wallets.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warden_api::ApiServer;
use warden_core::types::{format_sol, BalanceStatus, UserId, WalletAddress, WalletView};
use warden_crypto::{DerivationScheme, WalletDeriver};
use warden_session::{WalletSession, WardenConfig};

/// Warden - deterministic per-user Solana wallets with deposit tracking
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Settings that override the environment.
#[derive(Args)]
struct Overrides {
    /// Directory for the ledger, gate and journal files
    #[arg(long, global = true, env = "WARDEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Solana JSON-RPC endpoint
    #[arg(long, global = true, env = "SOLANA_RPC_URL")]
    rpc_url: Option<String>,

    /// Derivation scheme (keyed or legacy)
    #[arg(long, global = true, env = "WARDEN_DERIVATION")]
    derivation: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a user's deposit address (no network, no state)
    Address {
        /// User id
        user_id: String,
        /// Also print the secret material - HANDLE WITH CARE
        #[arg(long)]
        reveal: bool,
    },

    /// Check that an address belongs to a user
    Verify {
        /// User id
        user_id: String,
        /// Address to check (base58)
        address: String,
    },

    /// Run one wallet session: balance, deposit detection, notifications
    Show {
        /// User id
        user_id: String,
        /// Print the view as JSON
        #[arg(long)]
        raw: bool,
    },

    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json);

    let config = load_config(&cli.overrides)?;

    match cli.command {
        Commands::Address { user_id, reveal } => cmd_address(config, &user_id, reveal),
        Commands::Verify { user_id, address } => cmd_verify(config, &user_id, &address),
        Commands::Show { user_id, raw } => cmd_show(config, &user_id, raw).await,
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
    }
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        "warden=debug,info"
    } else {
        "warden=info,warn"
    };

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Loads the environment, then applies command-line overrides.
///
/// A missing master secret stops the process here, before any request.
fn load_config(overrides: &Overrides) -> Result<WardenConfig> {
    let mut config = WardenConfig::from_env().context("Invalid configuration")?;

    if let Some(dir) = &overrides.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &overrides.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(scheme) = &overrides.derivation {
        config.derivation = DerivationScheme::from_str(scheme).context("Invalid --derivation")?;
    }

    Ok(config)
}

fn parse_user(raw: &str) -> Result<UserId> {
    UserId::from_str(raw).with_context(|| format!("Invalid user id: {}", raw))
}

/// Print a deposit address
fn cmd_address(config: WardenConfig, user_id: &str, reveal: bool) -> Result<()> {
    let user = parse_user(user_id)?;
    let deriver = WalletDeriver::new(config.master_secret, config.derivation);
    let wallet = deriver.derive(user);

    println!("{} {}", "🔑 Wallet for user".cyan().bold(), user);
    println!("   {} {}", "Address:".green(), wallet.address);
    println!("   {} {}", "Scheme:".dimmed(), deriver.scheme());

    if reveal {
        let export = wallet.secret.export();
        println!("\n{}", "⚠️  Secret material - do not share".yellow().bold());
        println!("   {} {}", "Secret (base58):".dimmed(), export.base58);
        println!("   {} {}", "Keypair file:".dimmed(), export.json_array);
        println!("   {} {}", "Seed (hex):".dimmed(), export.seed_hex);
    }

    Ok(())
}

/// Check address ownership
fn cmd_verify(config: WardenConfig, user_id: &str, address: &str) -> Result<()> {
    let user = parse_user(user_id)?;
    let address = WalletAddress::from_str(address).context("Invalid address")?;
    let deriver = WalletDeriver::new(config.master_secret, config.derivation);

    if !deriver.verify(user, &address) {
        bail!("{} does not belong to user {} ({} scheme)", address, user, deriver.scheme());
    }

    println!("{} {} belongs to user {}", "✅".green(), address, user);
    Ok(())
}

/// Run one wallet session
async fn cmd_show(config: WardenConfig, user_id: &str, raw: bool) -> Result<()> {
    let user = parse_user(user_id)?;
    let session = WalletSession::from_config(config)
        .await
        .context("Failed to open wallet session")?;

    let view = session
        .show_wallet(user)
        .await
        .context("Wallet session failed")?;

    if raw {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }

    Ok(())
}

fn print_view(view: &WalletView) {
    println!("{}", "💼 Wallet Overview".cyan().bold());
    println!("   {} {}", "User:".dimmed(), view.user_id);
    println!("   {} {}", "Address:".green(), view.address);

    match &view.balance {
        BalanceStatus::Known {
            cumulative_lamports,
            live_lamports,
        } => {
            println!("   {} {} SOL", "Deposited:".green(), format_sol(*cumulative_lamports));
            println!("   {} {} SOL", "Live:".dimmed(), format_sol(*live_lamports));
        }
        BalanceStatus::Unavailable { reason } => {
            println!(
                "   {} {}",
                "Balance:".yellow(),
                format!("temporarily unavailable ({}), try again", reason).yellow()
            );
        }
    }

    match view.usd_equivalent {
        Some(usd) => println!("   {} ${:.2}", "Value:".green(), usd),
        None => println!("   {} {}", "Value:".dimmed(), "unknown".dimmed()),
    }

    if let Some(deposit) = &view.deposit {
        println!(
            "\n   {} {} SOL",
            "💰 New deposit:".green().bold(),
            format_sol(deposit.delta)
        );
    }

    if let Some(secret) = &view.secret {
        println!("\n{}", "⚠️  Secret material - do not share".yellow().bold());
        println!("   {} {}", "Secret (base58):".dimmed(), secret.base58);
    }
}

/// Run API server
async fn cmd_serve(config: WardenConfig, port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting Warden API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let session = WalletSession::from_config(config)
        .await
        .context("Failed to open wallet session")?;
    info!(scheme = %session.scheme(), "Session opened");

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    ApiServer::new(session).run(addr).await?;

    Ok(())
}
