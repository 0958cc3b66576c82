//! Thin command-line shell around the check-in engine.
//!
//! Argument parsing and wiring only; all behavior lives in `ecb-core` and
//! the SKPort adapter.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use ecb_core::{
    checkin::{Orchestrator, RunPolicy},
    config::Config,
    crypto::TokenVault,
    domain::{AccountId, GameName},
    games::GameRegistry,
    report::{Reporter, RunReport},
    store::CredentialStore,
};
use ecb_skport::SkportClient;

#[derive(Parser)]
#[command(name = "ecb", about = "Daily check-in automation for Arknights: Endfield (SKPort)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register (or refresh) an account credential.
    Register {
        /// Account label shown in reports.
        label: String,
        /// Raw session token from the SKPort web session.
        token: String,
        #[arg(long, default_value = "endfield")]
        game: String,
    },
    /// Overwrite the stored token for an account.
    ReplaceToken { id: i64, token: String },
    /// Run check-in for all enabled accounts and print the report as JSON.
    Run {
        #[arg(long, default_value = "endfield")]
        game: String,
    },
    /// List registered accounts.
    Accounts {
        #[arg(long, default_value = "endfield")]
        game: String,
    },
    /// Re-enable an account.
    Enable { id: i64 },
    /// Disable an account without deleting it.
    Disable { id: i64 },
}

/// Stand-in for the external notification collaborator: structured JSON on
/// stdout, no rendering.
struct JsonReporter;

#[async_trait::async_trait]
impl Reporter for JsonReporter {
    async fn publish(&self, report: &RunReport) -> ecb_core::Result<()> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ecb_core::logging::init("ecb")?;

    let cli = Cli::parse();
    let cfg = Arc::new(Config::load()?);

    let vault = TokenVault::from_hex_key(&cfg.encryption_key_hex)?;
    let registry = Arc::new(match &cfg.games_path {
        Some(path) => GameRegistry::load(path)?,
        None => GameRegistry::builtin(),
    });
    let store = Arc::new(CredentialStore::open(
        &cfg.store_path,
        vault,
        registry.clone(),
        cfg.disable_after_failures,
    )?);

    match cli.command {
        Command::Register { label, token, game } => {
            let account = store
                .put_account(&GameName::new(game), &label, &token)
                .await?;
            println!(
                "registered account {} ({}) with a {} token",
                account.id, account.label, account.token_kind
            );
        }
        Command::ReplaceToken { id, token } => {
            store.replace_token(AccountId(id), &token).await?;
            println!("token replaced for account {id}");
        }
        Command::Run { game } => {
            let client = Arc::new(SkportClient::new(cfg.http_timeout)?);
            let orchestrator = Orchestrator::new(
                store,
                registry,
                client,
                RunPolicy::from_config(&cfg),
            );

            let cancel = CancellationToken::new();
            let cancel_on_sigint = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_on_sigint.cancel();
                }
            });

            let report = orchestrator
                .run_with_cancel(&GameName::new(game), cancel)
                .await?;
            JsonReporter.publish(&report).await?;
        }
        Command::Accounts { game } => {
            for account in store.get_accounts(&GameName::new(game), false).await {
                let status = if account.enabled { "enabled" } else { "disabled" };
                let last = account
                    .last_checkin_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{}  {}  {}  last check-in: {}  failures: {}",
                    account.id, account.label, status, last, account.failure_count
                );
            }
        }
        Command::Enable { id } => {
            store.set_enabled(AccountId(id), true).await?;
            println!("account {id} enabled");
        }
        Command::Disable { id } => {
            store.set_enabled(AccountId(id), false).await?;
            println!("account {id} disabled");
        }
    }

    Ok(())
}
