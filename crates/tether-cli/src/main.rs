//! `tether`: command-line driver for a Tether network store.
//!
//! # Usage
//!
//! ```
//! tether register alice
//! tether --as alice request bob
//! tether --as bob respond alice accept
//! tether --as alice send bob "hello"
//! TETHER_AS=bob tether inbox --json
//! ```

mod app;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tether_core::{account::AccountId, connection::Decision, message::MessageId};
use tether_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tether", about = "Connections and messages for a small professional network")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "tether.toml")]
  config: PathBuf,

  /// SQLite database file; overrides the config file and environment.
  #[arg(long, value_name = "FILE", global = true)]
  store: Option<PathBuf>,

  /// The account acting on the store.
  #[arg(long = "as", value_name = "ACCOUNT", env = "TETHER_AS", global = true)]
  actor: Option<AccountId>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create a new account.
  Register { account: AccountId },
  /// Check whether the acting account may request `target`.
  Eligibility { target: AccountId },
  /// Send a connection request to `target`.
  Request { target: AccountId },
  /// Accept or reject a pending request from `requester`.
  Respond {
    requester: AccountId,
    /// `accept` or `reject`.
    decision:  Decision,
  },
  /// List pending requests addressed to the acting account.
  Incoming,
  /// List accepted connections of the acting account.
  Friends,
  /// Send a message to a connected account.
  Send { receiver: AccountId, body: String },
  /// Hide a message from the acting account's view.
  Delete { message: MessageId },
  /// List messages received by the acting account.
  Inbox,
  /// List messages sent by the acting account.
  Sent,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Settings layered from the config file and `TETHER_*` environment.
#[derive(Deserialize, Debug)]
struct CliConfig {
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("tether.db") }

fn load_config(path: &Path) -> Result<CliConfig> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("TETHER"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise CliConfig")
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let store_path = match &args.store {
    Some(path) => expand_tilde(path),
    None => expand_tilde(&load_config(&args.config)?.store_path),
  };
  tracing::debug!(store = %store_path.display(), "opening store");

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  app::run(&store, args.actor, args.command, args.json).await
}
