//! scopegate command line
//!
//! - `scopegate scopes --manifest endpoints.json [--json]` lists the scopes
//!   discovered from an endpoint manifest
//! - `scopegate migrate-keys --legacy old.json --store keys.json [--dry-run]`
//!   imports unscoped keys as unrestricted scoped keys
//! - `scopegate create-key --store keys.json --name ci --scope posts.read`
//!   issues a key and prints it once

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use scopegate_authz::discovery::render::{format_listing, summarize_grants};
use scopegate_authz::migrate::migrate_legacy_keys;
use scopegate_authz::store::InMemoryCredentialStore;
use scopegate_authz::{generate_key, EndpointRegistry};
use scopegate_core::{Blake3KeyHasher, EndpointDescriptor, GrantSet, LegacyKeyRecord, Scope};
use std::path::{Path, PathBuf};
use tracing::info;

/// scopegate CLI
#[derive(Parser)]
#[command(name = "scopegate")]
#[command(about = "Scope catalogue and API key tooling")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "SCOPEGATE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all scopes discovered from an endpoint manifest
    Scopes {
        /// JSON array of endpoint descriptors
        #[arg(short, long, env = "SCOPEGATE_MANIFEST")]
        manifest: PathBuf,

        /// Print the grouped catalogue as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import legacy unscoped keys as unrestricted scoped keys
    MigrateKeys {
        /// JSON array of legacy key records
        #[arg(long)]
        legacy: PathBuf,

        /// Scoped key store file (created if missing)
        #[arg(long, env = "SCOPEGATE_KEY_STORE")]
        store: PathBuf,

        /// Show what would be migrated without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Issue a new API key
    CreateKey {
        /// Scoped key store file (created if missing)
        #[arg(long, env = "SCOPEGATE_KEY_STORE")]
        store: PathBuf,

        /// Human-readable key name
        #[arg(long)]
        name: String,

        /// Granted scope; repeat for more. None means unrestricted
        #[arg(long = "scope")]
        scopes: Vec<String>,

        /// Expire the key after this many days
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match cli.command {
        Command::Scopes { manifest, json } => list_scopes(&manifest, json).await,
        Command::MigrateKeys {
            legacy,
            store,
            dry_run,
        } => migrate_keys(&legacy, &store, dry_run).await,
        Command::CreateKey {
            store,
            name,
            scopes,
            expires_in_days,
        } => create_key(&store, name, scopes, expires_in_days).await,
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},scopegate_authz={}", level, level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

async fn list_scopes(manifest: &Path, json: bool) -> Result<()> {
    let endpoints: Vec<EndpointDescriptor> = read_json(manifest).await?;
    let registry: EndpointRegistry = endpoints.into_iter().collect();
    info!(endpoints = registry.len(), "Loaded endpoint manifest");

    let catalogue = registry.discover();
    if json {
        println!("{}", serde_json::to_string_pretty(&catalogue)?);
    } else {
        print!("{}", format_listing(&catalogue));
    }
    Ok(())
}

async fn migrate_keys(legacy: &Path, store_path: &Path, dry_run: bool) -> Result<()> {
    let legacy_keys: Vec<LegacyKeyRecord> = read_json(legacy).await?;
    let store = InMemoryCredentialStore::load_json(store_path)
        .await
        .with_context(|| format!("loading key store {}", store_path.display()))?;

    if dry_run {
        println!("DRY RUN - no changes will be made\n");
    }

    let report = migrate_legacy_keys(legacy_keys, &store, dry_run);
    for entry in &report.entries {
        println!("{}", entry);
    }
    println!("\n{}", report.summary());

    if !dry_run && report.migrated() > 0 {
        store.save_json(store_path).await?;
        println!("\nMigrated keys have empty scopes (unrestricted access).");
        println!("Legacy keys keep working until they are revoked at the source.");
    }
    Ok(())
}

async fn create_key(
    store_path: &Path,
    name: String,
    scopes: Vec<String>,
    expires_in_days: Option<i64>,
) -> Result<()> {
    let mut grants = GrantSet::new();
    for scope in scopes {
        Scope::parse(&scope).with_context(|| format!("invalid scope '{}'", scope))?;
        grants.insert(scope);
    }

    let store = InMemoryCredentialStore::load_json(store_path).await?;
    let mut issued = generate_key(name, grants, &Blake3KeyHasher::new());

    if let Some(days) = expires_in_days {
        issued.record.expires_at = Some(expiry_after_days(Utc::now(), days)?);
    }

    let summary = format!("{}: {}", issued.record, summarize_grants(&issued.record.scopes));
    store.insert(issued.record);
    store
        .save_json(store_path)
        .await
        .with_context(|| format!("saving key store {}", store_path.display()))?;

    println!("{}", summary);
    println!("{}", issued.key);
    println!("\nStore this key now; it cannot be shown again.");
    Ok(())
}

fn expiry_after_days(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    if days <= 0 {
        bail!("--expires-in-days must be positive");
    }
    Duration::try_days(days)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .with_context(|| format!("--expires-in-days {} is out of range", days))
}
