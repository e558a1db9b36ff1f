use std::net::SocketAddr;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client_sdk::ServiceClient;
use console_core::{
    AppHandle, BatchController, ConfigForm, ConsoleConfig, GetRegion, HealthState, ListId,
    MgetRegion, Outcome, ScanMode, ScanRegion, SetForm, SnapshotRegion,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const WEB_BIND_ENV: &str = "KVCONSOLE_WEB_BIND";
const DEFAULT_WEB_BIND: &str = "127.0.0.1:8081";

#[derive(Debug, Parser)]
#[command(name = "kvconsole")]
#[command(about = "Administrative console for the key-value storage service")]
struct Cli {
    /// Service origin; overrides KVCONSOLE_SERVICE_URL.
    #[arg(long)]
    service_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Health,
    Set {
        key: String,
        value: String,
        #[arg(long)]
        ttl: Option<String>,
    },
    Get {
        key: String,
    },
    Delete {
        key: String,
    },
    Mset {
        /// Pairs as key=value; incomplete pairs are dropped.
        #[arg(required = true, value_parser = parse_entry)]
        entries: Vec<(String, String)>,
        #[arg(long)]
        ttl: Option<String>,
    },
    Mget {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    Mdelete {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    Scan {
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long)]
        keys_only: bool,
    },
    Config,
    UpdateConfig {
        #[arg(long)]
        rocksdb_path: Option<String>,
        #[arg(long)]
        disk_store_path: Option<String>,
        #[arg(long)]
        large_value_size: Option<String>,
        #[arg(long)]
        max_disk_usage: Option<String>,
        #[arg(long)]
        eviction_check_interval: Option<String>,
        #[arg(long)]
        eviction_batch_size: Option<String>,
    },
    ServeWeb {
        /// Overrides KVCONSOLE_WEB_BIND.
        #[arg(long)]
        bind: Option<String>,
    },
}

fn parse_entry(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config = ConsoleConfig::from_env()?;
    if let Some(service_url) = cli.service_url {
        config.service_url = service_url;
    }

    match cli.command {
        Commands::ServeWeb { bind } => serve_web(config, bind).await,
        command => run_once(config, command).await,
    }
}

async fn serve_web(config: ConsoleConfig, bind: Option<String>) -> Result<()> {
    let bind = bind
        .or_else(|| std::env::var(WEB_BIND_ENV).ok())
        .unwrap_or_else(|| DEFAULT_WEB_BIND.to_string());
    let bind_addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {bind}"))?;

    let app = console_core::initialize(config).await;
    let router = web_ui::router(app);

    info!(%bind_addr, "console web interface listening");
    println!("web interface at http://{bind_addr}");
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn run_once(config: ConsoleConfig, command: Commands) -> Result<()> {
    let app = AppHandle::new(ServiceClient::new(config.service_url.clone()), config);

    match command {
        Commands::Health => {
            let state = app.health().check().await;
            println!("{}: {}", state.label(), state.detail());
            if !matches!(state, HealthState::Healthy { .. }) {
                bail!("service is not healthy");
            }
        }
        Commands::Set { key, value, ttl } => {
            let outcome = app
                .single()
                .set(SetForm {
                    key,
                    value,
                    ttl: ttl.unwrap_or_default(),
                })
                .await;
            report(outcome)?;
        }
        Commands::Get { key } => match app.single().get(key).await {
            GetRegion::Value { value, .. } => println!("{value}"),
            GetRegion::Error { message } => bail!(message),
        },
        Commands::Delete { key } => {
            report(app.single().delete(key).await)?;
        }
        Commands::Mset { entries, ttl } => {
            let batch = app.batch();
            fill_list(batch, ListId::Mset, &entries).await;
            batch.set_mset_ttl(ttl.unwrap_or_default()).await;
            report(batch.mset().await)?;
        }
        Commands::Mget { keys } => {
            let batch = app.batch();
            fill_list(batch, ListId::Mget, &key_rows(keys)).await;
            match batch.mget().await {
                MgetRegion::Entries { count, entries } => {
                    println!("获取结果 ({count} 个键):");
                    for entry in entries {
                        println!("{}\t{}", entry.key, entry.value);
                    }
                }
                MgetRegion::Error { message } => bail!(message),
            }
        }
        Commands::Mdelete { keys } => {
            let batch = app.batch();
            fill_list(batch, ListId::Mdelete, &key_rows(keys)).await;
            report(batch.mdelete().await)?;
        }
        Commands::Scan { prefix, keys_only } => {
            let mode = if keys_only {
                ScanMode::KeysOnly
            } else {
                ScanMode::Table
            };
            print_scan(app.scan().run(prefix, mode).await)?;
        }
        Commands::Config => print_snapshot(app.settings().refresh().await)?,
        Commands::UpdateConfig {
            rocksdb_path,
            disk_store_path,
            large_value_size,
            max_disk_usage,
            eviction_check_interval,
            eviction_batch_size,
        } => {
            let form = ConfigForm {
                rocksdb_path: rocksdb_path.unwrap_or_default(),
                disk_store_path: disk_store_path.unwrap_or_default(),
                large_value_size: large_value_size.unwrap_or_default(),
                max_disk_usage: max_disk_usage.unwrap_or_default(),
                eviction_check_interval: eviction_check_interval.unwrap_or_default(),
                eviction_batch_size: eviction_batch_size.unwrap_or_default(),
            };
            report(app.settings().update(form).await)?;
            print_snapshot(app.settings().view().await.snapshot)?;
        }
        Commands::ServeWeb { .. } => bail!("serve-web is not a one-shot command"),
    }

    Ok(())
}

fn key_rows(keys: Vec<String>) -> Vec<(String, String)> {
    keys.into_iter().map(|key| (key, String::new())).collect()
}

/// Loads `(key, value)` pairs into a batch list, one row each, starting with
/// the list's initial blank row.
async fn fill_list(
    batch: &BatchController<ServiceClient>,
    list: ListId,
    rows: &[(String, String)],
) {
    let first = batch.view().await.list(list).rows()[0].id;
    for (index, (key, value)) in rows.iter().enumerate() {
        let row = if index == 0 {
            first
        } else {
            batch.add_row(list).await
        };
        batch.set_key(list, row, key.as_str()).await;
        batch.set_value(list, row, value.as_str()).await;
    }
}

fn report(outcome: Outcome) -> Result<()> {
    if outcome.is_success() {
        println!("{}", outcome.text);
        Ok(())
    } else {
        bail!(outcome.text)
    }
}

fn print_scan(region: ScanRegion) -> Result<()> {
    match region {
        ScanRegion::Table { count, rows } => {
            println!("扫描结果 ({count} 个键值对):");
            for row in rows {
                println!("{}\t{}", row.key, row.value);
            }
        }
        ScanRegion::Keys { keys } => {
            println!("扫描结果 ({} 个键):", keys.len());
            for key in keys {
                println!("{key}");
            }
        }
        ScanRegion::Error { message } => bail!(message),
    }
    Ok(())
}

fn print_snapshot(region: SnapshotRegion) -> Result<()> {
    match region {
        SnapshotRegion::Loaded { pretty } => println!("{pretty}"),
        SnapshotRegion::Error { message } => bail!(message),
        SnapshotRegion::Loading => {}
    }
    Ok(())
}
