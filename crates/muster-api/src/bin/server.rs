//! muster-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store and a filesystem evidence store, and serves the
//! attendance API over HTTP.
//!
//! # Seeding the crew directory
//!
//! ```
//! cargo run -p muster-api --bin server -- --seed crew.json
//! ```
//!
//! where `crew.json` is `[{"name": "...", "code": "..."}, ...]`. The import
//! upserts by code, so it can be re-run after roster changes.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use muster_api::ServerConfig;
use muster_core::{engine::Engine, person::NewPerson, window::reference_offset};
use muster_evidence::FsEvidenceStore;
use muster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Muster attendance server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Import persons from a JSON file into the directory and exit.
  #[arg(long)]
  seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MUSTER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let evidence = FsEvidenceStore::new(
    server_cfg.evidence_dir.clone(),
    server_cfg.evidence_base_url.clone(),
  )
  .with_context(|| {
    format!("failed to open evidence dir {:?}", server_cfg.evidence_dir)
  })?;

  let offset = reference_offset(server_cfg.utc_offset_hours)
    .context("invalid utc_offset_hours")?;

  let engine = Arc::new(Engine::new(
    Arc::new(store),
    Some(Arc::new(evidence)),
    offset,
  ));

  if let Some(seed_path) = cli.seed {
    return seed_directory(&engine, &seed_path).await;
  }

  let app = muster_api::api_router(engine).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Import persons from a JSON seed file, upserting by code.
async fn seed_directory(
  engine: &Engine<SqliteStore, FsEvidenceStore>,
  path: &Path,
) -> anyhow::Result<()> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read seed file {path:?}"))?;
  let entries: Vec<NewPerson> =
    serde_json::from_str(&raw).context("failed to parse seed file")?;

  let total = entries.len();
  for entry in entries {
    let person = engine
      .enroll(&entry.name, &entry.code)
      .await
      .with_context(|| format!("failed to enroll {:?}", entry.name))?;
    tracing::info!(name = %person.name, code = %person.code, "enrolled");
  }
  tracing::info!(total, "seed import finished");

  Ok(())
}
