//! semkb binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite knowledge base and either serves the JSON API, ingests annotated
//! sentences, runs a one-off query or wipes the store.
//!
//! ```text
//! semkb ingest corpus.jsonl
//! semkb query --entity Barak --frame Being_born
//! semkb serve
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use semkb_core::{query::RetrievalQuery, store::KnowledgeStore};
use semkb_server::{ServerConfig, ingest, render};
use semkb_store_sqlite::SqliteStore;
use tokio::{
  io::{AsyncBufRead, BufReader},
  net::TcpListener,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Semantic knowledge-base retrieval")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API over HTTP.
  Serve,
  /// Ingest annotated sentences from a JSON Lines file (`-` for stdin).
  Ingest { file: PathBuf },
  /// Retrieve sentences by entity, optionally narrowed by frame.
  Query {
    #[arg(short, long = "entity", required = true)]
    entities: Vec<String>,
    #[arg(short, long = "frame")]
    frames:   Vec<String>,
  },
  /// Delete every sentence, entity, heading and frame.
  Reset {
    /// Confirm the reset.
    #[arg(long)]
    yes: bool,
  },
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
  let cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open_with_config(&cfg.store_path, cfg.retrieval.clone())
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command {
    Command::Serve => serve(&cfg, store).await,
    Command::Ingest { file } => {
      let reader: Box<dyn AsyncBufRead + Unpin> = if file.as_os_str() == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
      } else {
        let f = tokio::fs::File::open(&file)
          .await
          .with_context(|| format!("failed to open {file:?}"))?;
        Box::new(BufReader::new(f))
      };
      let summary = ingest::ingest_lines(&store, reader).await?;
      println!("ingested {} records ({} sentences)", summary.records, summary.sentences);
      Ok(())
    }
    Command::Query { entities, frames } => {
      let query = RetrievalQuery::new(entities, frames);
      let hits = store.query(&query).await.context("query failed")?;
      print!("{}", render::render_results(&store, &hits).await?);
      Ok(())
    }
    Command::Reset { yes } => {
      if !yes {
        anyhow::bail!("refusing to reset without --yes");
      }
      store.truncate().await.context("failed to reset store")?;
      tracing::info!(path = ?cfg.store_path, "store reset");
      Ok(())
    }
  }
}

async fn serve(cfg: &ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let app = semkb_server::app(Arc::new(store));
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}
