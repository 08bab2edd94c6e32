use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ragdesk_core::config::{Config, Settings};
use ragdesk_store::{compose, DocumentLibrary, RetrievalStore};

#[derive(Parser)]
#[command(name = "ragdesk")]
#[command(about = "Document retrieval for the support assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding config.toml; relative paths resolve against it
    /// (default: the working directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether an index is loaded
    Status,
    /// List stored documents
    List,
    /// Copy a document into the library (does not reindex)
    Upload {
        file: PathBuf,
    },
    /// Rebuild the index from every stored document
    Reindex,
    /// Remove a document and rebuild the index
    Delete {
        name: String,
    },
    /// Rank stored chunks against a query and print the composed context
    Search {
        query: String,

        /// Number of hits (default: retrieval.top_k)
        #[arg(short, long)]
        k: Option<usize>,

        /// Context budget in characters (default: retrieval.max_context_chars)
        #[arg(long)]
        max_chars: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config_dir {
        Some(dir) => Config::load_from(dir),
        None => Config::load(),
    }
    .context("loading configuration")?;
    let settings = config.settings()?;
    debug!(env = config.env_name(), docs = %settings.paths.docs_dir.display(), data = %settings.paths.data_dir.display(), "configuration loaded");

    let store = Arc::new(RetrievalStore::from_settings(&settings)?);
    let library = DocumentLibrary::new(settings.paths.docs_dir.clone(), settings.chunking, Arc::clone(&store));

    match cli.command {
        Commands::Status => status(&store, cli.json),
        Commands::List => list(&library, cli.json),
        Commands::Upload { file } => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("{} has no file name", file.display()))?;
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let dest = library.upload(&name, &bytes)?;
            println!("✅ Stored {} ({} bytes); run `ragdesk reindex` to make it searchable", dest.display(), bytes.len());
            Ok(())
        }
        Commands::Reindex => {
            let pb = spinner("Rebuilding index...");
            let result = library.reindex();
            pb.finish_and_clear();
            let report = result?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✅ Indexed {} chunks from {} documents", report.chunks, report.files);
                for failure in &report.failures {
                    println!("⚠️  Skipped {}: {}", failure.path.display(), failure.reason);
                }
            }
            Ok(())
        }
        Commands::Delete { name } => {
            let pb = spinner("Rebuilding index...");
            let result = library.delete_file(&name);
            pb.finish_and_clear();
            match result? {
                Some(report) => println!("🗑️  Deleted {name}; index now holds {} chunks", report.chunks),
                None => println!("🗑️  Deleted {name}; no documents left, index cleared"),
            }
            Ok(())
        }
        Commands::Search { query, k, max_chars } => search(&store, &settings, &query, k, max_chars, cli.json),
    }
}

fn status(store: &RetrievalStore, json: bool) -> anyhow::Result<()> {
    let header = store.header();
    if json {
        let value = serde_json::json!({ "loaded": header.is_some(), "index": header, "path": store.index_path() });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    match header {
        Some(h) => {
            println!("✅ Index loaded from {}", store.index_path().display());
            println!("   embedder={}  dim={}  chunks={}  built={}", h.embedder_id, h.dim, h.rows, h.created_at);
        }
        None => println!("❌ No index loaded ({} not found or unreadable)", store.index_path().display()),
    }
    if !store.embedder().is_configured() {
        println!("⚠️  No embedding provider configured; searches and rebuilds will fail");
    }
    Ok(())
}

fn list(library: &DocumentLibrary, json: bool) -> anyhow::Result<()> {
    let files = library.list_files()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else if files.is_empty() {
        println!("No documents in {}", library.docs_dir().display());
    } else {
        for f in &files {
            println!("{f}");
        }
        println!("\n📊 {} documents", files.len());
    }
    Ok(())
}

fn search(
    store: &RetrievalStore,
    settings: &Settings,
    query: &str,
    k: Option<usize>,
    max_chars: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let k = k.unwrap_or(settings.retrieval.top_k);
    let max_chars = max_chars.unwrap_or(settings.retrieval.max_context_chars);
    let hits = store.search(query, k)?;
    let context = compose(&hits, max_chars);
    if json {
        let value = serde_json::json!({ "query": query, "hits": hits, "context": context });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("🔍 Found {} results for: \"{}\"", hits.len(), query);
    for (i, hit) in hits.iter().enumerate() {
        println!("\n  {}. score={:.4}  source={}", i + 1, hit.score, hit.source);
        println!("     📝 {}", preview(&hit.text, 160));
    }
    if !context.is_empty() {
        println!("\n--- context ({} chars) ---\n{context}", context.chars().count());
    }
    Ok(())
}

fn spinner(msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        format!("{}...", flat.chars().take(max).collect::<String>())
    }
}
