//! # Folio — portfolio assistant
//!
//! Usage:
//!   folio                                # Start the gateway (default port 3001)
//!   folio serve --port 8080              # Custom port
//!   folio search "rust cli" --lang en    # Print ranked snippets
//!   folio index                          # Build the index and list documents
//!   folio ask "list projects"            # Offline answer, no chat backend

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_core::FolioConfig;
use folio_knowledge::KnowledgeStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "📁 Folio — multilingual portfolio knowledge assistant"
)]
struct Cli {
    /// Config file (default: $FOLIO_CONFIG, then ~/.folio/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Rank the index against a query and print the snippets as JSON
    Search {
        query: String,
        #[arg(short, long)]
        lang: Option<String>,
        /// Number of results (default: knowledge.default_k)
        #[arg(short)]
        k: Option<usize>,
    },
    /// Build the index and list its documents
    Index,
    /// Answer from the structured record only, as the gateway does without a backend
    Ask {
        query: String,
        #[arg(short, long)]
        lang: Option<String>,
    },
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "folio=debug,folio_knowledge=debug,folio_providers=debug,folio_gateway=debug,tower_http=debug"
    } else {
        "folio=info,folio_knowledge=info,folio_providers=info,folio_gateway=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref().map(expand_path);
    let mut config = FolioConfig::resolve(config_path.as_deref())?;
    tracing::debug!(
        "Config: site_root={} languages={:?} provider={}",
        config.knowledge.site_root,
        config.knowledge.languages,
        config.llm.provider
    );

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            folio_gateway::start(config).await?;
        }
        Command::Search { query, lang, k } => {
            let store = KnowledgeStore::open(config.knowledge)?;
            let snippets = store.snippets(&query, lang.as_deref(), k);
            println!("{}", serde_json::to_string_pretty(&snippets)?);
        }
        Command::Index => {
            let store = KnowledgeStore::open(config.knowledge)?;
            let snapshot = store.snapshot();
            for doc in snapshot.documents() {
                println!(
                    "{:<28} {:<14} {:<3} {}",
                    doc.id,
                    doc.kind.as_str(),
                    doc.lang,
                    doc.title
                );
            }
            let languages: Vec<&str> = snapshot.translations().languages().collect();
            println!("\n{} documents, languages: {}", snapshot.len(), languages.join(", "));
        }
        Command::Ask { query, lang } => {
            let store = KnowledgeStore::open(config.knowledge)?;
            println!("{}", store.fallback_answer(&query, lang.as_deref()));
        }
    }
    Ok(())
}
