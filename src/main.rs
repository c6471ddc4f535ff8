//! # DocsBuddy CLI (`docsbuddy`)
//!
//! Runs the HTTP server and exposes the same lookups from the terminal.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsbuddy serve` | Start the HTTP server |
//! | `docsbuddy lookup <term>` | Aggregated term lookup, printed as JSON |
//! | `docsbuddy analyze <sentence>` | Sentence analysis, printed as JSON |
//! | `docsbuddy extract <text>` | List lookup candidates in a piece of text |
//! | `docsbuddy insights <reply>` | Follow-up lookups for an assistant reply |
//! | `docsbuddy status` | Show whether an AI credential is configured |
//!
//! `.env.local` and `.env` in the working directory are loaded before the
//! config, so the API key can live there.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsbuddy::analyzer::{SentenceAnalyzer, DEFAULT_ANALYSIS_TYPE};
use docsbuddy::completion::create_client;
use docsbuddy::config::{self, Config};
use docsbuddy::glossary::extract_lookup_terms;
use docsbuddy::insights::lookup_response;
use docsbuddy::lookup::TermLookupAggregator;
use docsbuddy::models::AiStatus;
use docsbuddy::server;

/// DocsBuddy: term lookup, sentence analysis and chat backend.
#[derive(Parser)]
#[command(name = "docsbuddy", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// If the file does not exist, built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/docsbuddy.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves the lookup, analysis and chat
    /// endpoints until terminated.
    Serve,

    /// Look up a term through glossary, dictionary and Wikipedia.
    Lookup {
        /// The term to look up.
        term: String,
    },

    /// Analyze a sentence with the configured model (or the offline template).
    Analyze {
        /// The sentence to analyze.
        sentence: String,

        /// Analysis type: `summarize`, `simplify`, or `explain`.
        #[arg(long = "type", default_value = DEFAULT_ANALYSIS_TYPE)]
        analysis_type: String,
    },

    /// Print the technical terms found in a piece of text.
    Extract {
        /// Text to scan, e.g. a selected paragraph.
        text: String,
    },

    /// Analyze an assistant reply for code, docs and tools.
    Insights {
        /// The assistant reply.
        response: String,

        /// The question that produced the reply.
        #[arg(long, default_value = "")]
        query: String,
    },

    /// Show AI availability.
    Status,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsbuddy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &std::path::Path) -> Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!("config {} not found, using defaults", path.display());
        Ok(Config::minimal())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing env files are fine.
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Lookup { term } => {
            let aggregator =
                TermLookupAggregator::from_config(&cfg.lookup, AiStatus::probe(&cfg.ai))?;
            print_json(&aggregator.lookup(&term).await)?;
        }
        Commands::Analyze {
            sentence,
            analysis_type,
        } => {
            let client = create_client(&cfg.ai)?;
            let analyzer = SentenceAnalyzer::new(client, &cfg.ai);
            print_json(&analyzer.analyze(&sentence, &analysis_type).await)?;
        }
        Commands::Extract { text } => {
            for term in extract_lookup_terms(&text) {
                println!("{}", term);
            }
        }
        Commands::Insights { response, query } => {
            print_json(&lookup_response(&response, &query))?;
        }
        Commands::Status => {
            let status = AiStatus::probe(&cfg.ai);
            print_json(&status)?;
            if !status.is_online() {
                eprintln!(
                    "Set {} (for example in .env.local) to enable AI features.",
                    cfg.ai.api_key_env
                );
            }
        }
    }

    Ok(())
}
