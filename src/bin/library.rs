//! CLI binary for library-docs.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `LibraryConfig` and prints payloads as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use library_docs::{
    clean_name, get_processed_doc_attributes, slugify, DriveClient, ExportedContent,
    LastModifyingUser, Library, LibraryConfig, MemoryCache, RequestContext, RevisionInfo,
    StaticTokenAuth,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Fetch and format a document
  library fetch 1AbCdEf --type document

  # Format a saved export without network access
  library format export.html --author "Jane Doe"

  # Format a presentation's plain-text export
  library format slides.txt --plain-text

  # Clean a stored title and show its slug
  library name "003 - Budget | Newsroom"

ENVIRONMENT VARIABLES:
  LIBRARY_ACCESS_TOKEN    Bearer token for the document service
  LIBRARY_API_BASE_URL    Override the service root (default: Drive v3)
  LIBRARY_TIMEOUT_SECS    Per-request timeout in seconds
"#;

/// Fetch and format documents from the newsroom document store.
#[derive(Parser, Debug)]
#[command(
    name = "library",
    version,
    about = "Fetch and format documents from the newsroom document store",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "LIBRARY_VERBOSE")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a document by id and print its payload as JSON.
    Fetch {
        /// Document id in the store.
        id: String,

        /// Resource type: document, presentation, text/html.
        #[arg(long = "type", default_value = "document")]
        resource_type: String,

        /// Bearer token for the document service.
        #[arg(long, env = "LIBRARY_ACCESS_TOKEN", hide_env_values = true)]
        token: String,

        /// Document service root.
        #[arg(long, env = "LIBRARY_API_BASE_URL")]
        api_base_url: Option<String>,

        /// Per-request timeout in seconds.
        #[arg(long, env = "LIBRARY_TIMEOUT_SECS", default_value_t = 30)]
        timeout: u64,
    },

    /// Format a locally saved export and print its payload as JSON.
    Format {
        /// Path to the exported HTML (or plain text with --plain-text).
        file: PathBuf,

        /// Author used when the body carries no byline.
        #[arg(long)]
        author: Option<String>,

        /// Treat the file as a plain-text export (presentations).
        #[arg(long)]
        plain_text: bool,

        /// Keep the byline paragraph in the html.
        #[arg(long)]
        keep_byline: bool,
    },

    /// Print the cleaned display name and slug of a title.
    Name {
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Fetch {
            id,
            resource_type,
            token,
            api_base_url,
            timeout,
        } => {
            let mut builder = LibraryConfig::builder().request_timeout_secs(timeout);
            if let Some(url) = api_base_url {
                builder = builder.api_base_url(url);
            }
            let config = builder.build().context("Invalid configuration")?;

            let client = DriveClient::new(&config).context("Failed to create HTTP client")?;
            let library = Library::new(
                config,
                Arc::new(StaticTokenAuth::new(token)),
                Arc::new(client),
                Arc::new(MemoryCache::new()),
            );
            let ctx = RequestContext::new(format!("/{id}"));
            let payload = library
                .fetch_doc(&id, &resource_type, &ctx)
                .await
                .with_context(|| format!("Failed to fetch {resource_type} '{id}'"))?;
            print_json(&*payload)
        }

        Command::Format {
            file,
            author,
            plain_text,
            keep_byline,
        } => {
            let body = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let content = if plain_text {
                ExportedContent::PlainText(body)
            } else {
                ExportedContent::Html(body)
            };
            let revision = RevisionInfo {
                last_modifying_user: LastModifyingUser {
                    display_name: author,
                    ..Default::default()
                },
                ..Default::default()
            };
            let config = LibraryConfig::builder()
                .strip_byline_paragraph(!keep_byline)
                .build()
                .context("Invalid configuration")?;
            print_json(&get_processed_doc_attributes(&content, &revision, &config))
        }

        Command::Name { title } => {
            let cleaned = clean_name(&title);
            println!("{cleaned}");
            println!("{}", slugify(&cleaned));
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise payload")?;
    println!("{json}");
    Ok(())
}
