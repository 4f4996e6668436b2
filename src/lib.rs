//! # library-docs
//!
//! Fetch newsroom documents from a cloud document store and turn them into
//! embeddable, outlined HTML payloads.
//!
//! ## Why this crate?
//!
//! Editor exports are full HTML documents with generated CSS classes,
//! redirect-wrapped links and comment anchors. Readers want the body, the
//! author and a table of contents. This crate fetches the export, cleans it,
//! detects an in-body byline and splits the body into sections, then caches
//! the result keyed by the document's revision time.
//!
//! ## Pipeline Overview
//!
//! ```text
//! id + resource type
//!  │
//!  ├─ 1. Cache     return a stored payload without network I/O
//!  ├─ 2. Auth      acquire credentials
//!  ├─ 3. Fetch     export content ∥ first-revision metadata
//!  ├─ 4. Format    normalize → byline → sections
//!  └─ 5. Store     cache when the revision mimetype supports freshness checks
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use library_docs::{
//!     DriveClient, Library, LibraryConfig, MemoryCache, RequestContext, StaticTokenAuth,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LibraryConfig::builder().build()?;
//!     let library = Library::new(
//!         config.clone(),
//!         Arc::new(StaticTokenAuth::from_env("LIBRARY_ACCESS_TOKEN")?),
//!         Arc::new(DriveClient::new(&config)?),
//!         Arc::new(MemoryCache::new()),
//!     );
//!     let payload = library
//!         .fetch_doc("1AbC", "document", &RequestContext::new("/story/1AbC"))
//!         .await?;
//!     println!("{} by {}", payload.sections.len(), payload.byline);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `library` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! library-docs = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod resource;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cache::{CacheEntry, MemoryCache, PayloadCache};
pub use client::{AuthHandle, AuthProvider, DocumentClient, DriveClient, StaticTokenAuth};
pub use config::{LibraryConfig, LibraryConfigBuilder};
pub use error::{ClientError, LibraryError};
pub use fetch::{Library, RequestContext};
pub use output::{FormattedPayload, LastModifyingUser, RevisionInfo, Section, Subsection};
pub use pipeline::byline::{fetch_byline, Byline};
pub use pipeline::format::{get_processed_doc_attributes, ExportedContent};
pub use pipeline::names::{clean_name, slugify};
pub use pipeline::sections::{split_sections, SplitSections};
pub use resource::ResourceType;
