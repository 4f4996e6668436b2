//! Fetch orchestration: cache lookup, concurrent retrieval, formatting and
//! conditional caching.
//!
//! A [`Library`] owns its collaborators behind trait objects, so one value
//! can be shared across request handlers and every seam can be faked in
//! tests. Only credential and content failures become errors; everything
//! else degrades to a servable payload.

use crate::cache::PayloadCache;
use crate::client::{AuthHandle, AuthProvider, DocumentClient};
use crate::config::LibraryConfig;
use crate::error::{ClientError, LibraryError};
use crate::output::{FormattedPayload, RevisionInfo};
use crate::pipeline::format::{get_processed_doc_attributes, ExportedContent};
use crate::resource::{is_revision_capable_mime, ExportFormat, ResourceType};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// Caller-side request details, used only for logging and correlation.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Path of the incoming request, as the caller saw it.
    pub path: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

/// The document fetcher.
#[derive(Clone)]
pub struct Library {
    config: LibraryConfig,
    auth: Arc<dyn AuthProvider>,
    client: Arc<dyn DocumentClient>,
    cache: Arc<dyn PayloadCache>,
}

impl Library {
    pub fn new(
        config: LibraryConfig,
        auth: Arc<dyn AuthProvider>,
        client: Arc<dyn DocumentClient>,
        cache: Arc<dyn PayloadCache>,
    ) -> Self {
        Self {
            config,
            auth,
            client,
            cache,
        }
    }

    /// Fetch and format document `id` of type `resource_type`.
    ///
    /// A cached payload is returned without touching the network. On a miss
    /// the content and the revision metadata are fetched concurrently, the
    /// pair is formatted, and the payload is cached when its revision
    /// mimetype allows later freshness checks.
    ///
    /// # Errors
    /// - [`LibraryError::CredentialsUnavailable`] when the auth provider fails
    /// - [`LibraryError::ContentFetchFailed`] when the body cannot be retrieved
    ///
    /// Unsupported resource types and revision lookup failures are not
    /// errors.
    pub async fn fetch_doc(
        &self,
        id: &str,
        resource_type: &str,
        ctx: &RequestContext,
    ) -> Result<Arc<FormattedPayload>, LibraryError> {
        let span = info_span!(
            "fetch_doc",
            path = %ctx.path,
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
        );
        self.fetch_doc_inner(id, ResourceType::parse(resource_type), ctx)
            .instrument(span)
            .await
    }

    async fn fetch_doc_inner(
        &self,
        id: &str,
        resource_type: ResourceType,
        ctx: &RequestContext,
    ) -> Result<Arc<FormattedPayload>, LibraryError> {
        let start = Instant::now();

        // ── Step 1: Cache lookup ─────────────────────────────────────────
        if let Some(content) = self.cache.get(id).await.and_then(|e| e.content) {
            info!("CACHE HIT {}", ctx.path);
            return Ok(content);
        }
        debug!("Cache miss for {}:{}", resource_type, id);

        // ── Step 2: Credentials ──────────────────────────────────────────
        let auth = self.auth.credentials().await?;

        // ── Step 3: Content and revision, concurrently ───────────────────
        let (content, revision) = futures::future::join(
            self.fetch_content(&auth, id, &resource_type),
            self.fetch_revision(&auth, id, &resource_type),
        )
        .await;
        let content = content.map_err(|source| LibraryError::ContentFetchFailed {
            id: id.to_string(),
            source,
        })?;

        // ── Step 4: Format ───────────────────────────────────────────────
        let payload = Arc::new(get_processed_doc_attributes(
            &content,
            &revision,
            &self.config,
        ));

        // ── Step 5: Cache if freshness can be checked later ──────────────
        if is_revision_capable_mime(&revision.mime_type) {
            self.cache
                .add(id, &revision.modified_time, Arc::clone(&payload))
                .await;
        } else if revision.is_empty() {
            info!("Skipping cache add: no revision data for {}:{}", resource_type, id);
        } else {
            info!(
                "Skipping cache add: unsupported mimetype {:?}",
                revision.mime_type
            );
        }

        info!(
            "Fetched {}:{} in {}ms ({} sections)",
            resource_type,
            id,
            start.elapsed().as_millis(),
            payload.sections.len()
        );
        Ok(payload)
    }

    /// Drop the cached payload for `id` if it was built from a revision other
    /// than `current_modified_time`. Returns true when an entry was removed.
    pub async fn purge_if_stale(&self, id: &str, current_modified_time: &str) -> bool {
        match self.cache.get(id).await {
            Some(entry) if !entry.is_fresh(current_modified_time) => {
                info!(
                    "Purging stale cache entry for {} (cached {}, current {})",
                    id, entry.modified_time, current_modified_time
                );
                self.cache.remove(id).await;
                true
            }
            _ => false,
        }
    }

    async fn fetch_content(
        &self,
        auth: &AuthHandle,
        id: &str,
        resource_type: &ResourceType,
    ) -> Result<ExportedContent, ClientError> {
        let Some(format) = resource_type.export_format() else {
            return Ok(ExportedContent::Placeholder(
                resource_type.unsupported_message(),
            ));
        };

        match format {
            ExportFormat::Raw => self
                .client
                .get_raw_content(auth, id)
                .await
                .map(ExportedContent::Raw),
            ExportFormat::Html | ExportFormat::PlainText => {
                let mime = format.mime_type().unwrap_or("text/html");
                let body = self.client.export_content(auth, id, mime).await?;
                Ok(match format {
                    ExportFormat::PlainText => ExportedContent::PlainText(body),
                    _ => ExportedContent::Html(body),
                })
            }
        }
    }

    async fn fetch_revision(
        &self,
        auth: &AuthHandle,
        id: &str,
        resource_type: &ResourceType,
    ) -> RevisionInfo {
        if !resource_type.supports_revisions() {
            info!("Revision data not supported for {}:{}", resource_type, id);
            return RevisionInfo::empty();
        }

        match self
            .client
            .get_revision(
                auth,
                id,
                &self.config.revision_id,
                &self.config.revision_fields,
            )
            .await
        {
            Ok(revision) => revision,
            Err(e) => {
                warn!(
                    "Failed retrieving revision data for {}:{}: {}",
                    resource_type, id, e
                );
                RevisionInfo::empty()
            }
        }
    }
}
