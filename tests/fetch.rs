//! Integration tests for the fetch orchestrator.
//!
//! The document service and the auth provider are replaced by in-process
//! fakes that count their calls, so these tests never touch the network.
//!
//! Run with:
//!   RUST_LOG=library_docs=debug cargo test --test fetch -- --nocapture

use async_trait::async_trait;
use library_docs::{
    AuthHandle, AuthProvider, ClientError, DocumentClient, LastModifyingUser, Library,
    LibraryConfig, LibraryError, MemoryCache, PayloadCache, RequestContext, RevisionInfo,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

const MULTISECTION: &str = include_str!("fixtures/multisection.html");
const SIMPLE: &str = include_str!("fixtures/simple.html");
const RAW_HTML: &str = "<h1>This is a raw HTML document</h1>";

// ── Test helpers ─────────────────────────────────────────────────────────────

struct FakeAuth {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeAuth {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn credentials(&self) -> Result<AuthHandle, LibraryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LibraryError::CredentialsUnavailable {
                detail: "service account key missing".into(),
            });
        }
        Ok(AuthHandle::bearer("test-token"))
    }
}

/// What the fake service answers for revision lookups.
enum RevisionReply {
    Author { mime: &'static str, name: &'static str },
    Fail,
}

/// Makes content and revision calls wait for each other: each side signals
/// its own arrival, then waits for the other's. Only callers that have both
/// requests in flight at once get past it.
#[derive(Default)]
struct Rendezvous {
    content_arrived: Notify,
    revision_arrived: Notify,
}

struct FakeDrive {
    body: String,
    revision: RevisionReply,
    content_fails: bool,
    export_calls: AtomicUsize,
    raw_calls: AtomicUsize,
    revision_calls: AtomicUsize,
    export_mimes: Mutex<Vec<String>>,
    rendezvous: Option<Rendezvous>,
}

impl FakeDrive {
    fn new(body: &str, revision: RevisionReply) -> Self {
        Self {
            body: body.to_string(),
            revision,
            content_fails: false,
            export_calls: AtomicUsize::new(0),
            raw_calls: AtomicUsize::new(0),
            revision_calls: AtomicUsize::new(0),
            export_mimes: Mutex::new(Vec::new()),
            rendezvous: None,
        }
    }

    fn document(body: &str) -> Arc<Self> {
        Arc::new(Self::new(
            body,
            RevisionReply::Author {
                mime: "application/vnd.google-apps.document",
                name: "John Smith",
            },
        ))
    }

    fn content_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst) + self.raw_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentClient for FakeDrive {
    async fn export_content(
        &self,
        auth: &AuthHandle,
        _id: &str,
        mime_type: &str,
    ) -> Result<String, ClientError> {
        assert_eq!(auth.token(), "test-token");
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        self.export_mimes.lock().unwrap().push(mime_type.to_string());
        if let Some(r) = &self.rendezvous {
            r.content_arrived.notify_one();
            r.revision_arrived.notified().await;
        }
        if self.content_fails {
            return Err(ClientError::Http {
                status: 404,
                detail: "File not found".into(),
            });
        }
        Ok(self.body.clone())
    }

    async fn get_raw_content(&self, _auth: &AuthHandle, _id: &str) -> Result<String, ClientError> {
        self.raw_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }

    async fn get_revision(
        &self,
        _auth: &AuthHandle,
        _id: &str,
        revision_id: &str,
        fields: &str,
    ) -> Result<RevisionInfo, ClientError> {
        assert_eq!(revision_id, "1");
        assert_eq!(fields, "*");
        self.revision_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(r) = &self.rendezvous {
            r.revision_arrived.notify_one();
            r.content_arrived.notified().await;
        }
        match &self.revision {
            RevisionReply::Author { mime, name } => Ok(RevisionInfo {
                mime_type: mime.to_string(),
                modified_time: "2017-01-01T19:55:07.353Z".into(),
                last_modifying_user: LastModifyingUser {
                    display_name: Some(name.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            }),
            RevisionReply::Fail => Err(ClientError::Transport("connection reset".into())),
        }
    }
}

/// Route library logs to the test harness; `RUST_LOG=debug` shows them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn library(
    auth: Arc<FakeAuth>,
    drive: Arc<FakeDrive>,
    cache: Arc<MemoryCache>,
) -> Library {
    init_tracing();
    Library::new(LibraryConfig::default(), auth, drive, cache)
}

fn ctx(id: &str) -> RequestContext {
    RequestContext::new(format!("/{id}")).with_request_id("test")
}

// ── Resource types ───────────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_type_yields_placeholder() {
    let drive = FakeDrive::document(SIMPLE);
    let cache = Arc::new(MemoryCache::new());
    let lib = library(FakeAuth::ok(), drive.clone(), cache.clone());

    let payload = lib.fetch_doc("doc1", "badtype", &ctx("doc1")).await.unwrap();
    assert_eq!(payload.html, "Library does not support viewing badtypes yet.");
    assert!(payload.sections.is_empty());
    assert_eq!(drive.content_calls(), 0);
    assert_eq!(drive.revision_calls.load(Ordering::SeqCst), 0);
    assert!(cache.get("doc1").await.is_none());
}

#[tokio::test]
async fn raw_html_is_served_unmodified() {
    let drive = FakeDrive::document(RAW_HTML);
    let cache = Arc::new(MemoryCache::new());
    let lib = library(FakeAuth::ok(), drive.clone(), cache.clone());

    let payload = lib.fetch_doc("raw", "text/html", &ctx("raw")).await.unwrap();
    assert_eq!(payload.html, RAW_HTML);
    assert!(payload.sections.is_empty());
    assert_eq!(drive.raw_calls.load(Ordering::SeqCst), 1);
    assert_eq!(drive.export_calls.load(Ordering::SeqCst), 0);
    // No revision history for raw files, so nothing is cached either.
    assert_eq!(drive.revision_calls.load(Ordering::SeqCst), 0);
    assert!(cache.get("raw").await.is_none());
}

#[tokio::test]
async fn document_is_exported_as_html() {
    let drive = FakeDrive::document(MULTISECTION);
    let lib = library(FakeAuth::ok(), drive.clone(), Arc::new(MemoryCache::new()));

    lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert_eq!(*drive.export_mimes.lock().unwrap(), vec!["text/html".to_string()]);
}

#[tokio::test]
async fn presentation_is_exported_as_plain_text() {
    let drive = Arc::new(FakeDrive::new(
        "## Agenda\n\nKickoff\n\n### Goals\n\nShip it\n",
        RevisionReply::Author {
            mime: "application/vnd.google-apps.presentation",
            name: "Ana Lima",
        },
    ));
    let cache = Arc::new(MemoryCache::new());
    let lib = library(FakeAuth::ok(), drive.clone(), cache.clone());

    let payload = lib.fetch_doc("deck", "presentation", &ctx("deck")).await.unwrap();
    assert_eq!(*drive.export_mimes.lock().unwrap(), vec!["text/plain".to_string()]);
    assert_eq!(payload.byline, "Ana Lima");
    assert_eq!(payload.sections.len(), 1);
    assert_eq!(payload.sections[0].heading, "Agenda");
    assert_eq!(payload.sections[0].subsections[0].heading, "Goals");
    assert!(cache.get("deck").await.is_some());
}

// ── Formatting ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn multisection_document_is_outlined() {
    let drive = FakeDrive::document(MULTISECTION);
    let lib = library(FakeAuth::ok(), drive, Arc::new(MemoryCache::new()));

    let payload = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert_eq!(payload.sections.len(), 2);
    assert_eq!(payload.sections[0].subsections.len(), 3);
    assert_eq!(payload.sections[0].heading, "Getting Started");
    assert_eq!(payload.sections[0].url, "#h.intro");
    assert_eq!(payload.sections[1].heading, "Publishing");

    let headings: Vec<_> = payload.sections[0]
        .subsections
        .iter()
        .map(|s| s.heading.as_str())
        .collect();
    assert_eq!(headings, vec!["Accounts", "Tools", "Style"]);
}

#[tokio::test]
async fn multisection_export_is_cleaned() {
    let drive = FakeDrive::document(MULTISECTION);
    let lib = library(FakeAuth::ok(), drive, Arc::new(MemoryCache::new()));

    let payload = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    let html = &payload.html;
    assert!(!html.contains("<style"), "{html}");
    assert!(!html.contains("class="), "{html}");
    assert!(!html.contains("#cmnt"), "{html}");
    assert!(html.contains(r#"href="https://example.org/tools""#), "{html}");
    assert!(html.contains("<strong>Request</strong>"), "{html}");
    assert!(html.contains("<em>Follow</em>"), "{html}");
}

#[tokio::test]
async fn body_byline_and_revision_author_are_reported() {
    let drive = FakeDrive::document(MULTISECTION);
    let lib = library(FakeAuth::ok(), drive, Arc::new(MemoryCache::new()));

    let payload = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert_eq!(payload.byline, "Jane Doe");
    assert_eq!(payload.created_by, "John Smith");
    assert!(!payload.html.contains("By Jane Doe"));
}

#[tokio::test]
async fn revision_author_is_the_byline_fallback() {
    let drive = FakeDrive::document(SIMPLE);
    let lib = library(FakeAuth::ok(), drive, Arc::new(MemoryCache::new()));

    let payload = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert_eq!(payload.byline, "John Smith");
    assert_eq!(payload.html, "<p>A short note with no headings and no byline.</p>");
    assert!(payload.sections.is_empty());
}

// ── Caching ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_fetch_is_a_cache_hit() {
    let auth = FakeAuth::ok();
    let drive = FakeDrive::document(MULTISECTION);
    let cache = Arc::new(MemoryCache::new());
    let lib = library(auth.clone(), drive.clone(), cache.clone());

    let first = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    let second = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(drive.content_calls(), 1);
    assert_eq!(drive.revision_calls.load(Ordering::SeqCst), 1);
    assert_eq!(auth.calls.load(Ordering::SeqCst), 1);

    let entry = cache.get("doc").await.expect("payload cached");
    assert_eq!(entry.modified_time, "2017-01-01T19:55:07.353Z");
}

#[tokio::test]
async fn non_capable_mimetype_is_not_cached() {
    let drive = Arc::new(FakeDrive::new(
        SIMPLE,
        RevisionReply::Author {
            mime: "application/vnd.google-apps.spreadsheet",
            name: "John Smith",
        },
    ));
    let cache = Arc::new(MemoryCache::new());
    let lib = library(FakeAuth::ok(), drive.clone(), cache.clone());

    lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert!(cache.get("doc").await.is_none());

    lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert_eq!(drive.content_calls(), 2);
}

#[tokio::test]
async fn stale_entries_can_be_purged() {
    let drive = FakeDrive::document(SIMPLE);
    let cache = Arc::new(MemoryCache::new());
    let lib = library(FakeAuth::ok(), drive.clone(), cache.clone());

    lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert!(!lib.purge_if_stale("doc", "2017-01-01T19:55:07.353Z").await);
    assert!(lib.purge_if_stale("doc", "2018-06-01T00:00:00.000Z").await);

    lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert_eq!(drive.content_calls(), 2);
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn revision_failure_degrades_to_sentinel() {
    let drive = Arc::new(FakeDrive::new(SIMPLE, RevisionReply::Fail));
    let cache = Arc::new(MemoryCache::new());
    let lib = library(FakeAuth::ok(), drive.clone(), cache.clone());

    let payload = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap();
    assert_eq!(payload.created_by, "");
    assert_eq!(payload.byline, "Unknown");
    assert_eq!(drive.revision_calls.load(Ordering::SeqCst), 1);
    assert!(cache.get("doc").await.is_none());
}

#[tokio::test]
async fn credential_failure_propagates() {
    let auth = FakeAuth::failing();
    let drive = FakeDrive::document(SIMPLE);
    let lib = library(auth, drive.clone(), Arc::new(MemoryCache::new()));

    let err = lib.fetch_doc("doc", "document", &ctx("doc")).await.unwrap_err();
    assert!(matches!(err, LibraryError::CredentialsUnavailable { .. }));
    assert_eq!(drive.content_calls(), 0);
}

#[tokio::test]
async fn content_and_revision_are_requested_concurrently() {
    let mut drive = FakeDrive::new(
        MULTISECTION,
        RevisionReply::Author {
            mime: "application/vnd.google-apps.document",
            name: "John Smith",
        },
    );
    drive.rendezvous = Some(Rendezvous::default());
    let lib = library(FakeAuth::ok(), Arc::new(drive), Arc::new(MemoryCache::new()));

    // Awaiting one request before starting the other never completes.
    let fetched = tokio::time::timeout(
        Duration::from_secs(5),
        lib.fetch_doc("doc", "document", &ctx("doc")),
    )
    .await
    .expect("content and revision requests were not in flight together");
    let payload = fetched.unwrap();
    assert_eq!(payload.created_by, "John Smith");
    assert_eq!(payload.sections.len(), 2);
}

#[tokio::test]
async fn content_failure_propagates() {
    let mut drive = FakeDrive::new(
        SIMPLE,
        RevisionReply::Author {
            mime: "application/vnd.google-apps.document",
            name: "John Smith",
        },
    );
    drive.content_fails = true;
    let cache = Arc::new(MemoryCache::new());
    let lib = library(FakeAuth::ok(), Arc::new(drive), cache.clone());

    let err = lib.fetch_doc("gone", "document", &ctx("gone")).await.unwrap_err();
    match err {
        LibraryError::ContentFetchFailed { id, source } => {
            assert_eq!(id, "gone");
            assert!(source.is_not_found());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cache.get("gone").await.is_none());
}
