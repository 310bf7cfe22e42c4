//! In-memory owner of the document.
//!
//! Readers get an immutable snapshot. Writers run a closure against a copy
//! and the copy replaces the current snapshot only when the closure
//! succeeds. Persistence happens on an explicit `save`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use common::AppResult;
use domain::{Document, SeedData};

use crate::repository::DocumentRepository;
use crate::restore::{reconcile, RawDocument, RestoreReport};

pub struct DocumentStore {
    repo: Arc<dyn DocumentRepository>,
    seed: SeedData,
    current: RwLock<Arc<Document>>,
    dirty: AtomicBool,
}

impl DocumentStore {
    /// Load and reconcile the persisted document.
    ///
    /// A missing document starts from the seed and is marked for saving.
    /// An unreadable one also falls back to the seed, but is left on disk
    /// until the next change is saved.
    pub async fn open(repo: Arc<dyn DocumentRepository>, seed: SeedData) -> AppResult<Self> {
        let loaded = match repo.load_raw().await {
            Ok(Some(text)) => match RawDocument::from_json_str(&text)
                .and_then(|raw| reconcile(raw, &seed))
            {
                Ok((doc, report)) => Some((doc, report)),
                Err(e) => {
                    error!(error = %e, "Stored document is unusable; starting from seed data");
                    None
                }
            },
            Ok(None) => {
                info!("No stored document; starting from seed data");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to read stored document; starting from seed data");
                None
            }
        };

        let (document, dirty) = match loaded {
            Some((doc, report)) => {
                for notice in report.notices() {
                    warn!("{}", notice);
                }
                (doc, !report.is_clean())
            }
            None => (seed.clone().into_document()?, true),
        };

        Ok(Self::new(repo, seed, document, dirty))
    }

    /// Build a store around an already valid document.
    pub fn with_document(repo: Arc<dyn DocumentRepository>, seed: SeedData, document: Document) -> Self {
        Self::new(repo, seed, document, false)
    }

    fn new(repo: Arc<dyn DocumentRepository>, seed: SeedData, document: Document, dirty: bool) -> Self {
        Self {
            repo,
            seed,
            current: RwLock::new(Arc::new(document)),
            dirty: AtomicBool::new(dirty),
        }
    }

    pub fn seed(&self) -> &SeedData {
        &self.seed
    }

    /// Current immutable snapshot
    pub async fn snapshot(&self) -> Arc<Document> {
        self.current.read().await.clone()
    }

    /// Apply a mutation to a copy of the document.
    ///
    /// On error the current snapshot is left untouched.
    pub async fn apply<T, F>(&self, mutation: F) -> AppResult<T>
    where
        F: FnOnce(&mut Document) -> AppResult<T>,
    {
        let mut guard = self.current.write().await;
        let mut next = Document::clone(&guard);
        let out = mutation(&mut next)?;
        *guard = Arc::new(next);
        self.dirty.store(true, Ordering::SeqCst);
        Ok(out)
    }

    /// Swap in a whole new document (restore).
    pub async fn replace(&self, document: Document) {
        *self.current.write().await = Arc::new(document);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Reconcile raw input and swap it in; nothing changes on error.
    pub async fn restore(&self, raw: RawDocument) -> AppResult<RestoreReport> {
        let (document, report) = reconcile(raw, &self.seed)?;
        self.replace(document).await;
        Ok(report)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Persist the current snapshot if it changed since the last save.
    pub async fn save(&self) -> AppResult<()> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            debug!("Document unchanged; nothing to save");
            return Ok(());
        }

        let snapshot = self.snapshot().await;
        if let Err(e) = self.repo.save(&snapshot).await {
            self.dirty.store(true, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }
}
