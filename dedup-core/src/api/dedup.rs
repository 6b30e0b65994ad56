// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dedup Orchestrator
//!
//! Main entry point for the API.

use std::sync::Arc;
use std::thread;

use tracing::warn;

use crate::contact::{Contact, ContactId};
use crate::duplicate::{
    CancelToken, DetectionEngine, DuplicateError, DuplicatePair, MergeOutcome, MergeResolver,
    PairId,
};
use crate::storage::{ContactStore, InMemoryContactStore, InMemoryPairStore, PairStore};

use super::config::DedupConfig;
use super::error::{DedupError, DedupResult};
use super::events::{DedupEvent, EventDispatcher, EventHandler};
use super::stats::{ContactDuplicates, ContactMatch, DuplicateStats, PendingDuplicate, ScanSummary};
use super::task::ScanTask;

/// Main orchestrator.
///
/// Owns the contact and pair stores, the detection engine and the merge
/// resolver. Construct one per process and share it by reference.
///
/// # Example
///
/// ```ignore
/// use dedup_core::{Contact, Dedup};
///
/// let dedup = Dedup::in_memory()?;
/// dedup.add_contact(Contact::draft().with_email("ann@example.com"))?;
/// dedup.add_contact(Contact::draft().with_email("ANN@example.com"))?;
///
/// let summary = dedup.scan()?;
/// let pair = &summary.new_pairs[0];
/// dedup.merge(pair.id, pair.contact_a)?;
/// ```
pub struct Dedup {
    config: DedupConfig,
    contacts: Arc<dyn ContactStore>,
    pairs: Arc<dyn PairStore>,
    engine: Arc<DetectionEngine>,
    resolver: MergeResolver,
    events: Arc<EventDispatcher>,
}

impl Dedup {
    /// Creates an instance from configuration.
    ///
    /// With a storage path, both stores live in one SQLite database; the
    /// parent directory is created if needed.
    pub fn new(config: DedupConfig) -> DedupResult<Self> {
        config.validate().map_err(DedupError::Configuration)?;

        match &config.storage_path {
            None => {
                let contacts = Arc::new(InMemoryContactStore::new());
                let pairs = Arc::new(InMemoryPairStore::new());
                Ok(Self::with_stores(contacts, pairs, config))
            }
            #[cfg(feature = "sqlite")]
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| DedupError::Configuration(e.to_string()))?;
                }
                let storage = Arc::new(crate::storage::SqliteStorage::open(path)?);
                Ok(Self::with_stores(storage.clone(), storage, config))
            }
            #[cfg(not(feature = "sqlite"))]
            Some(_) => Err(DedupError::Configuration(
                "persistent storage requires the `sqlite` feature".into(),
            )),
        }
    }

    /// Creates an instance with in-memory stores (for testing).
    pub fn in_memory() -> DedupResult<Self> {
        Self::new(DedupConfig::in_memory())
    }

    /// Creates an instance over caller-provided stores.
    pub fn with_stores(
        contacts: Arc<dyn ContactStore>,
        pairs: Arc<dyn PairStore>,
        config: DedupConfig,
    ) -> Self {
        let engine = Arc::new(DetectionEngine::new(
            contacts.clone(),
            pairs.clone(),
            config.detection.clone(),
        ));
        let resolver = MergeResolver::new(contacts.clone(), pairs.clone());

        Dedup {
            config,
            contacts,
            pairs,
            engine,
            resolver,
            events: Arc::new(EventDispatcher::new()),
        }
    }

    // === Contact Operations ===

    /// Stores a new contact and returns it with its assigned id.
    pub fn add_contact(&self, contact: Contact) -> DedupResult<Contact> {
        Ok(self.contacts.create(contact)?)
    }

    /// Gets a contact by id.
    pub fn get_contact(&self, id: ContactId) -> DedupResult<Option<Contact>> {
        Ok(self.contacts.find_by_id(id)?)
    }

    /// Lists all contacts.
    pub fn list_contacts(&self) -> DedupResult<Vec<Contact>> {
        Ok(self.contacts.list_all()?)
    }

    // === Scanning ===

    /// Scans every pair of contacts and records new duplicates.
    pub fn scan(&self) -> DedupResult<ScanSummary> {
        let events = self.events.clone();
        let result = run_scan(&self.engine, &events, &CancelToken::new());
        Ok(ScanSummary { new_pairs: result? })
    }

    /// Starts a full scan on a background thread.
    ///
    /// Progress is reported to the registered event handlers.
    pub fn spawn_scan(&self) -> ScanTask {
        let engine = self.engine.clone();
        let events = self.events.clone();
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let handle = thread::spawn(move || run_scan(&engine, &events, &token));
        ScanTask::new(handle, cancel)
    }

    /// Checks one contact against all others.
    ///
    /// Returns every pending pair involving the contact, including pairs
    /// recorded by earlier scans.
    pub fn check_contact(&self, contact_id: ContactId) -> DedupResult<ContactDuplicates> {
        let target_contact = self
            .contacts
            .find_by_id(contact_id)?
            .ok_or(DuplicateError::ContactNotFound(contact_id))?;

        let new_pairs = self.engine.find_duplicates_for_contact(contact_id)?.len();

        let mut duplicates = Vec::new();
        for pair in self.pairs.find_pending_for_contact(contact_id)? {
            let Some(other_id) = pair.other(contact_id) else {
                continue;
            };
            if let Some(other_contact) = self.contacts.find_by_id(other_id)? {
                duplicates.push(ContactMatch {
                    pair,
                    other_contact,
                });
            }
        }

        Ok(ContactDuplicates {
            target_contact,
            new_pairs,
            duplicates,
        })
    }

    // === Pair Operations ===

    /// Lists pending pairs with both contacts, highest score first.
    ///
    /// Pairs whose contacts no longer both exist are skipped.
    pub fn pending_duplicates(&self) -> DedupResult<Vec<PendingDuplicate>> {
        let mut pending = Vec::new();
        for pair in self.pairs.find_all_pending()? {
            let contact_a = self.contacts.find_by_id(pair.contact_a)?;
            let contact_b = self.contacts.find_by_id(pair.contact_b)?;
            if let (Some(contact_a), Some(contact_b)) = (contact_a, contact_b) {
                pending.push(PendingDuplicate {
                    pair,
                    contact_a,
                    contact_b,
                });
            }
        }
        Ok(pending)
    }

    /// Lists pending pairs at or above the high-confidence threshold.
    pub fn high_confidence_duplicates(&self) -> DedupResult<Vec<DuplicatePair>> {
        Ok(self
            .pairs
            .find_high_confidence(self.config.detection.high_confidence_threshold)?)
    }

    /// Gets a pair by id.
    pub fn get_pair(&self, pair_id: PairId) -> DedupResult<Option<DuplicatePair>> {
        Ok(self.pairs.find_by_id(pair_id)?)
    }

    /// Merges a pair, keeping `keep_contact_id` and deleting the other contact.
    pub fn merge(&self, pair_id: PairId, keep_contact_id: ContactId) -> DedupResult<MergeOutcome> {
        let outcome = self.resolver.merge(pair_id, keep_contact_id)?;
        self.events.dispatch(DedupEvent::PairMerged {
            pair_id,
            kept_contact_id: outcome.kept_contact_id,
            deleted_contact_id: outcome.deleted_contact_id,
        });
        Ok(outcome)
    }

    /// Marks a pair as not a duplicate.
    pub fn ignore(&self, pair_id: PairId) -> DedupResult<DuplicatePair> {
        let pair = self.resolver.ignore(pair_id)?;
        self.events.dispatch(DedupEvent::PairIgnored { pair_id });
        Ok(pair)
    }

    /// Aggregates counts over every recorded pair.
    pub fn stats(&self) -> DedupResult<DuplicateStats> {
        let pairs = self.pairs.find_all()?;
        Ok(DuplicateStats::from_pairs(
            &pairs,
            self.config.detection.high_confidence_threshold,
        ))
    }

    // === Event Operations ===

    /// Adds an event handler.
    ///
    /// Has no effect while a background scan holds the dispatcher.
    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        if let Some(events) = Arc::get_mut(&mut self.events) {
            events.add_handler(handler);
        }
    }

    /// Clears all event handlers.
    pub fn clear_event_handlers(&mut self) {
        if let Some(events) = Arc::get_mut(&mut self.events) {
            events.clear_handlers();
        }
    }

    // === Configuration ===

    /// Returns the current configuration.
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }
}

/// Runs a full scan, translating progress and outcome into events.
fn run_scan(
    engine: &DetectionEngine,
    events: &EventDispatcher,
    cancel: &CancelToken,
) -> Result<Vec<DuplicatePair>, DuplicateError> {
    events.dispatch(DedupEvent::ScanStarted);

    let result = engine.scan_all(cancel, |progress| {
        events.dispatch(DedupEvent::ScanProgress(progress))
    });

    match &result {
        Ok(pairs) => events.dispatch(DedupEvent::ScanFinished {
            new_pairs: pairs.len(),
        }),
        Err(DuplicateError::ScanCancelled) => events.dispatch(DedupEvent::ScanCancelled),
        Err(e) => {
            warn!(error = %e, "duplicate scan failed");
            events.dispatch(DedupEvent::ScanFailed {
                message: e.to_string(),
            })
        }
    }
    result
}
