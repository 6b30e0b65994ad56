// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test Fixtures
//!
//! Contact builders and store wrappers that fail on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use dedup_core::{
    Contact, ContactId, ContactStore, DetectionConfig, DetectionEngine, DuplicateCandidate,
    DuplicatePair, InMemoryContactStore, InMemoryPairStore, MergeResolver, PairId, PairStatus,
    PairStore, StorageError,
};

/// A contact with first and last name.
pub fn person(id: ContactId, first: &str, last: &str) -> Contact {
    Contact::new(id).with_first_name(first).with_last_name(last)
}

/// In-memory stores holding `contacts`.
pub fn memory_stores(
    contacts: Vec<Contact>,
) -> (Arc<InMemoryContactStore>, Arc<InMemoryPairStore>) {
    (
        Arc::new(InMemoryContactStore::with_contacts(contacts)),
        Arc::new(InMemoryPairStore::new()),
    )
}

/// Engine over in-memory stores, returning the stores for inspection.
pub fn memory_engine(
    contacts: Vec<Contact>,
) -> (DetectionEngine, Arc<InMemoryContactStore>, Arc<InMemoryPairStore>) {
    let (contact_store, pair_store) = memory_stores(contacts);
    let engine = DetectionEngine::new(
        contact_store.clone(),
        pair_store.clone(),
        DetectionConfig::default(),
    );
    (engine, contact_store, pair_store)
}

/// Resolver over in-memory stores, returning the stores for inspection.
pub fn memory_resolver(
    contacts: Vec<Contact>,
) -> (MergeResolver, Arc<InMemoryContactStore>, Arc<InMemoryPairStore>) {
    let (contact_store, pair_store) = memory_stores(contacts);
    let resolver = MergeResolver::new(contact_store.clone(), pair_store.clone());
    (resolver, contact_store, pair_store)
}

/// Records a pending pair directly in the store.
pub fn record_pair(store: &InMemoryPairStore, a: ContactId, b: ContactId, score: f64) -> DuplicatePair {
    let candidate =
        DuplicateCandidate::new(a, b, score, dedup_core::MatchType::NameFuzzy);
    store
        .save_all(vec![candidate])
        .expect("save pair")
        .pop()
        .expect("pair inserted")
}

fn unavailable(what: &str) -> StorageError {
    StorageError::Unavailable(format!("{} offline", what))
}

/// Contact store whose `list_all` and `delete_by_id` fail while `offline` is set.
#[derive(Default)]
pub struct FlakyContactStore {
    pub inner: InMemoryContactStore,
    pub offline: AtomicBool,
}

impl FlakyContactStore {
    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        FlakyContactStore {
            inner: InMemoryContactStore::with_contacts(contacts),
            offline: AtomicBool::new(false),
        }
    }
}

impl ContactStore for FlakyContactStore {
    fn list_all(&self) -> Result<Vec<Contact>, StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable("contact store"));
        }
        self.inner.list_all()
    }

    fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, StorageError> {
        self.inner.find_by_id(id)
    }

    fn delete_by_id(&self, id: ContactId) -> Result<bool, StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable("contact store"));
        }
        self.inner.delete_by_id(id)
    }

    fn save(&self, contact: &Contact) -> Result<(), StorageError> {
        self.inner.save(contact)
    }

    fn create(&self, contact: Contact) -> Result<Contact, StorageError> {
        self.inner.create(contact)
    }
}

/// Pair store whose `save_all` fails once it has succeeded `allowed_saves` times.
pub struct FlakyPairStore {
    pub inner: InMemoryPairStore,
    allowed_saves: usize,
    saves: AtomicUsize,
}

impl FlakyPairStore {
    pub fn failing_after(allowed_saves: usize) -> Self {
        FlakyPairStore {
            inner: InMemoryPairStore::new(),
            allowed_saves,
            saves: AtomicUsize::new(0),
        }
    }
}

impl PairStore for FlakyPairStore {
    fn find_existing(
        &self,
        a: ContactId,
        b: ContactId,
    ) -> Result<Option<DuplicatePair>, StorageError> {
        self.inner.find_existing(a, b)
    }

    fn save_all(
        &self,
        candidates: Vec<DuplicateCandidate>,
    ) -> Result<Vec<DuplicatePair>, StorageError> {
        if self.saves.fetch_add(1, Ordering::SeqCst) >= self.allowed_saves {
            return Err(unavailable("pair store"));
        }
        self.inner.save_all(candidates)
    }

    fn find_by_id(&self, id: PairId) -> Result<Option<DuplicatePair>, StorageError> {
        self.inner.find_by_id(id)
    }

    fn save(&self, pair: &DuplicatePair) -> Result<(), StorageError> {
        self.inner.save(pair)
    }

    fn update_status_if(
        &self,
        id: PairId,
        expected: PairStatus,
        next: PairStatus,
    ) -> Result<bool, StorageError> {
        self.inner.update_status_if(id, expected, next)
    }

    fn find_all(&self) -> Result<Vec<DuplicatePair>, StorageError> {
        self.inner.find_all()
    }

    fn find_all_pending(&self) -> Result<Vec<DuplicatePair>, StorageError> {
        self.inner.find_all_pending()
    }

    fn find_pending_for_contact(
        &self,
        contact_id: ContactId,
    ) -> Result<Vec<DuplicatePair>, StorageError> {
        self.inner.find_pending_for_contact(contact_id)
    }

    fn find_high_confidence(&self, threshold: f64) -> Result<Vec<DuplicatePair>, StorageError> {
        self.inner.find_high_confidence(threshold)
    }
}
