// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Storage Module
//!
//! Store traits consumed by the duplicate scanner and resolver, with an
//! in-memory implementation for tests and embedded use and a SQLite
//! implementation for persistent data.
//!
//! Both pair store implementations enforce uniqueness of the canonical
//! `(contact_a, contact_b)` tuple. That constraint is what keeps concurrent
//! scans from recording the same pair twice; the scanner's own lookup only
//! avoids wasted inserts.

mod error;
pub mod memory;

#[cfg(feature = "sqlite")]
mod contacts;
#[cfg(feature = "sqlite")]
pub mod migration;
#[cfg(feature = "sqlite")]
mod pairs;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use error::StorageError;
pub use memory::{InMemoryContactStore, InMemoryPairStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

use crate::contact::{Contact, ContactId};
use crate::duplicate::{DuplicateCandidate, DuplicatePair, PairId, PairStatus};

/// Source of contact records.
///
/// Implementations must be safe to share between threads.
pub trait ContactStore: Send + Sync {
    /// Lists every contact, ordered by id.
    fn list_all(&self) -> Result<Vec<Contact>, StorageError>;

    /// Loads a contact by id.
    fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, StorageError>;

    /// Deletes a contact. Returns false if it did not exist.
    fn delete_by_id(&self, id: ContactId) -> Result<bool, StorageError>;

    /// Inserts or replaces a contact under its own id.
    fn save(&self, contact: &Contact) -> Result<(), StorageError>;

    /// Stores a contact under a freshly assigned id and returns it with that id.
    fn create(&self, contact: Contact) -> Result<Contact, StorageError>;
}

/// Persistence for duplicate pairs and their resolution state.
///
/// Lookups by contact ids are order-independent.
pub trait PairStore: Send + Sync {
    /// Finds the pair recorded for two contacts, in either order.
    fn find_existing(
        &self,
        a: ContactId,
        b: ContactId,
    ) -> Result<Option<DuplicatePair>, StorageError>;

    /// Persists candidates as pending pairs.
    ///
    /// Candidates whose contact pair is already recorded are skipped. Returns
    /// only the pairs that were inserted, with their assigned ids.
    fn save_all(
        &self,
        candidates: Vec<DuplicateCandidate>,
    ) -> Result<Vec<DuplicatePair>, StorageError>;

    /// Loads a pair by id.
    fn find_by_id(&self, id: PairId) -> Result<Option<DuplicatePair>, StorageError>;

    /// Overwrites the mutable fields of an existing pair.
    ///
    /// `created_at` and the contact ids are never changed.
    fn save(&self, pair: &DuplicatePair) -> Result<(), StorageError>;

    /// Moves a pair from `expected` to `next` in one step.
    ///
    /// Returns false without writing if the pair's current status is not
    /// `expected`.
    fn update_status_if(
        &self,
        id: PairId,
        expected: PairStatus,
        next: PairStatus,
    ) -> Result<bool, StorageError>;

    /// Lists every pair, ordered by id.
    fn find_all(&self) -> Result<Vec<DuplicatePair>, StorageError>;

    /// Lists pending pairs, highest similarity first.
    fn find_all_pending(&self) -> Result<Vec<DuplicatePair>, StorageError>;

    /// Lists pending pairs that involve the given contact.
    fn find_pending_for_contact(
        &self,
        contact_id: ContactId,
    ) -> Result<Vec<DuplicatePair>, StorageError>;

    /// Lists pending pairs scoring at least `threshold`, highest first.
    fn find_high_confidence(&self, threshold: f64) -> Result<Vec<DuplicatePair>, StorageError>;
}

/// Sorts pairs by similarity score, highest first, then by id.
pub(crate) fn sort_by_score_desc(pairs: &mut [DuplicatePair]) {
    pairs.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
}
