// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory stores.
//!
//! Thread-safe implementations of [`ContactStore`] and [`PairStore`] backed by
//! `RwLock`-guarded maps. Data does not survive the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{sort_by_score_desc, ContactStore, PairStore, StorageError};
use crate::contact::{Contact, ContactId};
use crate::duplicate::{canonical_pair, DuplicateCandidate, DuplicatePair, PairId, PairStatus};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::LockPoisoned(context)
}

#[derive(Debug, Default)]
struct ContactTable {
    by_id: BTreeMap<ContactId, Contact>,
    /// Highest id ever stored. Ids of deleted contacts are not handed out again.
    last_id: ContactId,
}

/// In-memory contact store.
#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    contacts: RwLock<ContactTable>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given contacts, keyed by their ids.
    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let by_id: BTreeMap<ContactId, Contact> =
            contacts.into_iter().map(|c| (c.id(), c)).collect();
        let last_id = by_id.keys().next_back().copied().unwrap_or(0);
        InMemoryContactStore {
            contacts: RwLock::new(ContactTable { by_id, last_id }),
        }
    }

    /// Returns the number of stored contacts.
    pub fn len(&self) -> usize {
        self.contacts.read().map(|t| t.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContactStore for InMemoryContactStore {
    fn list_all(&self) -> Result<Vec<Contact>, StorageError> {
        let contacts = self.contacts.read().map_err(|_| lock_err("contacts.list"))?;
        Ok(contacts.by_id.values().cloned().collect())
    }

    fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, StorageError> {
        let contacts = self.contacts.read().map_err(|_| lock_err("contacts.find"))?;
        Ok(contacts.by_id.get(&id).cloned())
    }

    fn delete_by_id(&self, id: ContactId) -> Result<bool, StorageError> {
        let mut contacts = self.contacts.write().map_err(|_| lock_err("contacts.delete"))?;
        Ok(contacts.by_id.remove(&id).is_some())
    }

    fn save(&self, contact: &Contact) -> Result<(), StorageError> {
        let mut contacts = self.contacts.write().map_err(|_| lock_err("contacts.save"))?;
        contacts.last_id = contacts.last_id.max(contact.id());
        contacts.by_id.insert(contact.id(), contact.clone());
        Ok(())
    }

    fn create(&self, contact: Contact) -> Result<Contact, StorageError> {
        let mut contacts = self.contacts.write().map_err(|_| lock_err("contacts.create"))?;
        contacts.last_id += 1;
        let id = contacts.last_id;
        let contact = contact.with_id(id);
        contacts.by_id.insert(id, contact.clone());
        Ok(contact)
    }
}

#[derive(Debug, Default)]
struct PairTable {
    by_id: BTreeMap<PairId, DuplicatePair>,
    /// Canonical contact tuple to pair id. Acts as the uniqueness constraint.
    by_contacts: HashMap<(ContactId, ContactId), PairId>,
    last_id: PairId,
}

/// In-memory duplicate pair store.
#[derive(Debug, Default)]
pub struct InMemoryPairStore {
    table: RwLock<PairTable>,
}

impl InMemoryPairStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(
        &self,
        context: &'static str,
        keep: impl Fn(&DuplicatePair) -> bool,
    ) -> Result<Vec<DuplicatePair>, StorageError> {
        let table = self.table.read().map_err(|_| lock_err(context))?;
        let mut pairs: Vec<DuplicatePair> =
            table.by_id.values().filter(|p| keep(p)).cloned().collect();
        sort_by_score_desc(&mut pairs);
        Ok(pairs)
    }
}

impl PairStore for InMemoryPairStore {
    fn find_existing(
        &self,
        a: ContactId,
        b: ContactId,
    ) -> Result<Option<DuplicatePair>, StorageError> {
        let table = self.table.read().map_err(|_| lock_err("pairs.find_existing"))?;
        Ok(table
            .by_contacts
            .get(&canonical_pair(a, b))
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    fn save_all(
        &self,
        candidates: Vec<DuplicateCandidate>,
    ) -> Result<Vec<DuplicatePair>, StorageError> {
        let mut table = self.table.write().map_err(|_| lock_err("pairs.save_all"))?;
        let mut inserted = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let key = canonical_pair(candidate.contact_a, candidate.contact_b);
            if table.by_contacts.contains_key(&key) {
                continue;
            }
            table.last_id += 1;
            let id = table.last_id;
            let pair = candidate.into_pair(id);
            table.by_contacts.insert(key, id);
            table.by_id.insert(id, pair.clone());
            inserted.push(pair);
        }

        Ok(inserted)
    }

    fn find_by_id(&self, id: PairId) -> Result<Option<DuplicatePair>, StorageError> {
        let table = self.table.read().map_err(|_| lock_err("pairs.find"))?;
        Ok(table.by_id.get(&id).cloned())
    }

    fn save(&self, pair: &DuplicatePair) -> Result<(), StorageError> {
        let mut table = self.table.write().map_err(|_| lock_err("pairs.save"))?;
        let stored = table
            .by_id
            .get_mut(&pair.id)
            .ok_or_else(|| StorageError::NotFound(format!("duplicate pair {}", pair.id)))?;
        stored.similarity_score = pair.similarity_score;
        stored.match_type = pair.match_type;
        stored.status = pair.status;
        Ok(())
    }

    fn update_status_if(
        &self,
        id: PairId,
        expected: PairStatus,
        next: PairStatus,
    ) -> Result<bool, StorageError> {
        let mut table = self.table.write().map_err(|_| lock_err("pairs.update_status"))?;
        match table.by_id.get_mut(&id) {
            Some(pair) if pair.status == expected => {
                pair.status = next;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StorageError::NotFound(format!("duplicate pair {}", id))),
        }
    }

    fn find_all(&self) -> Result<Vec<DuplicatePair>, StorageError> {
        let table = self.table.read().map_err(|_| lock_err("pairs.find_all"))?;
        Ok(table.by_id.values().cloned().collect())
    }

    fn find_all_pending(&self) -> Result<Vec<DuplicatePair>, StorageError> {
        self.filtered("pairs.pending", |p| p.status == PairStatus::Pending)
    }

    fn find_pending_for_contact(
        &self,
        contact_id: ContactId,
    ) -> Result<Vec<DuplicatePair>, StorageError> {
        self.filtered("pairs.pending_for_contact", |p| {
            p.status == PairStatus::Pending && p.involves(contact_id)
        })
    }

    fn find_high_confidence(&self, threshold: f64) -> Result<Vec<DuplicatePair>, StorageError> {
        self.filtered("pairs.high_confidence", |p| {
            p.status == PairStatus::Pending && p.similarity_score >= threshold
        })
    }
}
