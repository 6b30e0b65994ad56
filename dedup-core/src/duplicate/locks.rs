// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-contact locks for pair resolution.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use crate::contact::ContactId;
use crate::storage::StorageError;

/// Set of contact ids currently held by a resolution.
///
/// A caller locks both contacts of a pair at once, so two resolutions that
/// share a contact run one after the other while unrelated pairs proceed in
/// parallel.
#[derive(Default)]
pub(crate) struct ContactLocks {
    held: Mutex<HashSet<ContactId>>,
    released: Condvar,
}

impl ContactLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blocks until none of `ids` is held, then holds all of them.
    pub(crate) fn acquire(&self, ids: &[ContactId]) -> Result<ContactGuard<'_>, StorageError> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| StorageError::LockPoisoned("resolver.contact_locks"))?;

        while ids.iter().any(|id| held.contains(id)) {
            held = self
                .released
                .wait(held)
                .map_err(|_| StorageError::LockPoisoned("resolver.contact_locks"))?;
        }
        held.extend(ids.iter().copied());

        Ok(ContactGuard {
            locks: self,
            ids: ids.to_vec(),
        })
    }
}

/// Releases its contacts when dropped.
pub(crate) struct ContactGuard<'a> {
    locks: &'a ContactLocks,
    ids: Vec<ContactId>,
}

impl Drop for ContactGuard<'_> {
    fn drop(&mut self) {
        // A poisoned set still has to release, otherwise waiters hang forever.
        let mut held = match self.locks.held.lock() {
            Ok(held) => held,
            Err(poisoned) => poisoned.into_inner(),
        };
        for id in &self.ids {
            held.remove(id);
        }
        self.locks.released.notify_all();
    }
}
