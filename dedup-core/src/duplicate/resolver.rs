// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Merge Resolver
//!
//! Applies user decisions to recorded pairs. `PENDING` moves to `MERGED` or
//! `IGNORED`; both are terminal, and resolving a terminal pair again fails
//! with [`DuplicateError::AlreadyResolved`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::error::DuplicateError;
use super::locks::ContactLocks;
use super::{DuplicatePair, PairId, PairStatus};
use crate::contact::ContactId;
use crate::storage::{ContactStore, PairStore};

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub pair_id: PairId,
    pub kept_contact_id: ContactId,
    pub deleted_contact_id: ContactId,
}

/// Resolves duplicate pairs.
///
/// Resolutions touching the same contact are serialized, so a contact can
/// not be deleted by one merge while another merge is validating it.
pub struct MergeResolver {
    contacts: Arc<dyn ContactStore>,
    pairs: Arc<dyn PairStore>,
    locks: ContactLocks,
}

impl MergeResolver {
    pub fn new(contacts: Arc<dyn ContactStore>, pairs: Arc<dyn PairStore>) -> Self {
        MergeResolver {
            contacts,
            pairs,
            locks: ContactLocks::new(),
        }
    }

    /// Keeps `keep_contact_id`, deletes the other contact of the pair and
    /// marks the pair merged.
    ///
    /// Nothing is deleted unless the pair is pending, `keep_contact_id` is
    /// one of its contacts, and both contacts still exist.
    pub fn merge(
        &self,
        pair_id: PairId,
        keep_contact_id: ContactId,
    ) -> Result<MergeOutcome, DuplicateError> {
        let pair = self.load(pair_id)?;
        let _guard = self.locks.acquire(&[pair.contact_a, pair.contact_b])?;
        // Re-read under the lock; another resolution may have finished first
        let pair = self.load_pending(pair_id)?;

        let discard_contact_id = pair
            .other(keep_contact_id)
            .ok_or(DuplicateError::InvalidMergeTarget {
                pair_id,
                keep_contact_id,
                contact_a: pair.contact_a,
                contact_b: pair.contact_b,
            })?;

        for id in [keep_contact_id, discard_contact_id] {
            if self.contacts.find_by_id(id)?.is_none() {
                return Err(DuplicateError::ContactNotFound(id));
            }
        }

        // Claim before deleting. A resolver that loses the claim deletes nothing.
        self.transition(pair_id, PairStatus::Merged)?;
        match self.contacts.delete_by_id(discard_contact_id) {
            Ok(true) => {}
            Ok(false) => {
                self.release(pair_id);
                return Err(DuplicateError::ContactNotFound(discard_contact_id));
            }
            Err(e) => {
                self.release(pair_id);
                return Err(e.into());
            }
        }

        info!(
            pair_id,
            kept = keep_contact_id,
            deleted = discard_contact_id,
            "merged duplicate contacts"
        );
        Ok(MergeOutcome {
            pair_id,
            kept_contact_id: keep_contact_id,
            deleted_contact_id: discard_contact_id,
        })
    }

    /// Marks the pair as not a duplicate. Contacts are untouched.
    pub fn ignore(&self, pair_id: PairId) -> Result<DuplicatePair, DuplicateError> {
        let pair = self.load(pair_id)?;
        let _guard = self.locks.acquire(&[pair.contact_a, pair.contact_b])?;
        let mut pair = self.load_pending(pair_id)?;

        self.transition(pair_id, PairStatus::Ignored)?;
        pair.status = PairStatus::Ignored;

        info!(pair_id, "ignored duplicate pair");
        Ok(pair)
    }

    fn load(&self, pair_id: PairId) -> Result<DuplicatePair, DuplicateError> {
        self.pairs
            .find_by_id(pair_id)?
            .ok_or(DuplicateError::DuplicatePairNotFound(pair_id))
    }

    fn load_pending(&self, pair_id: PairId) -> Result<DuplicatePair, DuplicateError> {
        let pair = self.load(pair_id)?;
        if pair.status.is_terminal() {
            return Err(DuplicateError::AlreadyResolved {
                pair_id,
                status: pair.status,
            });
        }
        Ok(pair)
    }

    /// Conditional `PENDING -> next` update. Only one resolver wins the
    /// update, including resolvers in other processes sharing the store.
    fn transition(&self, pair_id: PairId, next: PairStatus) -> Result<(), DuplicateError> {
        if self
            .pairs
            .update_status_if(pair_id, PairStatus::Pending, next)?
        {
            return Ok(());
        }
        let status = self.load(pair_id)?.status;
        Err(DuplicateError::AlreadyResolved { pair_id, status })
    }

    /// Hands a claimed pair back to `PENDING` after a failed delete.
    fn release(&self, pair_id: PairId) {
        if let Err(e) = self
            .pairs
            .update_status_if(pair_id, PairStatus::Merged, PairStatus::Pending)
        {
            warn!(pair_id, error = %e, "failed to release merge claim");
        }
    }
}
