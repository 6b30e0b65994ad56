// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Duplicate detection error types.

use thiserror::Error;

use super::{PairId, PairStatus};
use crate::contact::ContactId;
use crate::storage::StorageError;

/// Errors from scanning and resolving duplicate pairs.
#[derive(Error, Debug)]
pub enum DuplicateError {
    /// The requested contact does not exist.
    #[error("contact not found: {0}")]
    ContactNotFound(ContactId),

    /// The requested duplicate pair does not exist.
    #[error("duplicate pair not found: {0}")]
    DuplicatePairNotFound(PairId),

    /// The contact to keep is not part of the pair.
    #[error(
        "contact {keep_contact_id} is not part of duplicate pair {pair_id} \
         (expected {contact_a} or {contact_b})"
    )]
    InvalidMergeTarget {
        pair_id: PairId,
        keep_contact_id: ContactId,
        contact_a: ContactId,
        contact_b: ContactId,
    },

    /// The pair was already merged or ignored.
    #[error("duplicate pair {pair_id} is already {status}")]
    AlreadyResolved { pair_id: PairId, status: PairStatus },

    /// A store failed while a scan was running. Batches persisted before the
    /// failure are kept.
    #[error("duplicate scan failed: {0}")]
    ScanFailed(#[source] StorageError),

    /// The scan was cancelled before it finished.
    #[error("duplicate scan cancelled")]
    ScanCancelled,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
