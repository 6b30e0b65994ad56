// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Duplicate Detection Engine
//!
//! Compares every unordered pair of contacts and records the matches that
//! have not been recorded before.
//!
//! A full scan performs `n * (n - 1) / 2` comparisons, each dominated by the
//! edit distance between two names. Scoring runs in parallel; the rows of the
//! comparison triangle are processed in batches, and each batch is checked
//! against the pair store and persisted before the next one starts. A failed
//! or cancelled scan therefore keeps every batch flushed before it stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::error::DuplicateError;
use super::scorer::{score_with_threshold, MATCH_THRESHOLD};
use super::{DuplicateCandidate, DuplicatePair};
use crate::contact::{Contact, ContactId};
use crate::storage::{ContactStore, PairStore, StorageError};

/// Pending pairs scoring at least this much count as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// Default number of comparison rows scored between two flushes.
pub const DEFAULT_BATCH_ROWS: usize = 256;

/// Tunables for duplicate scans.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Minimum score for a pair to be recorded.
    pub match_threshold: f64,
    /// Minimum score for a pending pair to count as high confidence.
    pub high_confidence_threshold: f64,
    /// Contacts whose comparison rows are scored before each flush.
    pub batch_rows: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            match_threshold: MATCH_THRESHOLD,
            high_confidence_threshold: HIGH_CONFIDENCE_THRESHOLD,
            batch_rows: DEFAULT_BATCH_ROWS,
        }
    }
}

impl DetectionConfig {
    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    pub fn with_high_confidence_threshold(mut self, threshold: f64) -> Self {
        self.high_confidence_threshold = threshold;
        self
    }

    /// Sets the batch size. Zero is treated as one.
    pub fn with_batch_rows(mut self, rows: usize) -> Self {
        self.batch_rows = rows.max(1);
        self
    }
}

/// Shared flag that stops a running scan.
///
/// Cancellation is checked between comparisons; the batch in flight is
/// dropped without being persisted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress of a running scan, reported after each flushed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    /// Comparisons finished so far.
    pub compared: u64,
    /// Comparisons the scan will perform in total.
    pub total: u64,
    /// New pairs persisted so far.
    pub new_pairs: usize,
}

/// Scans contacts for duplicates and records new candidate pairs.
pub struct DetectionEngine {
    contacts: Arc<dyn ContactStore>,
    pairs: Arc<dyn PairStore>,
    config: DetectionConfig,
}

impl DetectionEngine {
    pub fn new(
        contacts: Arc<dyn ContactStore>,
        pairs: Arc<dyn PairStore>,
        config: DetectionConfig,
    ) -> Self {
        DetectionEngine {
            contacts,
            pairs,
            config,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Scans every pair of contacts and returns the newly recorded pairs.
    ///
    /// Pairs recorded by an earlier scan, whatever their status, are not
    /// recorded again. Running this twice on an unchanged contact set yields
    /// an empty list the second time.
    pub fn detect_all_duplicates(&self) -> Result<Vec<DuplicatePair>, DuplicateError> {
        self.scan_all(&CancelToken::new(), |_| {})
    }

    /// Like [`detect_all_duplicates`](Self::detect_all_duplicates), but
    /// stops on `cancel` and reports progress after each batch.
    pub fn scan_all<F>(
        &self,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<Vec<DuplicatePair>, DuplicateError>
    where
        F: FnMut(ScanProgress),
    {
        let contacts = self.contacts.list_all().map_err(scan_failed)?;
        let n = contacts.len();
        let total = comparisons(n);
        let threshold = self.config.match_threshold;

        info!(contacts = n, comparisons = total, "starting duplicate scan");

        let mut recorded = Vec::new();
        let mut compared = 0u64;
        let mut start = 0;

        while start < n {
            if cancel.is_cancelled() {
                return Err(cancelled(compared, total));
            }
            let end = (start + self.config.batch_rows).min(n);

            let candidates: Vec<DuplicateCandidate> = (start..end)
                .into_par_iter()
                .map(|i| {
                    let left = &contacts[i];
                    contacts[i + 1..]
                        .iter()
                        .take_while(|_| !cancel.is_cancelled())
                        .filter_map(|right| match_candidate(left, right, threshold))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect();

            if cancel.is_cancelled() {
                return Err(cancelled(compared, total));
            }

            let saved = self.record_new(candidates)?;
            compared += (start..end).map(|i| (n - i - 1) as u64).sum::<u64>();
            debug!(
                rows = end - start,
                new_pairs = saved.len(),
                compared,
                total,
                "flushed scan batch"
            );
            recorded.extend(saved);

            on_progress(ScanProgress {
                compared,
                total,
                new_pairs: recorded.len(),
            });
            start = end;
        }

        info!(new_pairs = recorded.len(), "duplicate scan finished");
        Ok(recorded)
    }

    /// Compares one contact against every other contact and returns the
    /// newly recorded pairs involving it.
    ///
    /// An unknown contact yields an empty list.
    pub fn find_duplicates_for_contact(
        &self,
        contact_id: ContactId,
    ) -> Result<Vec<DuplicatePair>, DuplicateError> {
        let Some(target) = self.contacts.find_by_id(contact_id).map_err(scan_failed)? else {
            debug!(contact_id, "contact not found, nothing to compare");
            return Ok(Vec::new());
        };

        let contacts = self.contacts.list_all().map_err(scan_failed)?;
        let threshold = self.config.match_threshold;

        let candidates: Vec<DuplicateCandidate> = contacts
            .par_iter()
            .filter(|other| other.id() != contact_id)
            .filter_map(|other| match_candidate(&target, other, threshold))
            .collect();

        let recorded = self.record_new(candidates)?;
        info!(contact_id, new_pairs = recorded.len(), "contact duplicate check finished");
        Ok(recorded)
    }

    /// Drops candidates already recorded, then persists the rest.
    fn record_new(
        &self,
        candidates: Vec<DuplicateCandidate>,
    ) -> Result<Vec<DuplicatePair>, DuplicateError> {
        let mut fresh = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let existing = self
                .pairs
                .find_existing(candidate.contact_a, candidate.contact_b)
                .map_err(scan_failed)?;
            if existing.is_none() {
                fresh.push(candidate);
            }
        }

        if fresh.is_empty() {
            return Ok(Vec::new());
        }
        // The store skips anything a concurrent scan recorded in the meantime
        self.pairs.save_all(fresh).map_err(scan_failed)
    }
}

fn match_candidate(a: &Contact, b: &Contact, threshold: f64) -> Option<DuplicateCandidate> {
    if a.id() == b.id() {
        return None;
    }
    let result = score_with_threshold(a, b, threshold);
    result
        .is_match
        .then(|| DuplicateCandidate::new(a.id(), b.id(), result.score, result.match_type))
}

fn comparisons(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}

fn scan_failed(e: StorageError) -> DuplicateError {
    warn!(error = %e, "store failure during duplicate scan");
    DuplicateError::ScanFailed(e)
}

fn cancelled(compared: u64, total: u64) -> DuplicateError {
    info!(compared, total, "duplicate scan cancelled");
    DuplicateError::ScanCancelled
}
