// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Aggregate views over recorded pairs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::contact::Contact;
use crate::duplicate::{DuplicatePair, MatchType, PairStatus};

/// Counts over every recorded pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateStats {
    /// Number of recorded pairs, any status.
    pub total_duplicates: usize,
    /// Pairs per status. Statuses with no pairs are absent.
    pub status_breakdown: BTreeMap<PairStatus, usize>,
    /// Pending pairs per match type.
    pub match_type_breakdown: BTreeMap<MatchType, usize>,
    /// Pending pairs at or above the high-confidence threshold.
    pub high_confidence_duplicates: usize,
}

impl DuplicateStats {
    pub fn from_pairs(pairs: &[DuplicatePair], high_confidence_threshold: f64) -> Self {
        let mut stats = DuplicateStats {
            total_duplicates: pairs.len(),
            ..Default::default()
        };

        for pair in pairs {
            *stats.status_breakdown.entry(pair.status).or_default() += 1;

            if pair.status == PairStatus::Pending {
                *stats.match_type_breakdown.entry(pair.match_type).or_default() += 1;
                if pair.similarity_score >= high_confidence_threshold {
                    stats.high_confidence_duplicates += 1;
                }
            }
        }

        stats
    }

    /// Number of pairs with the given status.
    pub fn count(&self, status: PairStatus) -> usize {
        self.status_breakdown.get(&status).copied().unwrap_or(0)
    }
}

/// Result of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Pairs recorded by this scan.
    pub new_pairs: Vec<DuplicatePair>,
}

impl ScanSummary {
    pub fn duplicates_found(&self) -> usize {
        self.new_pairs.len()
    }

    /// New pairs per match type.
    pub fn match_type_counts(&self) -> BTreeMap<MatchType, usize> {
        let mut counts = BTreeMap::new();
        for pair in &self.new_pairs {
            *counts.entry(pair.match_type).or_default() += 1;
        }
        counts
    }
}

/// A pending pair with both contacts resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDuplicate {
    pub pair: DuplicatePair,
    pub contact_a: Contact,
    pub contact_b: Contact,
}

/// A pending pair seen from one of its contacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMatch {
    pub pair: DuplicatePair,
    pub other_contact: Contact,
}

/// Duplicates of a single contact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDuplicates {
    pub target_contact: Contact,
    /// Pairs recorded by this check.
    pub new_pairs: usize,
    /// Every pending pair involving the contact, highest score first.
    pub duplicates: Vec<ContactMatch>,
}
