// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Duplicate Detection
//!
//! Pairwise similarity scoring, scanning and resolution of duplicate
//! contacts.
//!
//! - [`scorer`] - Pure similarity scoring between two contacts
//! - [`engine`] - Pairwise scans that record new candidate pairs
//! - [`resolver`] - Merge / ignore decisions on recorded pairs
//!
//! A recorded pair always stores the lower contact id in `contact_a`, so the
//! pairs `(a, b)` and `(b, a)` map to the same record.

pub mod engine;
mod error;
mod locks;
pub mod resolver;
pub mod scorer;

pub use engine::{CancelToken, DetectionConfig, DetectionEngine, ScanProgress};
pub use error::DuplicateError;
pub use resolver::{MergeOutcome, MergeResolver};
pub use scorer::{score, MatchResult, MATCH_THRESHOLD};

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::contact::ContactId;

/// Identifier of a recorded duplicate pair.
pub type PairId = i64;

/// The signal that produced a pair's winning similarity score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    /// Case-insensitive email equality.
    EmailExact,
    /// Digit-normalized phone equality.
    PhoneExact,
    /// Fuzzy full-name similarity.
    NameFuzzy,
    /// Same email domain plus similar names.
    EmailDomainName,
    /// Partial phone overlap.
    PhoneFuzzy,
}

impl MatchType {
    pub const ALL: [MatchType; 5] = [
        MatchType::EmailExact,
        MatchType::PhoneExact,
        MatchType::NameFuzzy,
        MatchType::EmailDomainName,
        MatchType::PhoneFuzzy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::EmailExact => "EMAIL_EXACT",
            MatchType::PhoneExact => "PHONE_EXACT",
            MatchType::NameFuzzy => "NAME_FUZZY",
            MatchType::EmailDomainName => "EMAIL_DOMAIN_NAME",
            MatchType::PhoneFuzzy => "PHONE_FUZZY",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Resolution state of a duplicate pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairStatus {
    /// Awaiting a decision.
    Pending,
    /// The contacts were merged; the discarded contact was deleted.
    Merged,
    /// The pair was judged not to be a duplicate.
    Ignored,
}

impl PairStatus {
    pub const ALL: [PairStatus; 3] = [PairStatus::Pending, PairStatus::Merged, PairStatus::Ignored];

    pub fn as_str(&self) -> &'static str {
        match self {
            PairStatus::Pending => "PENDING",
            PairStatus::Merged => "MERGED",
            PairStatus::Ignored => "IGNORED",
        }
    }

    /// Returns true for states with no outgoing transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PairStatus::Pending)
    }
}

impl fmt::Display for PairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PairStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PairStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// A stored enum value that does not name any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// A scored candidate that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCandidate {
    /// Lower of the two contact ids.
    pub contact_a: ContactId,
    /// Higher of the two contact ids.
    pub contact_b: ContactId,
    /// Similarity score (0.0 to 1.0).
    pub similarity_score: f64,
    pub match_type: MatchType,
    /// Unix timestamp (seconds) of detection.
    pub created_at: u64,
}

impl DuplicateCandidate {
    /// Creates a candidate, storing the ids in canonical order.
    pub fn new(id1: ContactId, id2: ContactId, similarity_score: f64, match_type: MatchType) -> Self {
        let (contact_a, contact_b) = canonical_pair(id1, id2);
        DuplicateCandidate {
            contact_a,
            contact_b,
            similarity_score,
            match_type,
            created_at: now_secs(),
        }
    }

    /// Attaches a store-assigned id, yielding a pending pair.
    pub fn into_pair(self, id: PairId) -> DuplicatePair {
        DuplicatePair {
            id,
            contact_a: self.contact_a,
            contact_b: self.contact_b,
            similarity_score: self.similarity_score,
            match_type: self.match_type,
            status: PairStatus::Pending,
            created_at: self.created_at,
        }
    }
}

/// A recorded pair of contacts that likely describe the same person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePair {
    pub id: PairId,
    /// Lower of the two contact ids.
    pub contact_a: ContactId,
    /// Higher of the two contact ids.
    pub contact_b: ContactId,
    /// Similarity score (0.0 to 1.0).
    pub similarity_score: f64,
    pub match_type: MatchType,
    pub status: PairStatus,
    /// Unix timestamp (seconds) of detection. Never changes.
    pub created_at: u64,
}

impl DuplicatePair {
    /// Returns true if `contact_id` is one of the two contacts of this pair.
    pub fn involves(&self, contact_id: ContactId) -> bool {
        self.contact_a == contact_id || self.contact_b == contact_id
    }

    /// Returns the id on the other side of the pair from `contact_id`.
    pub fn other(&self, contact_id: ContactId) -> Option<ContactId> {
        if contact_id == self.contact_a {
            Some(self.contact_b)
        } else if contact_id == self.contact_b {
            Some(self.contact_a)
        } else {
            None
        }
    }
}

/// Orders two contact ids so the lower one comes first.
pub fn canonical_pair(a: ContactId, b: ContactId) -> (ContactId, ContactId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
