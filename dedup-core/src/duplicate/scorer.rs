// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Contact Similarity Scoring
//!
//! Computes a match signal between two contacts. Exact email and exact phone
//! matches short-circuit; otherwise the best of the fuzzy name, email domain
//! and partial phone signals wins.
//!
//! Phones are compared by their digits only. A phone with no digits at all
//! (`"n/a"`, `"none"`) is treated as missing, so two such values never
//! produce a phone signal.
//!
//! Scoring is symmetric: `score(a, b)` and `score(b, a)` return the same
//! value and the same [`MatchType`].

use std::collections::HashSet;

use crate::contact::Contact;

use super::MatchType;

/// Minimum score for a pair to count as a duplicate.
pub const MATCH_THRESHOLD: f64 = 0.75;

const EMAIL_EXACT_SCORE: f64 = 1.0;
const PHONE_EXACT_SCORE: f64 = 0.95;
/// Weight applied to the name score when both emails share a domain.
const DOMAIN_NAME_WEIGHT: f64 = 0.8;
/// Both first and last name similarities must exceed this for a full component match.
const COMPONENT_STRONG: f64 = 0.8;
/// Penalty when only one name component matches well.
const COMPONENT_PARTIAL_WEIGHT: f64 = 0.7;
const PHONE_CONTAINS_SCORE: f64 = 0.85;
const PHONE_LOCAL_SCORE: f64 = 0.8;
/// Length of the local part of a phone number.
const PHONE_LOCAL_DIGITS: usize = 7;
/// Shortest digit string treated as a full national number.
const PHONE_NATIONAL_DIGITS: usize = 10;
/// Longest prefix accepted as a country code, `00` included.
const PHONE_COUNTRY_PREFIX_DIGITS: usize = 4;

/// Outcome of comparing two contacts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Whether the score reached the threshold.
    pub is_match: bool,
    /// Similarity score (0.0 to 1.0).
    pub score: f64,
    /// Signal that produced the score.
    pub match_type: MatchType,
}

/// Scores two contacts against [`MATCH_THRESHOLD`].
pub fn score(a: &Contact, b: &Contact) -> MatchResult {
    score_with_threshold(a, b, MATCH_THRESHOLD)
}

/// Scores two contacts, deciding `is_match` against `threshold`.
pub fn score_with_threshold(a: &Contact, b: &Contact, threshold: f64) -> MatchResult {
    let emails = a.usable_email().zip(b.usable_email());
    if let Some((email_a, email_b)) = emails {
        if email_a.trim().to_lowercase() == email_b.trim().to_lowercase() {
            return MatchResult {
                is_match: EMAIL_EXACT_SCORE >= threshold,
                score: EMAIL_EXACT_SCORE,
                match_type: MatchType::EmailExact,
            };
        }
    }

    let phones = a
        .usable_phone()
        .zip(b.usable_phone())
        .map(|(p, q)| (normalize_phone(p), normalize_phone(q)))
        .filter(|(p, q)| !p.is_empty() && !q.is_empty());
    if let Some((phone_a, phone_b)) = &phones {
        if same_number(phone_a, phone_b) {
            return MatchResult {
                is_match: PHONE_EXACT_SCORE >= threshold,
                score: PHONE_EXACT_SCORE,
                match_type: MatchType::PhoneExact,
            };
        }
    }

    let name_score = name_similarity(a, b);
    let mut best = name_score;
    let mut match_type = MatchType::NameFuzzy;

    if let Some((email_a, email_b)) = emails {
        let domain_a = email_domain(email_a);
        if !domain_a.is_empty() && domain_a == email_domain(email_b) {
            let candidate = name_score * DOMAIN_NAME_WEIGHT;
            if candidate > best {
                best = candidate;
                match_type = MatchType::EmailDomainName;
            }
        }
    }

    if let Some((phone_a, phone_b)) = &phones {
        let candidate = phone_similarity(phone_a, phone_b);
        if candidate > best {
            best = candidate;
            match_type = MatchType::PhoneFuzzy;
        }
    }

    MatchResult {
        is_match: best >= threshold,
        score: best,
        match_type,
    }
}

/// Fuzzy similarity of two contacts' names (0.0 to 1.0).
///
/// The maximum of edit-distance similarity over the full names, token-set
/// Jaccard similarity, and first/last component similarity. Returns 0.0 if
/// either contact has no name at all.
pub fn name_similarity(a: &Contact, b: &Contact) -> f64 {
    let name_a = a.full_name().to_lowercase();
    let name_b = b.full_name().to_lowercase();

    if name_a.is_empty() || name_b.is_empty() {
        return 0.0;
    }
    if name_a == name_b {
        return 1.0;
    }

    edit_similarity(&name_a, &name_b)
        .max(jaccard_similarity(&name_a, &name_b))
        .max(component_similarity(a, b))
}

/// Compares first and last names independently.
fn component_similarity(a: &Contact, b: &Contact) -> f64 {
    let first = field_similarity(a.first_name(), b.first_name());
    let last = field_similarity(a.last_name(), b.last_name());

    if first > COMPONENT_STRONG && last > COMPONENT_STRONG {
        (first + last) / 2.0
    } else {
        first.max(last) * COMPONENT_PARTIAL_WEIGHT
    }
}

fn field_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    edit_similarity(&a, &b)
}

/// `1 - levenshtein(a, b) / max(len a, len b)`, lengths in characters.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Classic edit distance with unit insert, delete and substitute costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in table[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1]
            } else {
                1 + table[i - 1][j]
                    .min(table[i][j - 1])
                    .min(table[i - 1][j - 1])
            };
        }
    }

    table[a.len()][b.len()]
}

/// Jaccard similarity of the whitespace-separated token sets.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();

    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        return 0.0;
    }
    tokens_a.intersection(&tokens_b).count() as f64 / union as f64
}

/// Whether two digit-only numbers name the same line.
///
/// Equal strings match, and so does a full national number against the same
/// number with a country code in front (`9876543210` / `919876543210`).
fn same_number(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.len() >= PHONE_NATIONAL_DIGITS
        && long.len() - short.len() <= PHONE_COUNTRY_PREFIX_DIGITS
        && long.ends_with(short)
}

/// Similarity of two digit-only phone numbers.
fn phone_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.contains(b) || b.contains(a) {
        return PHONE_CONTAINS_SCORE;
    }
    if a.len() >= PHONE_LOCAL_DIGITS
        && b.len() >= PHONE_LOCAL_DIGITS
        && a[a.len() - PHONE_LOCAL_DIGITS..] == b[b.len() - PHONE_LOCAL_DIGITS..]
    {
        return PHONE_LOCAL_SCORE;
    }
    0.0
}

/// Strips every non-digit character.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The lower-cased part after the last `@`, or empty if there is none.
fn email_domain(email: &str) -> String {
    email
        .trim()
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .unwrap_or_default()
}
