// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Tests
//!
//! End-to-end tests for the `Dedup` orchestrator: scans, checks,
//! resolutions, statistics, events and persistence.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use common::fixtures::{memory_stores, person, record_pair};
use dedup_core::{
    CallbackHandler, ChannelHandler, Contact, ContactStore, Dedup, DedupConfig, DedupError,
    DedupEvent, DetectionConfig, DuplicateError, MatchType, PairStatus,
};

fn dedup_with(contacts: &[Contact]) -> Dedup {
    let dedup = Dedup::in_memory().unwrap();
    for contact in contacts {
        dedup.add_contact(contact.clone()).unwrap();
    }
    dedup
}

fn drain(rx: &mpsc::Receiver<DedupEvent>) -> Vec<DedupEvent> {
    rx.try_iter().collect()
}

// ============================================================
// Contacts
// ============================================================

#[test]
fn test_add_contact_assigns_ids() {
    let dedup = Dedup::in_memory().unwrap();

    let ann = dedup
        .add_contact(Contact::draft().with_first_name("Ann"))
        .unwrap();
    let bob = dedup
        .add_contact(Contact::draft().with_first_name("Bob"))
        .unwrap();

    assert_ne!(ann.id(), bob.id());
    assert_eq!(dedup.get_contact(ann.id()).unwrap(), Some(ann));
    assert_eq!(dedup.list_contacts().unwrap().len(), 2);
}

// ============================================================
// Scanning
// ============================================================

#[test]
fn test_scan_summary() {
    let dedup = dedup_with(&[
        Contact::draft().with_email("a@b.com"),
        Contact::draft().with_email("A@B.com"),
        Contact::draft().with_phone("9876543210"),
        Contact::draft().with_phone("+91 98765 43210"),
        Contact::draft().with_first_name("Zed"),
    ]);

    let summary = dedup.scan().unwrap();

    assert_eq!(summary.duplicates_found(), 2);
    let counts = summary.match_type_counts();
    assert_eq!(counts.get(&MatchType::EmailExact), Some(&1));
    assert_eq!(counts.get(&MatchType::PhoneExact), Some(&1));

    assert!(dedup.scan().unwrap().new_pairs.is_empty());
}

#[test]
fn test_scan_emits_events() {
    let mut dedup = dedup_with(&[
        Contact::draft().with_email("a@b.com"),
        Contact::draft().with_email("a@b.com"),
    ]);
    let (tx, rx) = mpsc::channel();
    dedup.add_event_handler(Arc::new(ChannelHandler::new(tx)));

    dedup.scan().unwrap();

    let events = drain(&rx);
    assert_eq!(events.first(), Some(&DedupEvent::ScanStarted));
    assert_eq!(
        events.last(),
        Some(&DedupEvent::ScanFinished { new_pairs: 1 })
    );
    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            DedupEvent::ScanProgress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert_eq!(progress.last().map(|p| (p.compared, p.total)), Some((1, 1)));
}

#[test]
fn test_background_scan() {
    let dedup = dedup_with(&[
        person(0, "John", "Smith"),
        person(0, "Jon", "Smith"),
    ]);

    let task = dedup.spawn_scan();
    let pairs = task.join().unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].match_type, MatchType::NameFuzzy);
    assert_eq!(dedup.pending_duplicates().unwrap().len(), 1);
}

#[test]
fn test_cancelled_background_scan_keeps_flushed_batch() {
    let config = DedupConfig::in_memory()
        .with_detection(DetectionConfig::default().with_batch_rows(1));
    let mut dedup = Dedup::new(config).unwrap();
    for email in ["x@example.com", "x@example.com", "y@example.com", "y@example.com"] {
        dedup
            .add_contact(Contact::draft().with_email(email))
            .unwrap();
    }

    // Park the scan thread on its first progress report until cancelled
    let (progress_tx, progress_rx) = mpsc::channel::<()>();
    let (resume_tx, resume_rx) = mpsc::channel::<()>();
    let progress_tx = Mutex::new(progress_tx);
    let resume_rx = Mutex::new(resume_rx);
    let parked = AtomicBool::new(false);
    let (event_tx, event_rx) = mpsc::channel();

    dedup.add_event_handler(Arc::new(CallbackHandler::new(move |event| {
        if matches!(event, DedupEvent::ScanProgress(_)) && !parked.swap(true, Ordering::SeqCst) {
            progress_tx.lock().unwrap().send(()).unwrap();
            resume_rx.lock().unwrap().recv().unwrap();
        }
    })));
    dedup.add_event_handler(Arc::new(ChannelHandler::new(event_tx)));

    let task = dedup.spawn_scan();
    progress_rx.recv().unwrap();
    task.cancel();
    resume_tx.send(()).unwrap();

    let err = task.join().unwrap_err();
    assert!(matches!(
        err,
        DedupError::Duplicate(DuplicateError::ScanCancelled)
    ));

    let pending = dedup.pending_duplicates().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].contact_a.email(), Some("x@example.com"));
    assert_eq!(drain(&event_rx).last(), Some(&DedupEvent::ScanCancelled));
}

// ============================================================
// Per-Contact Check
// ============================================================

#[test]
fn test_check_contact() {
    let dedup = dedup_with(&[
        person(0, "Ann", "Lee"),
        person(0, "Anne", "Lee"),
        person(0, "Bob", "Jones"),
    ]);
    let ann = dedup.list_contacts().unwrap().remove(0);

    let result = dedup.check_contact(ann.id()).unwrap();

    assert_eq!(result.target_contact, ann);
    assert_eq!(result.new_pairs, 1);
    assert_eq!(result.duplicates.len(), 1);
    assert_eq!(result.duplicates[0].other_contact.first_name(), Some("Anne"));

    // A second check reports the existing pair but records nothing
    let again = dedup.check_contact(ann.id()).unwrap();
    assert_eq!(again.new_pairs, 0);
    assert_eq!(again.duplicates.len(), 1);
}

#[test]
fn test_check_unknown_contact() {
    let dedup = dedup_with(&[person(0, "Ann", "Lee")]);

    let err = dedup.check_contact(404).unwrap_err();
    assert!(matches!(
        err,
        DedupError::Duplicate(DuplicateError::ContactNotFound(404))
    ));
}

// ============================================================
// Resolution
// ============================================================

#[test]
fn test_merge_and_ignore_emit_events() {
    let mut dedup = dedup_with(&[
        Contact::draft().with_email("a@b.com"),
        Contact::draft().with_email("a@b.com"),
        Contact::draft().with_phone("555 123 4567"),
        Contact::draft().with_phone("5551234567"),
    ]);
    let (tx, rx) = mpsc::channel();
    dedup.add_event_handler(Arc::new(ChannelHandler::new(tx)));
    let pending = dedup.pending_duplicates().unwrap();
    assert!(pending.is_empty());

    let pairs = dedup.scan().unwrap().new_pairs;
    drain(&rx);
    let (email_pair, phone_pair) = (&pairs[0], &pairs[1]);

    let outcome = dedup.merge(email_pair.id, email_pair.contact_b).unwrap();
    dedup.ignore(phone_pair.id).unwrap();

    assert_eq!(
        drain(&rx),
        vec![
            DedupEvent::PairMerged {
                pair_id: email_pair.id,
                kept_contact_id: email_pair.contact_b,
                deleted_contact_id: outcome.deleted_contact_id,
            },
            DedupEvent::PairIgnored {
                pair_id: phone_pair.id
            },
        ]
    );
    assert_eq!(dedup.list_contacts().unwrap().len(), 3);
    assert!(dedup.pending_duplicates().unwrap().is_empty());
}

#[test]
fn test_failed_merge_emits_nothing() {
    let mut dedup = dedup_with(&[
        Contact::draft().with_email("a@b.com"),
        Contact::draft().with_email("a@b.com"),
    ]);
    let pair = dedup.scan().unwrap().new_pairs.remove(0);
    let (tx, rx) = mpsc::channel();
    dedup.add_event_handler(Arc::new(ChannelHandler::new(tx)));

    let err = dedup.merge(pair.id, 1234).unwrap_err();

    assert!(matches!(
        err,
        DedupError::Duplicate(DuplicateError::InvalidMergeTarget { .. })
    ));
    assert!(drain(&rx).is_empty());
    assert_eq!(dedup.list_contacts().unwrap().len(), 2);
}

// ============================================================
// Listings and Statistics
// ============================================================

#[test]
fn test_pending_duplicates_skip_missing_contacts() {
    let (contacts, pairs) = memory_stores(vec![
        person(1, "Ann", "Lee"),
        person(2, "Anne", "Lee"),
        person(3, "Bob", "Jones"),
        person(4, "Rob", "Jones"),
    ]);
    record_pair(&pairs, 1, 2, 0.875);
    record_pair(&pairs, 3, 4, 0.8);
    contacts.delete_by_id(4).unwrap();
    let dedup = Dedup::with_stores(contacts, pairs, DedupConfig::in_memory());

    let pending = dedup.pending_duplicates().unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].contact_a.id(), 1);
    assert_eq!(pending[0].contact_b.id(), 2);
}

#[test]
fn test_pending_duplicates_ordered_by_score() {
    let (contacts, pairs) = memory_stores((1..=6).map(|id| person(id, "A", "B")).collect());
    record_pair(&pairs, 1, 2, 0.8);
    record_pair(&pairs, 3, 4, 0.95);
    record_pair(&pairs, 5, 6, 0.85);
    let dedup = Dedup::with_stores(contacts, pairs, DedupConfig::in_memory());

    let scores: Vec<f64> = dedup
        .pending_duplicates()
        .unwrap()
        .iter()
        .map(|p| p.pair.similarity_score)
        .collect();
    assert_eq!(scores, vec![0.95, 0.85, 0.8]);
}

#[test]
fn test_stats_high_confidence_threshold() {
    let (contacts, pairs) = memory_stores((1..=6).map(|id| person(id, "A", "B")).collect());
    record_pair(&pairs, 1, 2, 0.92);
    record_pair(&pairs, 3, 4, 0.89);
    let resolved = record_pair(&pairs, 5, 6, 0.99);
    let dedup = Dedup::with_stores(contacts, pairs, DedupConfig::in_memory());
    dedup.ignore(resolved.id).unwrap();

    let stats = dedup.stats().unwrap();

    assert_eq!(stats.total_duplicates, 3);
    assert_eq!(stats.high_confidence_duplicates, 1);
    assert_eq!(stats.count(PairStatus::Pending), 2);
    assert_eq!(stats.count(PairStatus::Ignored), 1);
    assert_eq!(stats.count(PairStatus::Merged), 0);

    let high: Vec<f64> = dedup
        .high_confidence_duplicates()
        .unwrap()
        .iter()
        .map(|p| p.similarity_score)
        .collect();
    assert_eq!(high, vec![0.92]);
}

#[test]
fn test_pair_serializes_with_wire_names() {
    let dedup = dedup_with(&[
        Contact::draft().with_email("a@b.com"),
        Contact::draft().with_email("a@b.com"),
    ]);
    let pair = dedup.scan().unwrap().new_pairs.remove(0);

    let json = serde_json::to_value(&pair).unwrap();

    assert_eq!(json["contactA"], 1);
    assert_eq!(json["contactB"], 2);
    assert_eq!(json["similarityScore"], 1.0);
    assert_eq!(json["matchType"], "EMAIL_EXACT");
    assert_eq!(json["status"], "PENDING");
}

// ============================================================
// Configuration and Persistence
// ============================================================

#[test]
fn test_invalid_threshold_is_rejected() {
    let result = Dedup::new(DedupConfig::in_memory().with_match_threshold(1.5));
    assert!(matches!(result, Err(DedupError::Configuration(_))));
}

#[cfg(feature = "sqlite")]
#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("contacts.db");

    {
        let dedup = Dedup::new(DedupConfig::with_storage_path(&path)).unwrap();
        dedup
            .add_contact(person(0, "Maria", "Garcia"))
            .unwrap();
        dedup
            .add_contact(person(0, "Maria", "Garcya"))
            .unwrap();
        assert_eq!(dedup.scan().unwrap().duplicates_found(), 1);
    }

    let dedup = Dedup::new(DedupConfig::with_storage_path(&path)).unwrap();
    assert_eq!(dedup.list_contacts().unwrap().len(), 2);
    let pending = dedup.pending_duplicates().unwrap();
    assert_eq!(pending.len(), 1);

    let pair = &pending[0].pair;
    dedup.merge(pair.id, pair.contact_a).unwrap();
    assert_eq!(dedup.list_contacts().unwrap().len(), 1);
    assert_eq!(
        dedup.get_pair(pair.id).unwrap().map(|p| p.status),
        Some(PairStatus::Merged)
    );
}
