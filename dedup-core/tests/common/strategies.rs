// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

use dedup_core::Contact;
use proptest::prelude::*;

/// Strategy for name components, sometimes blank or missing.
pub fn name_part_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => "(Ann|Anne|John|Jon|Maria|Mario|Lee|Li|Smith|Smyth|Garcia|Garcya)".prop_map(Some),
        1 => "[a-zA-Z]{1,10}".prop_map(Some),
        1 => Just(Some("  ".to_string())),
        1 => Just(None),
    ]
}

/// Strategy for email addresses drawn from a small pool so collisions happen.
pub fn email_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        2 => ("(ann|john|maria)", "(example|corp)")
            .prop_map(|(user, domain)| Some(format!("{}@{}.com", user, domain))),
        1 => ("(ANN|John)", "(EXAMPLE|Corp)")
            .prop_map(|(user, domain)| Some(format!("{}@{}.COM", user, domain))),
        1 => Just(Some("not-an-email".to_string())),
        2 => Just(None),
    ]
}

/// Strategy for phone numbers in assorted formats.
pub fn phone_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        2 => "[0-9]{7,12}".prop_map(Some),
        1 => "(\\+91-|\\+1 |00)?98765[0-9]{5}".prop_map(Some),
        1 => Just(Some("n/a".to_string())),
        2 => Just(None),
    ]
}

/// Strategy for whole contacts with the given id.
pub fn contact_strategy(id: i64) -> impl Strategy<Value = Contact> {
    (
        name_part_strategy(),
        name_part_strategy(),
        name_part_strategy(),
        email_strategy(),
        phone_strategy(),
    )
        .prop_map(move |(first, middle, last, email, phone)| {
            let mut contact = Contact::new(id);
            if let Some(v) = first {
                contact = contact.with_first_name(v);
            }
            if let Some(v) = middle {
                contact = contact.with_middle_name(v);
            }
            if let Some(v) = last {
                contact = contact.with_last_name(v);
            }
            if let Some(v) = email {
                contact = contact.with_email(v);
            }
            if let Some(v) = phone {
                contact = contact.with_phone(v);
            }
            contact
        })
}
