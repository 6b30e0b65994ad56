// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Contact Module
//!
//! The contact record compared by the duplicate scanner. Contacts are owned
//! by a [`ContactStore`](crate::storage::ContactStore); this crate only reads
//! them and deletes the losing side of a merge.

use serde::{Deserialize, Serialize};

/// Numeric contact identifier, unique within a contact store.
pub type ContactId = i64;

/// A contact record.
///
/// Every field except the identifier is optional. Blank strings are treated
/// the same as missing values by the scorer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Store-assigned identifier
    #[serde(default)]
    id: ContactId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

impl Contact {
    /// Creates an empty contact with the given identifier.
    pub fn new(id: ContactId) -> Self {
        Contact {
            id,
            ..Default::default()
        }
    }

    /// Creates an empty contact whose identifier is assigned by the store
    /// on [`ContactStore::create`](crate::storage::ContactStore::create).
    pub fn draft() -> Self {
        Self::default()
    }

    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    pub fn with_middle_name(mut self, name: impl Into<String>) -> Self {
        self.middle_name = Some(name.into());
        self
    }

    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Returns a copy of this contact carrying a different identifier.
    pub fn with_id(mut self, id: ContactId) -> Self {
        self.id = id;
        self
    }

    /// Returns the contact's identifier.
    pub fn id(&self) -> ContactId {
        self.id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn middle_name(&self) -> Option<&str> {
        self.middle_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the email address if it is present and not blank.
    pub(crate) fn usable_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Returns the phone number if it is present and not blank.
    pub(crate) fn usable_phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    /// Joins the non-blank name components with single spaces.
    ///
    /// Components are trimmed; missing components are skipped. The result is
    /// not case-folded.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter_map(|part| non_blank(part.as_deref()))
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns a display label for listings: the full name, else the email,
    /// else the phone, else `#<id>`.
    pub fn display_name(&self) -> String {
        let name = self.full_name();
        if !name.is_empty() {
            return name;
        }
        self.usable_email()
            .or_else(|| self.usable_phone())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
