// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Contact storage operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{ContactStore, SqliteStorage, StorageError};
use crate::contact::{Contact, ContactId};

const CONTACT_COLUMNS: &str = "id, first_name, middle_name, last_name, email, phone";

/// Internal struct for database row data.
struct ContactRow {
    id: ContactId,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl ContactRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ContactRow {
            id: row.get(0)?,
            first_name: row.get(1)?,
            middle_name: row.get(2)?,
            last_name: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
        })
    }

    fn into_contact(self) -> Contact {
        let mut contact = Contact::new(self.id);
        if let Some(v) = self.first_name {
            contact = contact.with_first_name(v);
        }
        if let Some(v) = self.middle_name {
            contact = contact.with_middle_name(v);
        }
        if let Some(v) = self.last_name {
            contact = contact.with_last_name(v);
        }
        if let Some(v) = self.email {
            contact = contact.with_email(v);
        }
        if let Some(v) = self.phone {
            contact = contact.with_phone(v);
        }
        contact
    }
}

impl ContactStore for SqliteStorage {
    fn list_all(&self) -> Result<Vec<Contact>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY id"
        ))?;

        let rows = stmt.query_map([], ContactRow::from_row)?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?.into_contact());
        }
        Ok(contacts)
    }

    fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, StorageError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                ContactRow::from_row,
            )
            .optional()?;
        Ok(row.map(ContactRow::into_contact))
    }

    fn delete_by_id(&self, id: ContactId) -> Result<bool, StorageError> {
        let rows_affected = self
            .conn()?
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    fn save(&self, contact: &Contact) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO contacts
             (id, first_name, middle_name, last_name, email, phone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                contact.id(),
                contact.first_name(),
                contact.middle_name(),
                contact.last_name(),
                contact.email(),
                contact.phone(),
            ],
        )?;
        Ok(())
    }

    fn create(&self, contact: Contact) -> Result<Contact, StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO contacts (first_name, middle_name, last_name, email, phone)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                contact.first_name(),
                contact.middle_name(),
                contact.last_name(),
                contact.email(),
                contact.phone(),
            ],
        )?;
        Ok(contact.with_id(conn.last_insert_rowid()))
    }
}
