//! Contacts Command
//!
//! Add, list, and import contacts.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use dedup_core::{Contact, Dedup};
use serde::Serialize;

use crate::config::CliConfig;
use crate::display;

/// Fields for a new contact. Every field is optional, but at least one must be set.
#[derive(Debug, Default)]
pub struct NewContact {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewContact {
    fn is_empty(&self) -> bool {
        [&self.first, &self.middle, &self.last, &self.email, &self.phone]
            .iter()
            .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    fn into_contact(self) -> Contact {
        let mut contact = Contact::draft();
        if let Some(v) = self.first {
            contact = contact.with_first_name(v);
        }
        if let Some(v) = self.middle {
            contact = contact.with_middle_name(v);
        }
        if let Some(v) = self.last {
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

/// Adds a contact.
pub fn add(config: &CliConfig, fields: NewContact) -> Result<()> {
    if fields.is_empty() {
        bail!("A contact needs at least one of --first, --middle, --last, --email or --phone");
    }

    let dedup = config.open()?;
    let contact = dedup.add_contact(fields.into_contact())?;

    if config.json {
        return display::json(&contact);
    }
    display::success(&format!(
        "Added contact #{}: {}",
        contact.id(),
        contact.display_name()
    ));
    Ok(())
}

/// Lists all contacts.
pub fn list(config: &CliConfig) -> Result<()> {
    let dedup = config.open()?;
    let contacts = dedup.list_contacts()?;

    if config.json {
        return display::json(&contacts);
    }
    if contacts.is_empty() {
        display::info("No contacts yet. Add one with:");
        println!("  dedup contacts add --first <name> --email <address>");
        return Ok(());
    }

    println!();
    println!("Contacts ({}):", contacts.len());
    println!();
    display::display_contacts_table(&contacts);
    println!();

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport {
    imported: usize,
    first_id: Option<i64>,
    last_id: Option<i64>,
}

/// Imports contacts from a JSON array. Ids in the file are ignored.
pub fn import(config: &CliConfig, path: &Path) -> Result<()> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let contacts: Vec<Contact> = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a JSON array of contacts", path.display()))?;

    let dedup = config.open()?;
    let ids = insert_all(&dedup, contacts)?;

    let report = ImportReport {
        imported: ids.len(),
        first_id: ids.first().copied(),
        last_id: ids.last().copied(),
    };
    if config.json {
        return display::json(&report);
    }
    display::success(&format!("Imported {} contact(s)", report.imported));
    Ok(())
}

/// Stores contacts one at a time. Contacts stored before a failure are kept,
/// and the error says how many that was.
fn insert_all(dedup: &Dedup, contacts: Vec<Contact>) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(contacts.len());
    for contact in contacts {
        let stored = dedup.add_contact(contact).with_context(|| match (ids.first(), ids.last()) {
            (Some(first), Some(last)) => format!(
                "import stopped after {} contact(s) (#{} to #{} were kept)",
                ids.len(),
                first,
                last
            ),
            _ => "import stopped before any contact was stored".to_string(),
        })?;
        ids.push(stored.id());
    }
    Ok(ids)
}
