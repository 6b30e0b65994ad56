//! Display Helpers
//!
//! Terminal output formatting and styling.

use anyhow::Result;
use console::style;
use dedup_core::{
    Contact, ContactDuplicates, DuplicatePair, DuplicateStats, MatchType, PendingDuplicate,
    ScanSummary,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Prints a success message.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Prints a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Prints an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Prints a value as pretty JSON.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn percent(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
}

impl From<&Contact> for ContactRow {
    fn from(contact: &Contact) -> Self {
        ContactRow {
            id: contact.id(),
            name: contact.full_name(),
            email: or_dash(contact.email()),
            phone: or_dash(contact.phone()),
        }
    }
}

#[derive(Tabled)]
struct PairRow {
    #[tabled(rename = "Pair")]
    id: i64,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Match")]
    match_type: MatchType,
    #[tabled(rename = "Contact A")]
    contact_a: String,
    #[tabled(rename = "Contact B")]
    contact_b: String,
}

fn labelled(contact: &Contact) -> String {
    format!("#{} {}", contact.id(), contact.display_name())
}

/// Displays contacts as a table.
pub fn display_contacts_table(contacts: &[Contact]) {
    let rows: Vec<ContactRow> = contacts.iter().map(ContactRow::from).collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Displays pending pairs, highest score first.
pub fn display_pending_table(pending: &[PendingDuplicate]) {
    let rows: Vec<PairRow> = pending
        .iter()
        .map(|p| PairRow {
            id: p.pair.id,
            score: percent(p.pair.similarity_score),
            match_type: p.pair.match_type,
            contact_a: labelled(&p.contact_a),
            contact_b: labelled(&p.contact_b),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Displays the outcome of a full scan.
pub fn display_scan_summary(summary: &ScanSummary) {
    if summary.new_pairs.is_empty() {
        info("No new duplicates found");
        return;
    }

    success(&format!(
        "Found {} new duplicate pair(s)",
        summary.duplicates_found()
    ));
    for (match_type, count) in summary.match_type_counts() {
        println!("  {:18} {}", style(match_type).dim(), count);
    }
    println!();
    println!("Review them with: dedup pending");
}

/// Displays the duplicates of one contact.
pub fn display_contact_duplicates(result: &ContactDuplicates) {
    println!();
    println!("  {}", style(labelled(&result.target_contact)).bold().cyan());
    println!();

    if result.duplicates.is_empty() {
        println!("  {}", style("(no pending duplicates)").dim());
        println!();
        return;
    }

    for m in &result.duplicates {
        println!(
            "  pair {:<5} {:>5}  {:18} {}",
            m.pair.id,
            percent(m.pair.similarity_score),
            style(m.pair.match_type).dim(),
            labelled(&m.other_contact)
        );
    }
    println!();
    if result.new_pairs > 0 {
        info(&format!("{} new pair(s) recorded", result.new_pairs));
    }
}

/// Displays a single pair.
pub fn display_pair(pair: &DuplicatePair) {
    println!(
        "  pair {}: #{} / #{}  {}  {}  {}",
        pair.id,
        pair.contact_a,
        pair.contact_b,
        percent(pair.similarity_score),
        pair.match_type,
        style(pair.status).bold()
    );
}

/// Displays aggregate statistics.
pub fn display_stats(stats: &DuplicateStats) {
    println!();
    println!("  {}", style("Duplicate statistics").bold().cyan());
    println!();
    println!("  Total pairs:      {}", stats.total_duplicates);
    for (status, count) in &stats.status_breakdown {
        println!("    {:16} {}", style(status).dim(), count);
    }
    println!("  High confidence:  {}", stats.high_confidence_duplicates);

    if !stats.match_type_breakdown.is_empty() {
        println!("  Pending by match:");
        for (match_type, count) in &stats.match_type_breakdown {
            println!("    {:16} {}", style(match_type).dim(), count);
        }
    }
    println!();
}
