//! Duplicates Command
//!
//! Scan for duplicates, review them, and resolve them.

use std::sync::Arc;

use anyhow::Result;
use dedup_core::{CallbackHandler, DedupEvent};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::config::CliConfig;
use crate::display;

fn scan_progress_bar(hidden: bool) -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    if hidden {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        pb.set_style(
            ProgressStyle::with_template(
                "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} comparisons",
            )?
            .progress_chars("=> "),
        );
    }
    pb.set_message("Scanning");
    Ok(pb)
}

/// Compares every pair of contacts and records new duplicates.
pub fn scan(config: &CliConfig) -> Result<()> {
    let mut dedup = config.open()?;
    let pb = scan_progress_bar(config.json)?;

    let bar = pb.clone();
    dedup.add_event_handler(Arc::new(CallbackHandler::new(move |event| {
        if let DedupEvent::ScanProgress(progress) = event {
            bar.set_length(progress.total);
            bar.set_position(progress.compared);
        }
    })));

    let result = dedup.scan();
    pb.finish_and_clear();
    let summary = result?;

    if config.json {
        return display::json(&summary);
    }
    display::display_scan_summary(&summary);
    Ok(())
}

/// Lists pending duplicates.
pub fn pending(config: &CliConfig) -> Result<()> {
    let dedup = config.open()?;
    let pending = dedup.pending_duplicates()?;

    if config.json {
        return display::json(&pending);
    }
    if pending.is_empty() {
        display::info("No pending duplicates. Run 'dedup scan' to look for some.");
        return Ok(());
    }

    println!();
    println!("Pending duplicates ({}):", pending.len());
    println!();
    display::display_pending_table(&pending);
    println!();
    println!("Resolve with: dedup merge <pair> --keep <contact> | dedup ignore <pair>");

    Ok(())
}

/// Checks one contact against all others.
pub fn check(config: &CliConfig, contact_id: i64) -> Result<()> {
    let dedup = config.open()?;
    let result = dedup.check_contact(contact_id)?;

    if config.json {
        return display::json(&result);
    }
    display::display_contact_duplicates(&result);
    Ok(())
}

/// Merges a pair, keeping one contact.
pub fn merge(config: &CliConfig, pair_id: i64, keep: i64) -> Result<()> {
    let dedup = config.open()?;
    let outcome = dedup.merge(pair_id, keep)?;

    if config.json {
        return display::json(&outcome);
    }
    display::success(&format!(
        "Merged pair {}: kept #{}, deleted #{}",
        outcome.pair_id, outcome.kept_contact_id, outcome.deleted_contact_id
    ));
    Ok(())
}

/// Marks a pair as not a duplicate.
pub fn ignore(config: &CliConfig, pair_id: i64) -> Result<()> {
    let dedup = config.open()?;
    let pair = dedup.ignore(pair_id)?;

    if config.json {
        return display::json(&pair);
    }
    display::success(&format!("Ignored pair {}", pair.id));
    display::display_pair(&pair);
    Ok(())
}

/// Shows duplicate statistics.
pub fn stats(config: &CliConfig) -> Result<()> {
    let dedup = config.open()?;
    let stats = dedup.stats()?;

    if config.json {
        return display::json(&stats);
    }
    if stats.total_duplicates == 0 {
        display::warning("No duplicates recorded yet");
    }
    display::display_stats(&stats);
    Ok(())
}
