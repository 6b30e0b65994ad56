// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dedup API Layer
//!
//! High-level API over duplicate scanning and resolution.
//!
//! # Overview
//!
//! The API layer coordinates:
//! - Contact and pair stores
//! - Full scans, foreground or background
//! - Per-contact duplicate checks
//! - Merge / ignore decisions
//! - Statistics
//! - Event handling
//!
//! # Module Structure
//!
//! - [`error`] - Error types for the API layer
//! - [`config`] - Configuration types
//! - [`events`] - Event system for callbacks
//! - [`stats`] - Summaries and aggregate views
//! - [`task`] - Background scan handle
//! - [`dedup`] - Main orchestrator

pub mod config;
pub mod dedup;
pub mod error;
pub mod events;
pub mod stats;
pub mod task;

pub use config::DedupConfig;
pub use dedup::Dedup;
pub use error::{DedupError, DedupResult};
pub use events::{CallbackHandler, ChannelHandler, DedupEvent, EventDispatcher, EventHandler};
pub use stats::{ContactDuplicates, ContactMatch, DuplicateStats, PendingDuplicate, ScanSummary};
pub use task::ScanTask;
