// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Configuration
//!
//! Configuration types for the API layer.

use std::path::PathBuf;

use crate::duplicate::DetectionConfig;

/// Configuration for a [`Dedup`](super::Dedup) instance.
#[derive(Debug, Clone, Default)]
pub struct DedupConfig {
    /// SQLite database file. `None` keeps everything in memory.
    pub storage_path: Option<PathBuf>,

    /// Scan tunables.
    pub detection: DetectionConfig,
}

impl DedupConfig {
    /// Creates a configuration backed by the database at `storage_path`.
    pub fn with_storage_path(storage_path: impl Into<PathBuf>) -> Self {
        DedupConfig {
            storage_path: Some(storage_path.into()),
            ..Default::default()
        }
    }

    /// Creates a configuration with in-memory stores.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Replaces the scan tunables.
    pub fn with_detection(mut self, detection: DetectionConfig) -> Self {
        self.detection = detection;
        self
    }

    /// Sets the match threshold.
    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.detection.match_threshold = threshold;
        self
    }

    /// Checks the thresholds are usable scores.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let d = &self.detection;
        for (name, value) in [
            ("match_threshold", d.match_threshold),
            ("high_confidence_threshold", d.high_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", name, value));
            }
        }
        if d.batch_rows == 0 {
            return Err("batch_rows must be at least 1".into());
        }
        Ok(())
    }
}
