// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the API layer.

use thiserror::Error;

use crate::duplicate::DuplicateError;
use crate::storage::StorageError;

/// Unified error type for duplicate management operations.
#[derive(Error, Debug)]
pub enum DedupError {
    /// Scan or resolution failed.
    #[error(transparent)]
    Duplicate(#[from] DuplicateError),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Background task ended abnormally.
    #[error("background scan panicked")]
    TaskPanicked,
}

/// Result type for duplicate management operations.
pub type DedupResult<T> = Result<T, DedupError>;
