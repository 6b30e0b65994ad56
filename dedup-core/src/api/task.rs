// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Background scans.

use std::thread::JoinHandle;

use crate::duplicate::{CancelToken, DuplicateError, DuplicatePair};

use super::error::{DedupError, DedupResult};

/// Handle to a scan running on its own thread.
///
/// Dropping the handle does not stop the scan; call [`cancel`](Self::cancel)
/// first if the result is no longer wanted.
pub struct ScanTask {
    handle: JoinHandle<Result<Vec<DuplicatePair>, DuplicateError>>,
    cancel: CancelToken,
}

impl ScanTask {
    pub(crate) fn new(
        handle: JoinHandle<Result<Vec<DuplicatePair>, DuplicateError>>,
        cancel: CancelToken,
    ) -> Self {
        ScanTask { handle, cancel }
    }

    /// Asks the scan to stop. The batch in flight is discarded; batches
    /// already flushed stay recorded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the scan thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the scan and returns the pairs it recorded.
    pub fn join(self) -> DedupResult<Vec<DuplicatePair>> {
        let result = self.handle.join().map_err(|_| DedupError::TaskPanicked)?;
        Ok(result?)
    }
}
