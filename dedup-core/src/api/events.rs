// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Callbacks for scan progress and resolution events.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crate::contact::ContactId;
use crate::duplicate::{PairId, ScanProgress};

/// Events emitted by [`Dedup`](super::Dedup).
#[derive(Debug, Clone, PartialEq)]
pub enum DedupEvent {
    /// A full scan started.
    ScanStarted,

    /// A scan batch was persisted.
    ScanProgress(ScanProgress),

    /// A full scan finished.
    ScanFinished {
        /// Pairs recorded by this scan.
        new_pairs: usize,
    },

    /// A full scan was cancelled.
    ScanCancelled,

    /// A full scan stopped on an error.
    ScanFailed {
        /// Error description.
        message: String,
    },

    /// Two contacts were merged.
    PairMerged {
        pair_id: PairId,
        kept_contact_id: ContactId,
        deleted_contact_id: ContactId,
    },

    /// A pair was marked as not a duplicate.
    PairIgnored { pair_id: PairId },
}

/// Event handler trait.
///
/// Implement this trait to receive events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: DedupEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(DedupEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(DedupEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(DedupEvent) + Send + Sync,
{
    fn on_event(&self, event: DedupEvent) {
        (self.callback)(event);
    }
}

/// Forwards events into a channel.
///
/// Events sent after the receiver is dropped are discarded.
pub struct ChannelHandler {
    sender: Mutex<Sender<DedupEvent>>,
}

impl ChannelHandler {
    pub fn new(sender: Sender<DedupEvent>) -> Self {
        ChannelHandler {
            sender: Mutex::new(sender),
        }
    }
}

impl EventHandler for ChannelHandler {
    fn on_event(&self, event: DedupEvent) {
        if let Ok(sender) = self.sender.lock() {
            let _ = sender.send(event);
        }
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: DedupEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
