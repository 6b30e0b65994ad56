//! Dedup Core Library
//!
//! Duplicate contact detection: pairwise similarity scoring, scans that
//! record candidate pairs, and merge / ignore resolution of those pairs.

pub mod api;
pub mod contact;
pub mod duplicate;
pub mod storage;

pub use api::{
    CallbackHandler, ChannelHandler, ContactDuplicates, ContactMatch, Dedup, DedupConfig,
    DedupError, DedupEvent, DedupResult, DuplicateStats, EventHandler, PendingDuplicate,
    ScanSummary, ScanTask,
};
pub use contact::{Contact, ContactId};
pub use duplicate::{
    canonical_pair, score, CancelToken, DetectionConfig, DetectionEngine, DuplicateCandidate,
    DuplicateError, DuplicatePair, MatchResult, MatchType, MergeOutcome, MergeResolver, PairId,
    PairStatus, ScanProgress, MATCH_THRESHOLD,
};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;
pub use storage::{ContactStore, InMemoryContactStore, InMemoryPairStore, PairStore, StorageError};
