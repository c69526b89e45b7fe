//! Sync engine for offline-recorded attendance events
//!
//! Provides:
//! - Idempotency keyed on a client-generated token (`clientId`)
//! - Last-write-wins merge resolution on the device timestamp
//! - Batch coordination with per-record failure isolation
//!
//! # Sync Protocol
//!
//! 1. Device records events locally while offline
//! 2. Device uploads a batch of events to `/api/sync-logs`
//! 3. Server merges each event against stored state by `clientId`
//! 4. Server responds with per-record outcomes; the device clears its
//!    local queue for every synced token and retries the failed ones
//!
//! Resubmitting an already-synced batch is a no-op: every record resolves
//! to keep-existing and the response carries the same stored ids.
//!
//! # Conflict Resolution
//!
//! Whole-record last-write-wins on `clientTimestamp`, strictly-newer only.
//! Ties keep the stored record, so two distinct events that share a token
//! and a timestamp collapse to the first one stored. A token never changes
//! owner; a submission under another user's token is rejected per record.

mod coordinator;
mod merge;
mod store;
mod types;

pub use coordinator::SyncCoordinator;
pub use merge::{resolve, MergeDecision};
pub use store::{EventStore, MemoryEventStore, StoreError};
pub use types::{
    client_id_of, ActionKind, AttendanceEvent, EventInput, SyncError, SyncReport, SyncedRecord,
    MAX_QUERY_RESULTS,
};
