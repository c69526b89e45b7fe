//! Last-write-wins merge resolution
//!
//! The entire conflict policy lives here: whole-record comparison on the
//! device timestamp, keyed by the client id. No field-level merging.

use chrono::{DateTime, Utc};

use super::types::AttendanceEvent;

/// Decision for one incoming record against the stored state for its token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// No stored record for this token; install the incoming one
    Create,
    /// Incoming record is strictly newer; replace the stored one in place
    Overwrite,
    /// Incoming record is equal or older; the stored record survives
    KeepExisting,
}

/// Resolve an incoming record against the stored record for the same token
///
/// Ties go to the stored record: last-write-wins means strictly newer, not
/// "latest write seen by the server". An equal-timestamp resubmission is a
/// no-op, which is what makes batch retries idempotent.
pub fn resolve(
    incoming_client_timestamp: DateTime<Utc>,
    existing: Option<&AttendanceEvent>,
) -> MergeDecision {
    match existing {
        None => MergeDecision::Create,
        Some(stored) => {
            if incoming_client_timestamp > stored.client_timestamp {
                MergeDecision::Overwrite
            } else {
                MergeDecision::KeepExisting
            }
        }
    }
}
