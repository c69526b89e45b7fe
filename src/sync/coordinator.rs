//! Batch sync coordination
//!
//! Processes one authenticated user's batch of offline-recorded events:
//! per-record shape validation, merge resolution against the stored state,
//! and the conditional write, with each record's failure isolated from its
//! siblings. Records are applied strictly in submission order; a later
//! record sharing a token with an earlier one merges against the
//! just-applied result, not the pre-batch state.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::merge::{self, MergeDecision};
use super::store::EventStore;
use super::types::{client_id_of, EventInput, SyncError, SyncReport, SyncedRecord};

/// Coordinates batch sync against an injected event store
pub struct SyncCoordinator<S> {
    store: S,
}

impl<S: EventStore> SyncCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Process a batch of raw records for one user
    ///
    /// Never fails as a whole: per-record errors are collected into
    /// `failedRecordIds` and processing continues. Applied records stay
    /// applied regardless of later failures in the same batch.
    pub async fn process_batch(&self, user_id: &str, records: &[Value]) -> SyncReport {
        let mut synced_records = Vec::with_capacity(records.len());
        let mut failed_record_ids = Vec::new();

        for raw in records {
            match self.sync_one(user_id, raw).await {
                Ok(record) => synced_records.push(record),
                Err(e) => {
                    let client_id = client_id_of(raw);
                    tracing::warn!(
                        user_id = %user_id,
                        client_id = %client_id,
                        error = %e,
                        "Failed to sync record"
                    );
                    failed_record_ids.push(client_id);
                }
            }
        }

        tracing::info!(
            user_id = %user_id,
            synced = synced_records.len(),
            failed = failed_record_ids.len(),
            "Processed sync batch"
        );

        SyncReport {
            synced_records,
            failed_record_ids,
            server_timestamp: Utc::now(),
        }
    }

    /// Sync a single record: validate, resolve, apply
    async fn sync_one(&self, user_id: &str, raw: &Value) -> Result<SyncedRecord, SyncError> {
        let input = EventInput::parse(raw)?;

        let existing = self.store.find_by_client_id(&input.client_id).await?;

        // A token is bound to its first owner for life. Reject before
        // resolving so a foreign submission can never read as synced.
        if let Some(ref stored) = existing {
            if stored.user_id != user_id {
                return Err(SyncError::OwnerMismatch);
            }
        }

        let decision = merge::resolve(input.client_timestamp, existing.as_ref());

        let stored = match (decision, existing) {
            (MergeDecision::KeepExisting, Some(stored)) => stored,
            _ => {
                // Create or Overwrite: fresh server timestamp, candidate id.
                // The store keeps the original id on replacement and its
                // write guard settles races with concurrent batches.
                let event = input.into_event(user_id, Uuid::new_v4().to_string(), Utc::now());
                self.store.upsert(event).await?
            }
        };

        Ok(SyncedRecord {
            client_id: stored.client_id,
            server_id: stored.id,
            server_timestamp: stored.server_timestamp,
        })
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }
}
