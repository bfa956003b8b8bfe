//! The durable game-record boundary.
//!
//! Finished games, player stats, and their retrieval are the archive's
//! business, not the coordinator's. This module defines the
//! [`RecordStore`] trait — the coordinator calls it at state
//! transitions (created, playing, finished) and otherwise stays out of
//! persistence. Calls are made fire-and-forget by the coordinator: the
//! in-memory authority never waits on the archive before broadcasting.
//!
//! [`MemoryRecordStore`] is the in-process implementation used by tests
//! and demos; production wires a database-backed one here.

use std::collections::HashMap;
use std::sync::Arc;

use matchwire_protocol::{BoardConfig, PlayerId, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Where a game is in its recorded lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Invitation sent, game not started.
    Forming,
    /// Game in progress.
    Playing,
    /// Game over; `winner` is final.
    Finished,
}

/// Durable metadata for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub session_id: SessionId,
    pub creator: PlayerId,
    pub participants: Vec<PlayerId>,
    pub config: BoardConfig,
    pub status: RecordStatus,
    pub winner: Option<PlayerId>,
}

/// Fields updated on a state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub status: RecordStatus,
    pub winner: Option<PlayerId>,
}

/// Errors from the record store collaborator.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// No record exists for this session.
    #[error("no record for session {0}")]
    NotFound(SessionId),

    /// The backing store could not be reached.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for game records.
pub trait RecordStore: Send + Sync + 'static {
    /// Stores the record for a newly created game.
    fn create_record(
        &self,
        record: GameRecord,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;

    /// Applies a status/winner update to an existing record.
    fn update_record(
        &self,
        session_id: &SessionId,
        update: RecordUpdate,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;

    /// Removes a record (cancelled invitations leave no trace).
    fn delete_record(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RecordError>> + Send;
}

/// In-memory [`RecordStore`] for tests and demos.
///
/// Clones share the same table, so a test can keep one clone and hand
/// the other to the coordinator.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<Mutex<HashMap<SessionId, GameRecord>>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches a record snapshot (test inspection).
    pub async fn get(&self, session_id: &SessionId) -> Option<GameRecord> {
        self.records.lock().await.get(session_id).cloned()
    }

    /// Number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.lock().await.len()
    }
}

impl RecordStore for MemoryRecordStore {
    async fn create_record(
        &self,
        record: GameRecord,
    ) -> Result<(), RecordError> {
        self.records
            .lock()
            .await
            .insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn update_record(
        &self,
        session_id: &SessionId,
        update: RecordUpdate,
    ) -> Result<(), RecordError> {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| RecordError::NotFound(session_id.clone()))?;
        record.status = update.status;
        record.winner = update.winner;
        Ok(())
    }

    async fn delete_record(
        &self,
        session_id: &SessionId,
    ) -> Result<(), RecordError> {
        self.records.lock().await.remove(session_id);
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
