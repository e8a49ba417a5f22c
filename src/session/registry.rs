use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::session::{code_vault::CodeVault, error::SessionError, room::RoomSession};

/// Owns every live room session, keyed by room code. The registry is the
/// single entry point for creating and resolving rooms, so a code always
/// maps to at most one session.
pub struct SessionRegistry {
    rooms: DashMap<String, Arc<RoomSession>>,
    code_vault: CodeVault,
}

impl SessionRegistry {
    pub fn new(code_length: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            code_vault: CodeVault::new(code_length),
        }
    }

    pub fn create_room(
        &self,
        room_id: Uuid,
        host_id: Uuid,
        host_name: String,
        capacity: usize,
    ) -> Result<Arc<RoomSession>, SessionError> {
        let code = self.code_vault.reserve()?;
        let session = Arc::new(RoomSession::new(
            room_id,
            code.clone(),
            host_id,
            host_name,
            capacity,
        ));

        self.rooms.insert(code.clone(), session.clone());
        info!(room_id = %room_id, room_code = %code, "Room session created");

        Ok(session)
    }

    pub fn get(&self, code: &str) -> Result<Arc<RoomSession>, SessionError> {
        let code = code.trim().to_uppercase();
        self.rooms
            .get(&code)
            .map(|entry| entry.value().clone())
            .ok_or(SessionError::RoomNotFound(code))
    }

    pub fn remove(&self, code: &str) {
        if self.rooms.remove(code).is_some() {
            if let Err(e) = self.code_vault.release(code) {
                warn!("Failed to release room code {}: {}", code, e);
            }
            info!(room_code = %code, "Room session removed");
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Drops rooms that are closed, empty or idle past the timeout and
    /// returns them, so the sweep task can close their persisted rows.
    pub async fn sweep_idle(&self, max_idle: Duration) -> Vec<Arc<RoomSession>> {
        let mut stale = Vec::new();

        for entry in self.rooms.iter() {
            let session = entry.value();
            if session.should_remove().await || session.idle_for().await > max_idle {
                stale.push(session.clone());
            }
        }

        for session in &stale {
            self.remove(&session.code);
        }

        stale
    }
}
