use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use rand::seq::IndexedRandom;
use tracing::error;

use crate::session::error::SessionError;

/// Characters used in room codes. Lookalikes (O/0, I/1) are excluded so
/// codes stay readable on a shared screen.
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const MAX_ATTEMPTS: usize = 1000;

/// Hands out room codes that are unique among live rooms. A code is reserved
/// until the room dies and the registry releases it.
pub struct CodeVault {
    in_use: Arc<RwLock<HashSet<String>>>,
    length: usize,
}

impl CodeVault {
    pub fn new(length: usize) -> Self {
        Self {
            in_use: Arc::new(RwLock::new(HashSet::new())),
            length,
        }
    }

    pub fn reserve(&self) -> Result<String, SessionError> {
        let mut lock = self.in_use.write().map_err(|e| {
            error!("CodeVault write-lock error: {}", e);
            SessionError::Poisoned
        })?;

        for _ in 0..MAX_ATTEMPTS {
            let code = Self::random_code(self.length);
            if lock.insert(code.clone()) {
                return Ok(code);
            }
        }

        Err(SessionError::CodesExhausted)
    }

    pub fn release(&self, code: &str) -> Result<(), SessionError> {
        let mut lock = self.in_use.write().map_err(|e| {
            error!("CodeVault write-lock error: {}", e);
            SessionError::Poisoned
        })?;

        lock.remove(code);
        Ok(())
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.read().map(|lock| lock.len()).unwrap_or(0)
    }

    fn random_code(length: usize) -> String {
        let mut rng = rand::rng();
        (0..length)
            .map(|_| {
                let byte = CODE_CHARSET
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or(b'A');
                byte as char
            })
            .collect()
    }
}
