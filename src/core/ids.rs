/**
 * Injected id source, generalizing `session.rs`'s direct `Uuid::new_v4()`
 * calls into a trait per spec §9, so tests can pin generated ids.
 */
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Returns ids from a fixed sequence, then falls back to random ids once
/// exhausted. Useful for scenario tests that want to assert on a specific id.
#[derive(Clone)]
pub struct SequenceIdGenerator {
    remaining: Arc<Mutex<Vec<Uuid>>>,
}

impl SequenceIdGenerator {
    pub fn new(ids: Vec<Uuid>) -> Self {
        let mut ids = ids;
        ids.reverse();
        Self {
            remaining: Arc::new(Mutex::new(ids)),
        }
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_id(&self) -> Uuid {
        let mut guard = self.remaining.lock().unwrap();
        guard.pop().unwrap_or_else(Uuid::new_v4)
    }
}
