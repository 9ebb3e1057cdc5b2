use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Analysis,
    DoctorLookup,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    pending: bool,
}

type Slots = Arc<Mutex<HashMap<(u64, RequestKind), Slot>>>;

/// Tracks in-flight model calls per user and kind.
///
/// A second call of the same kind is refused while one is pending. Every start
/// (and every [`RequestTracker::invalidate`]) bumps a generation counter, so a
/// finished call can tell whether its result is still the newest.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    slots: Slots,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, or `None` if one of the same kind is still running for this user.
    pub fn begin(&self, user_id: u64, kind: RequestKind) -> Option<RequestGuard> {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let slot = slots.entry((user_id, kind)).or_default();
        if slot.pending {
            return None;
        }
        slot.pending = true;
        slot.generation += 1;
        Some(RequestGuard {
            slots: self.slots.clone(),
            key: (user_id, kind),
            generation: slot.generation,
        })
    }

    /// Mark any in-flight request of this kind as stale.
    pub fn invalidate(&self, user_id: u64, kind: RequestKind) {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slots.entry((user_id, kind)).or_default().generation += 1;
    }
}

/// Held for the lifetime of one request; dropping it frees the slot.
#[derive(Debug)]
pub struct RequestGuard {
    slots: Slots,
    key: (u64, RequestKind),
    generation: u64,
}

impl RequestGuard {
    /// Whether no newer request or invalidation has happened since this one began.
    pub fn is_current(&self) -> bool {
        let slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slots
            .get(&self.key)
            .is_some_and(|s| s.generation == self.generation)
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // At most one guard per slot exists, so it owns the pending flag.
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.pending = false;
        }
    }
}
