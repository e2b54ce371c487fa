//! Stable per-value identity.
//!
//! Identities are slot numbers drawn from a process-wide counter. A value's
//! identity is assigned the first time it is requested and never changes
//! afterwards. Identities exist for the serialization codec (deduplication
//! and back-references); they never take part in equality.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Next unassigned identity. Starts at 1 so `0` never names a live value.
static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// Opaque identity token of a value.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(u64);

impl Identity {
    /// Allocate a fresh identity, distinct from every one handed out or
    /// installed so far.
    pub fn fresh() -> Self {
        Identity(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an identity from its raw slot number.
    ///
    /// The allocator is advanced past `raw`, so fresh identities handed out
    /// later never collide with one installed this way.
    pub fn from_raw(raw: u64) -> Self {
        NEXT_IDENTITY.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
        Identity(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lazily assigned identity slot.
///
/// Assignment takes a lock so two evaluators asking for the same value's
/// identity at once agree on a single token.
pub(crate) struct IdentityCell {
    slot: Mutex<Option<Identity>>,
}

impl IdentityCell {
    pub(crate) fn unassigned() -> Self {
        IdentityCell {
            slot: Mutex::new(None),
        }
    }

    pub(crate) fn assigned(identity: Identity) -> Self {
        IdentityCell {
            slot: Mutex::new(Some(identity)),
        }
    }

    pub(crate) fn get_or_assign(&self) -> Identity {
        *self.slot.lock().get_or_insert_with(Identity::fresh)
    }

    pub(crate) fn is_assigned(&self) -> bool {
        self.slot.lock().is_some()
    }
}
