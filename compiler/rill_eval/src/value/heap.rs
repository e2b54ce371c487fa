//! Shared, identity-bearing heap cell behind every `Value` variant.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::identity::{Identity, IdentityCell};

struct HeapCell<T> {
    identity: IdentityCell,
    data: T,
}

/// Reference-counted value payload with a lazily assigned identity.
///
/// Cloning a `Heap` shares the allocation and therefore the identity.
/// Construction is crate-private: values are created through the factory
/// methods on `Value`.
pub struct Heap<T>(Arc<HeapCell<T>>);

impl<T> Heap<T> {
    #[inline]
    pub(crate) fn new(data: T) -> Self {
        Heap(Arc::new(HeapCell {
            identity: IdentityCell::unassigned(),
            data,
        }))
    }

    #[inline]
    pub(crate) fn with_identity(data: T, identity: Identity) -> Self {
        Heap(Arc::new(HeapCell {
            identity: IdentityCell::assigned(identity),
            data,
        }))
    }

    /// Identity of this allocation, assigned on first request.
    #[inline]
    pub fn identity(&self) -> Identity {
        self.0.identity.get_or_assign()
    }

    /// Whether an identity has been handed out yet.
    pub fn has_identity(&self) -> bool {
        self.0.identity.is_assigned()
    }

    /// Whether two handles share one allocation.
    #[inline]
    pub fn ptr_eq(a: &Heap<T>, b: &Heap<T>) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Allocation address, for cycle detection during traversal.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0.data
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.data.fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.data.fmt(f)
    }
}
