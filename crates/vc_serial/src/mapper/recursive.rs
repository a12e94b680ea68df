use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::mapper::Mapper;

// -----------------------------------------------------------------------------
// Recursive

/// A value that can hold a [`Mapper`] while it is being mapped.
///
/// [`Mappable`](crate::Mappable) implementations of container types need a mapper
/// to map their polymorphic fields. The mapper, converter and wrapper attach
/// themselves before calling into the value and detach afterwards.
///
/// Usually this is a [`WithMapper`] field marked `#[tagged(mapper)]`.
pub trait Recursive: Send + Sync {
    /// Attaches `mapper` until the returned guard is dropped.
    ///
    /// Blocks while another thread has a mapper attached to the same value.
    /// Attaching again on the owning thread nests, the inner guard restores
    /// the outer mapper.
    fn attach(&self, mapper: Mapper) -> MapperGuard;

    /// The attached mapper, if any.
    fn mapper(&self) -> Option<Mapper>;
}

// -----------------------------------------------------------------------------
// Slot

#[derive(Default)]
struct SlotState {
    owner: Option<ThreadId>,
    mapper: Option<Mapper>,
}

#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
    released: Condvar,
}

impl Slot {
    #[inline]
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Detaches the mapper on drop, restoring the one attached before.
///
/// The guard owns a handle to the slot, so the value itself stays free to
/// borrow while it is attached.
#[must_use = "the mapper is detached when the guard is dropped"]
pub struct MapperGuard {
    slot: Arc<Slot>,
    previous: Option<Mapper>,
    outermost: bool,
}

impl Drop for MapperGuard {
    fn drop(&mut self) {
        let mut state = self.slot.lock();
        state.mapper = self.previous.take();
        if self.outermost {
            state.owner = None;
            drop(state);
            self.slot.released.notify_one();
        }
    }
}

// -----------------------------------------------------------------------------
// WithMapper

/// A mapper slot embedded in a value.
///
/// Not part of the value's data: it is skipped by serde, compares equal to any
/// other slot, and clones empty.
#[derive(Default)]
pub struct WithMapper {
    slot: Arc<Slot>,
}

impl WithMapper {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recursive for WithMapper {
    fn attach(&self, mapper: Mapper) -> MapperGuard {
        let current = thread::current().id();
        let mut state = self.slot.lock();
        while state.owner.is_some_and(|owner| owner != current) {
            state = self
                .slot
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let outermost = state.owner.is_none();
        state.owner = Some(current);
        let previous = state.mapper.replace(mapper);
        MapperGuard {
            slot: Arc::clone(&self.slot),
            previous,
            outermost,
        }
    }

    fn mapper(&self) -> Option<Mapper> {
        self.slot.lock().mapper.clone()
    }
}

impl Clone for WithMapper {
    #[inline]
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl PartialEq for WithMapper {
    #[inline]
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl core::fmt::Debug for WithMapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let attached = self.slot.lock().owner.is_some();
        f.debug_struct("WithMapper")
            .field("attached", &attached)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
