//! Identity map between script objects and host objects
//!
//! Forward entries map `(HandleId, facade type)` to a weak facade, so each
//! script object has at most one live facade per host type. The facade itself
//! carries the script handle, so nothing on the forward side pins the script
//! object. Inverse entries map a host allocation (by address) to the script
//! object it crossed as; only mirrors use them, and they keep the mirror alive
//! exactly as long as the host object. Dead entries read as misses and are
//! dropped by [`IdentityMap::sweep`].

use crate::engine::HandleId;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

type ForwardKey = (HandleId, TypeId);

struct InverseEntry<H> {
    handle: H,
    alive: Box<dyn Fn() -> bool>,
}

pub struct IdentityMap<H> {
    forward: HashMap<ForwardKey, Weak<dyn Any>>,
    inverse: HashMap<usize, InverseEntry<H>>,
    sweep_interval: usize,
    inserts_since_sweep: usize,
}

/// Address of a host allocation, used as the inverse key.
///
/// An address cannot be reused while an inverse entry holds a weak reference
/// to the allocation, so a live entry always denotes the same object.
pub fn address_of<T: ?Sized>(object: &Rc<T>) -> usize {
    Rc::as_ptr(object) as *const () as usize
}

impl<H: Clone> IdentityMap<H> {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// `sweep_interval` of 0 disables automatic sweeping.
    pub fn with_capacity(capacity: usize, sweep_interval: usize) -> Self {
        Self {
            forward: HashMap::with_capacity(capacity),
            inverse: HashMap::with_capacity(capacity),
            sweep_interval,
            inserts_since_sweep: 0,
        }
    }

    /// Live facade of type `T` for `id`, if any.
    pub fn lookup<T: Any>(&self, id: HandleId) -> Option<Rc<T>> {
        self.lookup_erased(id, TypeId::of::<T>())?
            .downcast::<T>()
            .ok()
    }

    /// Live facade registered under the host type `host_type` for `id`.
    pub fn lookup_erased(&self, id: HandleId, host_type: TypeId) -> Option<Rc<dyn Any>> {
        self.forward.get(&(id, host_type))?.upgrade()
    }

    /// Store `facade` for `(id, T)` unless a live one is already present.
    ///
    /// Returns whichever facade ends up in the map, so a caller that lost a
    /// re-entrant race observes the winner.
    pub fn insert_if_absent<T: Any>(&mut self, id: HandleId, facade: Rc<T>) -> Rc<T> {
        let stored = self.insert_erased(id, TypeId::of::<T>(), facade.clone());
        stored.downcast::<T>().unwrap_or(facade)
    }

    /// Type-erased form of [`IdentityMap::insert_if_absent`].
    pub fn insert_erased(
        &mut self,
        id: HandleId,
        host_type: TypeId,
        facade: Rc<dyn Any>,
    ) -> Rc<dyn Any> {
        if let Some(existing) = self.lookup_erased(id, host_type) {
            return existing;
        }
        self.forward.insert((id, host_type), Rc::downgrade(&facade));
        self.note_insert();
        facade
    }

    /// Non re-entrant convenience: lookup, else construct and insert.
    pub fn lookup_or_create<T: Any, E>(
        &mut self,
        id: HandleId,
        handle: H,
        create: impl FnOnce(H) -> Result<T, E>,
    ) -> Result<Rc<T>, E> {
        if let Some(existing) = self.lookup::<T>(id) {
            return Ok(existing);
        }
        let facade = Rc::new(create(handle)?);
        Ok(self.insert_if_absent(id, facade))
    }

    /// Script handle previously recorded for `object`.
    pub fn inverse<T: ?Sized>(&self, object: &Rc<T>) -> Option<H> {
        let entry = self.inverse.get(&address_of(object))?;
        (entry.alive)().then(|| entry.handle.clone())
    }

    /// Record that `object` crosses into script as `handle`, keeping `handle`
    /// alive until `object` is dropped and swept.
    ///
    /// A live existing binding wins and is returned instead.
    pub fn bind_inverse<T: ?Sized + 'static>(&mut self, object: &Rc<T>, handle: H) -> H {
        if let Some(existing) = self.inverse(object) {
            return existing;
        }
        let weak = Rc::downgrade(object);
        self.inverse.insert(
            address_of(object),
            InverseEntry {
                handle: handle.clone(),
                alive: Box::new(move || weak.strong_count() > 0),
            },
        );
        self.note_insert();
        handle
    }

    /// Drop entries whose facade or host object is gone. Returns how many.
    pub fn sweep(&mut self) -> usize {
        let before = self.forward.len() + self.inverse.len();
        self.forward.retain(|_, facade| facade.strong_count() > 0);
        self.inverse.retain(|_, entry| (entry.alive)());
        self.inserts_since_sweep = 0;
        before - (self.forward.len() + self.inverse.len())
    }

    /// Forget every entry, releasing the handles held for mirrors.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.inverse.clear();
        self.inserts_since_sweep = 0;
    }

    /// Number of stored entries in both directions, including stale ones.
    pub fn len(&self) -> usize {
        self.forward.len() + self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of forward entries whose facade is still alive.
    pub fn live_facades(&self) -> usize {
        self.forward
            .values()
            .filter(|facade| facade.strong_count() > 0)
            .count()
    }

    fn note_insert(&mut self) {
        self.inserts_since_sweep += 1;
        if self.sweep_interval > 0 && self.inserts_since_sweep >= self.sweep_interval {
            let swept = self.sweep();
            tracing::trace!(swept, "identity map auto-sweep");
        }
    }
}

impl<H: Clone> Default for IdentityMap<H> {
    fn default() -> Self {
        Self::new()
    }
}
