// view.rs - Per-entity query results
//
// An `EntityView` pairs an entity with pointers to exactly the components its
// query asked for. Pointers are resolved once, when the query runs. The view
// borrows the registry mutably for `'w`, so no component can be added or
// removed while any view from that query is alive.

use crate::ecs::{Component, EntityId, ViewError};
use smallvec::SmallVec;
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

#[derive(Clone, Copy)]
pub(crate) struct Slot {
    pub(crate) type_id: TypeId,
    pub(crate) ptr: NonNull<u8>,
}

/// Typed access to the queried components of one entity.
pub struct EntityView<'w> {
    entity: EntityId,
    slots: SmallVec<[Slot; 4]>,
    _registry: PhantomData<&'w mut ()>,
}

// SAFETY: every pointee is a `Component` (Send + Sync), each view points at
// components of a different entity, and the `'w` borrow keeps the stores
// from being modified while views exist.
unsafe impl Send for EntityView<'_> {}
unsafe impl Sync for EntityView<'_> {}

impl<'w> EntityView<'w> {
    pub(crate) fn new(entity: EntityId, slots: SmallVec<[Slot; 4]>) -> Self {
        Self {
            entity,
            slots,
            _registry: PhantomData,
        }
    }

    /// The entity this view belongs to.
    #[inline]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Component `T` of this entity.
    ///
    /// Returns `None` when `T` was not one of the queried types; use
    /// [`try_get`](Self::try_get) to treat that as an error instead.
    #[inline]
    pub fn get<T: Component>(&self) -> Option<&T> {
        let slot = self.slot(TypeId::of::<T>())?;
        // SAFETY: the slot was resolved from the `ComponentStore<T>` for this
        // entity, and the store cannot change while `'w` is borrowed.
        Some(unsafe { slot.ptr.cast::<T>().as_ref() })
    }

    /// Mutable access to component `T`. Writes go straight to the backing
    /// store and are visible to later queries.
    #[inline]
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        let mut ptr = self.slot(TypeId::of::<T>())?.ptr.cast::<T>();
        // SAFETY: as in `get`; `&mut self` makes this the only live reference
        // handed out by this view, and no other view aliases this entity.
        Some(unsafe { ptr.as_mut() })
    }

    pub fn try_get<T: Component>(&self) -> Result<&T, ViewError> {
        let entity = self.entity;
        self.get::<T>().ok_or_else(|| not_in_query::<T>(entity))
    }

    pub fn try_get_mut<T: Component>(&mut self) -> Result<&mut T, ViewError> {
        let entity = self.entity;
        self.get_mut::<T>().ok_or_else(|| not_in_query::<T>(entity))
    }

    /// Whether `T` was part of the query.
    pub fn includes<T: Component>(&self) -> bool {
        self.slot(TypeId::of::<T>()).is_some()
    }

    /// Number of distinct component types this view exposes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn slot(&self, type_id: TypeId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.type_id == type_id)
    }
}

impl fmt::Debug for EntityView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityView")
            .field("entity", &self.entity)
            .field("components", &self.slots.len())
            .finish()
    }
}

fn not_in_query<T: Component>(entity: EntityId) -> ViewError {
    ViewError::NotInQuery {
        entity,
        component: std::any::type_name::<T>(),
    }
}
