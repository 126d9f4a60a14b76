// storage.rs - Per-type sparse component storage
//
// Each component type gets one `ComponentStore<T>`: a dense vector of values
// plus a hash index from entity id to dense slot. Removal swaps the last
// element into the hole, so values stay packed and iteration is linear.
// A store knows nothing about entity masks; keeping masks in step is the
// registry's job.

use crate::ecs::{Component, EntityId};
use std::any::Any;
use std::collections::HashMap;
use std::ptr::NonNull;

/// Storage for every component of one type `T`.
pub struct ComponentStore<T: Component> {
    entities: Vec<EntityId>,
    values: Vec<T>,
    index: HashMap<EntityId, usize>,
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            values: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or overwrite the component of `entity`, returning the old value.
    pub fn put(&mut self, entity: EntityId, value: T) -> Option<T> {
        match self.index.get(&entity) {
            Some(&slot) => Some(std::mem::replace(&mut self.values[slot], value)),
            None => {
                self.index.insert(entity, self.values.len());
                self.entities.push(entity);
                self.values.push(value);
                None
            }
        }
    }

    #[inline]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.index.get(&entity).map(|&slot| &self.values[slot])
    }

    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        match self.index.get(&entity) {
            Some(&slot) => Some(&mut self.values[slot]),
            None => None,
        }
    }

    /// Remove the component of `entity`. Absent entries are not an error.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        let last = self.values.len() - 1;
        if slot != last {
            let moved = self.entities[last];
            self.index.insert(moved, slot);
        }
        self.entities.swap_remove(slot);
        Some(self.values.swap_remove(slot))
    }

    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.index.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entities holding this component, in storage order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.values.iter_mut())
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a `ComponentStore<T>`, so the registry can hold stores
/// of every component type in one table.
pub trait ErasedStore: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// `std::any::type_name` of the stored component.
    fn type_name(&self) -> &'static str;

    fn len(&self) -> usize;
    fn contains(&self, entity: EntityId) -> bool;
    fn entities(&self) -> &[EntityId];

    /// Drop the component of `entity`; returns whether one was present.
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Append a pointer to the component of each of `entities` to `out`.
    ///
    /// Every entity must be present. The pointers share one base borrow of
    /// the value buffer and stay valid until the store is next modified.
    fn component_ptrs(&mut self, entities: &[EntityId], out: &mut Vec<NonNull<u8>>);
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn contains(&self, entity: EntityId) -> bool {
        ComponentStore::contains(self, entity)
    }

    fn entities(&self) -> &[EntityId] {
        ComponentStore::entities(self)
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn component_ptrs(&mut self, entities: &[EntityId], out: &mut Vec<NonNull<u8>>) {
        let base = self.values.as_mut_ptr();
        out.reserve(entities.len());
        for entity in entities {
            let slot = *self
                .index
                .get(entity)
                .expect("entity mask and component store out of sync");
            // SAFETY: `slot` indexes a live value, and `base` comes from a
            // non-null Vec buffer.
            out.push(unsafe { NonNull::new_unchecked(base.add(slot)) }.cast());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(i32);

    fn e(raw: u64) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn put_get_overwrite() {
        let mut store = ComponentStore::new();
        assert_eq!(store.put(e(1), Health(10)), None);
        assert_eq!(store.get(e(1)), Some(&Health(10)));
        assert_eq!(store.put(e(1), Health(20)), Some(Health(10)));
        assert_eq!(store.get(e(1)), Some(&Health(20)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_absent_is_none() {
        let store: ComponentStore<Health> = ComponentStore::new();
        assert_eq!(store.get(e(7)), None);
        assert!(!store.contains(e(7)));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut store = ComponentStore::new();
        for i in 1..=4 {
            store.put(e(i), Health(i as i32));
        }

        // Removing from the middle moves the last entry into the gap.
        assert_eq!(store.remove(e(2)), Some(Health(2)));
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(e(4)), Some(&Health(4)));
        assert_eq!(store.get(e(1)), Some(&Health(1)));
        assert_eq!(store.get(e(3)), Some(&Health(3)));
        assert!(!store.contains(e(2)));

        let mut ids = store.entities().to_vec();
        ids.sort();
        assert_eq!(ids, vec![e(1), e(3), e(4)]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = ComponentStore::new();
        store.put(e(1), Health(1));
        assert_eq!(store.remove(e(9)), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_last_then_reinsert() {
        let mut store = ComponentStore::new();
        store.put(e(1), Health(1));
        store.remove(e(1));
        assert!(store.is_empty());
        store.put(e(1), Health(5));
        assert_eq!(store.get(e(1)), Some(&Health(5)));
    }

    #[test]
    fn erased_access_round_trips() {
        let mut store = ComponentStore::new();
        store.put(e(3), Health(3));

        let erased: &mut dyn ErasedStore = &mut store;
        assert_eq!(erased.len(), 1);
        assert!(erased.contains(e(3)));
        assert!(erased.type_name().ends_with("Health"));

        let mut ptrs = Vec::new();
        erased.component_ptrs(&[e(3)], &mut ptrs);
        assert_eq!(ptrs.len(), 1);
        // SAFETY: the store is not modified while the pointer is used.
        unsafe { ptrs[0].cast::<Health>().as_mut().0 = 30 };

        let typed = erased.as_any().downcast_ref::<ComponentStore<Health>>().unwrap();
        assert_eq!(typed.get(e(3)), Some(&Health(30)));

        assert!(erased.remove_entity(e(3)));
        assert!(!erased.remove_entity(e(3)));
    }
}
