// type_registry.rs - Rust type -> ComponentTypeId mapping and store ownership
//
// The id table and the store table grow together: assigning a new id and
// creating its store happen in one `&mut self` call, so an id never exists
// without its store. Concurrent first-use registration is excluded by the
// borrow (callers sharing a registry across threads wrap it in a lock).

use crate::ecs::{Component, ComponentStore, ComponentTypeId, ErasedStore};
use std::any::TypeId;
use std::collections::HashMap;

pub struct TypeRegistry {
    ids: HashMap<TypeId, ComponentTypeId>,
    stores: Vec<Box<dyn ErasedStore>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            stores: Vec::new(),
        }
    }

    /// Id of `T`, assigning the next free id (and creating the store) on
    /// first use.
    pub fn register<T: Component>(&mut self) -> ComponentTypeId {
        if let Some(&id) = self.ids.get(&TypeId::of::<T>()) {
            return id;
        }

        let index = u32::try_from(self.stores.len()).expect("component type id space exhausted");
        let id = ComponentTypeId::new(index);
        self.stores.push(Box::new(ComponentStore::<T>::new()));
        self.ids.insert(TypeId::of::<T>(), id);

        tracing::debug!(
            component = std::any::type_name::<T>(),
            type_id = %id,
            "registered component type"
        );
        id
    }

    /// Id of `T` if it has been registered. Never assigns.
    #[inline]
    pub fn type_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.lookup(TypeId::of::<T>())
    }

    #[inline]
    pub fn lookup(&self, type_id: TypeId) -> Option<ComponentTypeId> {
        self.ids.get(&type_id).copied()
    }

    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let id = self.type_id::<T>()?;
        self.stores[id.index()].as_any().downcast_ref()
    }

    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        let id = self.type_id::<T>()?;
        self.stores[id.index()].as_any_mut().downcast_mut()
    }

    /// Store for `T`, registering the type first if needed.
    pub fn store_or_register<T: Component>(&mut self) -> (ComponentTypeId, &mut ComponentStore<T>) {
        let id = self.register::<T>();
        let store = self.stores[id.index()]
            .as_any_mut()
            .downcast_mut()
            .expect("store type matches its registered id");
        (id, store)
    }

    /// The store owned by `id`.
    pub fn store_for(&self, id: ComponentTypeId) -> Option<&dyn ErasedStore> {
        self.stores.get(id.index()).map(|s| &**s)
    }

    pub fn store_for_mut(&mut self, id: ComponentTypeId) -> Option<&mut (dyn ErasedStore + 'static)> {
        self.stores.get_mut(id.index()).map(|s| &mut **s)
    }

    /// Number of registered component types.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
