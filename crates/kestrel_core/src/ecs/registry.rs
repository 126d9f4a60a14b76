// registry.rs - The entity/component registry facade
//
// Every structural mutation (add / remove / destroy) goes through this type,
// which updates the component store and the entity mask together. That single
// path is what keeps "bit set <=> store entry present" true.

use crate::ecs::{
    Component, ComponentMask, ComponentSet, ComponentStore, ComponentTypeId, EntityAllocator,
    EntityId, EntityView, MaskTable, QueryPlan, TypeRegistry,
};
use smallvec::SmallVec;
use std::sync::Arc;

/// Owns all component stores and entity masks of one world.
///
/// Registries are plain values passed to whoever needs them; there is no
/// global instance. Mutation takes `&mut self`, so a registry shared between
/// threads needs an outer lock (the usual pattern is a single owner thread
/// doing all structural changes for a frame).
///
/// # Example
/// ```
/// use kestrel_core::ecs::Registry;
///
/// struct Position(f32, f32);
/// struct Velocity(f32, f32);
///
/// let mut registry = Registry::new();
/// let e = registry.create_entity();
/// registry.add_component(e, Position(0.0, 0.0));
/// registry.add_component(e, Velocity(1.0, 0.0));
///
/// for mut view in registry.view::<(Position, Velocity)>() {
///     let v = view.get::<Velocity>().map(|v| (v.0, v.1)).unwrap();
///     let p = view.get_mut::<Position>().unwrap();
///     p.0 += v.0;
///     p.1 += v.1;
/// }
/// assert_eq!(registry.get_component::<Position>(e).unwrap().0, 1.0);
/// ```
pub struct Registry {
    allocator: Arc<EntityAllocator>,
    types: TypeRegistry,
    masks: MaskTable,
}

impl Registry {
    /// Create an empty registry drawing ids from the process-wide allocator.
    pub fn new() -> Self {
        Self::with_allocator(EntityAllocator::shared())
    }

    /// Create an empty registry with its own id source.
    pub fn with_allocator(allocator: Arc<EntityAllocator>) -> Self {
        Self {
            allocator,
            types: TypeRegistry::new(),
            masks: MaskTable::new(),
        }
    }

    /// Allocate a new entity id. The entity holds nothing until a component
    /// is added.
    #[inline]
    pub fn create_entity(&self) -> EntityId {
        self.allocator.create()
    }

    /// Attach `component` to `entity`, replacing (and returning) any previous
    /// component of the same type.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) -> Option<T> {
        let (id, store) = self.types.store_or_register::<T>();
        let previous = store.put(entity, component);
        self.masks.set_bit(entity, id);

        tracing::trace!(
            %entity,
            component = std::any::type_name::<T>(),
            replaced = previous.is_some(),
            "add component"
        );
        previous
    }

    /// Detach component `T` from `entity`. Absent components (or types never
    /// stored) are not an error.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        let id = self.types.type_id::<T>()?;
        let removed = self.types.store_mut::<T>()?.remove(entity);
        self.masks.clear_bit(entity, id);

        if removed.is_some() {
            tracing::trace!(%entity, component = std::any::type_name::<T>(), "remove component");
        }
        removed
    }

    /// Remove every component of `entity`. Returns how many were removed.
    pub fn destroy_entity(&mut self, entity: EntityId) -> usize {
        let mask = self.masks.take(entity);
        let mut removed = 0;
        for id in mask.iter() {
            if let Some(store) = self.types.store_for_mut(id) {
                if store.remove_entity(entity) {
                    removed += 1;
                }
            }
        }

        tracing::trace!(%entity, removed, "destroy entity");
        removed
    }

    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.types.store::<T>()?.get(entity)
    }

    /// Mutable access to one component, outside of any query.
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.types.store_mut::<T>()?.get_mut(entity)
    }

    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.types
            .type_id::<T>()
            .map_or(false, |id| self.masks.has(entity, id))
    }

    /// Whether `entity` holds every component of `S`. An empty set never
    /// matches, mirroring `view`.
    pub fn has_components<S: ComponentSet>(&self, entity: EntityId) -> bool {
        let Some(plan) = QueryPlan::resolve(&self.types, &S::type_ids()) else {
            return false;
        };
        let ids: SmallVec<[ComponentTypeId; 8]> = plan.type_ids().collect();
        self.masks.has_all(entity, &ids)
    }

    /// Every `(entity, component)` pair of type `T`, in storage order.
    pub fn components<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.types
            .store::<T>()
            .into_iter()
            .flat_map(|store| store.iter())
    }

    pub fn components_mut<T: Component>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.types
            .store_mut::<T>()
            .into_iter()
            .flat_map(|store| store.iter_mut())
    }

    /// Number of entities holding component `T`.
    pub fn count<T: Component>(&self) -> usize {
        self.types.store::<T>().map_or(0, ComponentStore::len)
    }

    /// Views over every entity that holds all components of `S`.
    ///
    /// An empty set, or a set naming a type no entity has ever held, yields
    /// no views. Duplicated types are counted once. Result order follows the
    /// storage order of the smallest participating store and is otherwise
    /// unspecified.
    ///
    /// The views borrow the registry mutably: structural changes have to
    /// wait until they are dropped.
    pub fn view<S: ComponentSet>(&mut self) -> Vec<EntityView<'_>> {
        let Some(plan) = QueryPlan::resolve(&self.types, &S::type_ids()) else {
            return Vec::new();
        };
        let entities = plan.matching_entities(&self.types);
        debug_assert!(entities.iter().all(|&entity| {
            let ids: SmallVec<[ComponentTypeId; 8]> = plan.type_ids().collect();
            self.masks.has_all(entity, &ids)
        }));
        plan.materialize(&mut self.types, &entities)
    }

    /// Ids of the entities `view::<S>()` would return, without resolving
    /// any components.
    pub fn entities_with<S: ComponentSet>(&self) -> Vec<EntityId> {
        QueryPlan::resolve(&self.types, &S::type_ids())
            .map(|plan| plan.matching_entities(&self.types))
            .unwrap_or_default()
    }

    /// Runtime id of `T`, if any entity has ever held one.
    pub fn type_id<T: Component>(&self) -> Option<ComponentTypeId> {
        self.types.type_id::<T>()
    }

    /// Component mask of `entity` (empty when it holds nothing).
    pub fn mask(&self, entity: EntityId) -> ComponentMask {
        self.masks.mask(entity)
    }

    /// Entities currently holding at least one component.
    pub fn entity_count(&self) -> usize {
        self.masks.len()
    }

    /// Number of distinct component types seen so far.
    pub fn component_type_count(&self) -> usize {
        self.types.len()
    }

    pub fn allocator(&self) -> &Arc<EntityAllocator> {
        &self.allocator
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
