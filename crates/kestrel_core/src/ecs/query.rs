// query.rs - Conjunctive component queries
//
// A query runs in three steps:
// 1. resolve the requested Rust types to component type ids, dropping
//    duplicates; any type that was never registered means "no matches"
// 2. intersect the per-type entity sets, smallest first, stopping as soon as
//    the running intersection is empty
// 3. resolve a pointer to every requested component of every survivor and
//    wrap them in `EntityView`s

use crate::ecs::view::Slot;
use crate::ecs::{ComponentTypeId, EntityId, EntityView, ErasedStore, TypeRegistry};
use smallvec::SmallVec;
use std::any::TypeId;
use std::ptr::NonNull;

/// A query's component types, resolved and deduplicated.
///
/// Crate-internal: only `Registry` pairs a plan with the type registry it
/// was resolved against and with entities taken from that registry's stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryPlan {
    columns: SmallVec<[(TypeId, ComponentTypeId); 8]>,
}

impl QueryPlan {
    /// Resolve `requested` against `types`.
    ///
    /// Returns `None` when the list is empty or names a type that has never
    /// been stored; both cases answer "no entities".
    pub fn resolve(types: &TypeRegistry, requested: &[TypeId]) -> Option<Self> {
        if requested.is_empty() {
            return None;
        }

        let mut columns: SmallVec<[(TypeId, ComponentTypeId); 8]> = SmallVec::new();
        for &type_id in requested {
            let id = types.lookup(type_id)?;
            if !columns.iter().any(|&(_, existing)| existing == id) {
                columns.push((type_id, id));
            }
        }
        Some(Self { columns })
    }

    /// Distinct component type ids, in request order.
    pub fn type_ids(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.columns.iter().map(|&(_, id)| id)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Entities holding every component of the plan, in the storage order of
    /// the smallest participating store.
    pub fn matching_entities(&self, types: &TypeRegistry) -> Vec<EntityId> {
        let mut stores: SmallVec<[&dyn ErasedStore; 8]> = self
            .type_ids()
            .map(|id| types.store_for(id).expect("registered type has a store"))
            .collect();
        stores.sort_unstable_by_key(|store| store.len());

        let Some((smallest, rest)) = stores.split_first() else {
            return Vec::new();
        };

        let mut survivors = smallest.entities().to_vec();
        for store in rest {
            if survivors.is_empty() {
                break;
            }
            survivors.retain(|&entity| store.contains(entity));
        }
        survivors
    }

    /// Build one view per entity in `entities`.
    ///
    /// `types` must be the registry the plan was resolved against, and
    /// `entities` must be distinct entities holding every component of the
    /// plan (as returned by `matching_entities`). Two views of one entity
    /// would hand out aliasing `&mut` references.
    pub(crate) fn materialize<'w>(
        &self,
        types: &'w mut TypeRegistry,
        entities: &[EntityId],
    ) -> Vec<EntityView<'w>> {
        if entities.is_empty() {
            return Vec::new();
        }

        debug_assert!(
            {
                let mut sorted = entities.to_vec();
                sorted.sort_unstable();
                sorted.windows(2).all(|pair| pair[0] != pair[1])
            },
            "materialize needs distinct entities"
        );

        // Column-major: pointers for column `c` live at `c * n .. (c + 1) * n`.
        let n = entities.len();
        let mut ptrs: Vec<NonNull<u8>> = Vec::with_capacity(n * self.columns.len());
        for id in self.type_ids() {
            types
                .store_for_mut(id)
                .expect("registered type has a store")
                .component_ptrs(entities, &mut ptrs);
        }

        entities
            .iter()
            .enumerate()
            .map(|(row, &entity)| {
                let slots = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(col, &(type_id, _))| Slot {
                        type_id,
                        ptr: ptrs[col * n + row],
                    })
                    .collect();
                EntityView::new(entity, slots)
            })
            .collect()
    }
}
