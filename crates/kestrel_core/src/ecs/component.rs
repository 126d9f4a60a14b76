// component.rs - Component marker trait, runtime type ids and query type lists
//
// Components are plain Rust values. The registry assigns each distinct Rust
// type a dense `ComponentTypeId` the first time it is stored, so no up-front
// registration (and no global table of ids) is needed.

use smallvec::{smallvec, SmallVec};
use std::any::TypeId;
use std::fmt;

/// Any `'static + Send + Sync` value can be stored as a component.
///
/// The `Send + Sync` bound lets query results be processed from worker
/// threads (see `EntityView`).
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

/// Dense runtime id of a component type, assigned from 0 upward in order of
/// first use. Stable for the life of the registry that assigned it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(u32);

impl ComponentTypeId {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Bit / store index backing this id.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rust type ids of the components named by a query.
pub type TypeIdList = SmallVec<[TypeId; 8]>;

/// A list of component types, written as a tuple: `(Transform, Velocity)`.
///
/// Single-type queries use a one-element tuple, `(Transform,)`. The empty
/// tuple is also a valid (always empty) query.
pub trait ComponentSet: 'static {
    /// Rust type ids in declaration order, duplicates included.
    fn type_ids() -> TypeIdList;
}

impl ComponentSet for () {
    fn type_ids() -> TypeIdList {
        SmallVec::new()
    }
}

macro_rules! impl_component_set {
    ($($T:ident),+) => {
        impl<$($T: Component),+> ComponentSet for ($($T,)+) {
            fn type_ids() -> TypeIdList {
                smallvec![$(TypeId::of::<$T>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
impl_component_set!(A, B, C, D, E, F, G, H, I);
impl_component_set!(A, B, C, D, E, F, G, H, I, J);
impl_component_set!(A, B, C, D, E, F, G, H, I, J, K);
impl_component_set!(A, B, C, D, E, F, G, H, I, J, K, L);

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;

    #[test]
    fn tuple_lists_types_in_order() {
        let ids = <(Position, Velocity)>::type_ids();
        assert_eq!(
            ids.as_slice(),
            &[TypeId::of::<Position>(), TypeId::of::<Velocity>()]
        );
    }

    #[test]
    fn duplicates_are_kept_in_the_raw_list() {
        let ids = <(Position, Position)>::type_ids();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn unit_is_empty() {
        assert!(<()>::type_ids().is_empty());
    }
}
