//! Entity/component registry.
//!
//! Entities are bare ids. Components of each Rust type live in their own
//! sparse store, and every entity carries a bit mask of the component types
//! it holds. Queries intersect stores smallest-first and hand back
//! [`EntityView`]s with direct access to the requested components.
//!
//! Systems implement [`System`] and are driven in registration order by a
//! [`SystemRegistry`], receiving the [`Registry`] explicitly.
//!
//! Views are only built by [`Registry::view`]; query planning is not part of
//! the public API:
//!
//! ```compile_fail
//! use kestrel_core::ecs::QueryPlan;
//! ```

mod component;
mod entity;
mod mask;
mod query;
mod registry;
mod storage;
mod system;
mod system_handle;
mod system_registration_error;
mod system_registry;
mod type_registry;
pub(crate) mod view;
mod view_error;

pub use component::{Component, ComponentSet, ComponentTypeId, TypeIdList};
pub use entity::{EntityAllocator, EntityId};
pub use mask::{ComponentMask, MaskTable};
pub(crate) use query::QueryPlan;
pub use registry::Registry;
pub use storage::{ComponentStore, ErasedStore};
pub use system::System;
pub use system_handle::SystemHandle;
pub use system_registration_error::SystemRegistrationError;
pub use system_registry::{SystemPhase, SystemRegistry};
pub use type_registry::TypeRegistry;
pub use view::EntityView;
pub use view_error::ViewError;
