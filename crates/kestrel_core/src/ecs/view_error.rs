use crate::ecs::EntityId;
use thiserror::Error;

/// Strict-access failures on an `EntityView`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("component '{component}' was not part of the query that produced the view of {entity}")]
    NotInQuery {
        entity: EntityId,
        component: &'static str,
    },
}
