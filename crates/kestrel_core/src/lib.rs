//! Kestrel Engine Core
//!
//! Contains the simulation building blocks:
//! - Entity/component registry and queries
//! - System lifecycle and scheduling
//! - Fixed-step simulation time
//! - Shared transform and motion components

pub mod components;
pub mod ecs;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
