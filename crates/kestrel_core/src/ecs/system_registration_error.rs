use crate::ecs::SystemHandle;
use thiserror::Error;

/// Errors that can occur while registering a system.
#[derive(Debug, Error)]
pub enum SystemRegistrationError {
    #[error("system '{name}' is already registered as {existing}")]
    DuplicateName { name: String, existing: SystemHandle },

    #[error("systems must have a non-empty name")]
    EmptyName,
}
