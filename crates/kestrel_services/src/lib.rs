//! Kestrel Services Layer
//!
//! Host-facing services for the runtime. Currently engine settings.

pub mod settings;

pub use settings::{Settings, SettingsError};
