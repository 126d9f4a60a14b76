use crate::ecs::Registry;

/// A unit of game logic driven by the application loop.
///
/// Every callback receives the registry explicitly. All hooks default to
/// no-ops, so a system only implements the phases it cares about.
pub trait System: Send {
    /// Unique, non-empty name used for registration, logging and profiling.
    fn name(&self) -> &str;

    /// Called once before the first update.
    fn on_init(&mut self, _registry: &mut Registry) {}

    /// Called once per frame with the frame's delta time in seconds.
    fn on_update(&mut self, _registry: &mut Registry, _delta_time: f32) {}

    /// Called once per frame after every system has updated.
    fn on_render(&mut self, _registry: &mut Registry, _delta_time: f32) {}

    /// Called once when the application shuts down.
    fn on_destroy(&mut self, _registry: &mut Registry) {}
}
