// system_registry.rs - Ordered schedule of systems
//
// Systems run in registration order for every phase. Each callback gets the
// registry explicitly and is timed through the metrics profiler.

use crate::ecs::{Registry, System, SystemHandle, SystemRegistrationError};
use kestrel_metrics::SystemProfiler;
use std::collections::HashMap;
use std::time::Duration;

/// One of the four callbacks every system exposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SystemPhase {
    Init,
    Update,
    Render,
    Destroy,
}

impl SystemPhase {
    pub const ALL: [SystemPhase; 4] = [
        SystemPhase::Init,
        SystemPhase::Update,
        SystemPhase::Render,
        SystemPhase::Destroy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemPhase::Init => "init",
            SystemPhase::Update => "update",
            SystemPhase::Render => "render",
            SystemPhase::Destroy => "destroy",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

pub struct SystemRegistry {
    systems: Vec<RegisteredSystem>,
    name_lookup: HashMap<String, SystemHandle>,
    profiler: SystemProfiler,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::with_profile_window(60)
    }

    /// Keep `window` timing samples per system callback.
    pub fn with_profile_window(window: usize) -> Self {
        Self {
            systems: Vec::new(),
            name_lookup: HashMap::new(),
            profiler: SystemProfiler::new(window),
        }
    }

    pub fn register<S: System + 'static>(
        &mut self,
        system: S,
    ) -> Result<SystemHandle, SystemRegistrationError> {
        self.register_boxed(Box::new(system))
    }

    pub fn register_boxed(
        &mut self,
        system: Box<dyn System>,
    ) -> Result<SystemHandle, SystemRegistrationError> {
        let name = system.name().to_string();
        if name.is_empty() {
            return Err(SystemRegistrationError::EmptyName);
        }
        if let Some(&existing) = self.name_lookup.get(&name) {
            return Err(SystemRegistrationError::DuplicateName { name, existing });
        }

        let handle = SystemHandle::from_position(self.systems.len());
        tracing::debug!(system = %name, handle = %handle, "registered system");
        let profile_keys = SystemPhase::ALL.map(|phase| format!("{name}::{}", phase.as_str()));
        self.name_lookup.insert(name.clone(), handle);
        self.systems.push(RegisteredSystem {
            name,
            profile_keys,
            system,
        });
        Ok(handle)
    }

    pub fn handle(&self, name: &str) -> Option<SystemHandle> {
        self.name_lookup.get(name).copied()
    }

    pub fn name(&self, handle: SystemHandle) -> Option<&str> {
        self.systems
            .get(handle.position())
            .map(|system| system.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Registered systems in run order.
    pub fn iter(&self) -> impl Iterator<Item = (SystemHandle, &str)> {
        self.systems
            .iter()
            .enumerate()
            .map(|(position, system)| (SystemHandle::from_position(position), system.name.as_str()))
    }

    pub fn run_init(&mut self, registry: &mut Registry) {
        if self.systems.is_empty() {
            tracing::warn!("initializing an empty system schedule");
        } else {
            tracing::info!(systems = self.systems.len(), "initializing systems");
        }
        self.run_phase(SystemPhase::Init, |system| system.on_init(registry));
    }

    pub fn run_update(&mut self, registry: &mut Registry, delta_time: f32) {
        self.run_phase(SystemPhase::Update, |system| {
            system.on_update(registry, delta_time)
        });
    }

    pub fn run_render(&mut self, registry: &mut Registry, delta_time: f32) {
        self.run_phase(SystemPhase::Render, |system| {
            system.on_render(registry, delta_time)
        });
    }

    pub fn run_destroy(&mut self, registry: &mut Registry) {
        tracing::info!(systems = self.systems.len(), "destroying systems");
        self.run_phase(SystemPhase::Destroy, |system| system.on_destroy(registry));
    }

    /// Rolling average time of one system's `phase` callback. Zero when
    /// metrics are compiled out.
    pub fn timing(&self, handle: SystemHandle, phase: SystemPhase) -> Duration {
        self.profile_key(handle, phase)
            .map_or(Duration::ZERO, |key| self.profiler.get_timing(key))
    }

    /// Name under which `phase` of `handle` is recorded in the profiler.
    pub fn profile_key(&self, handle: SystemHandle, phase: SystemPhase) -> Option<&str> {
        self.systems
            .get(handle.position())
            .map(|system| system.profile_keys[phase.slot()].as_str())
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    fn run_phase(&mut self, phase: SystemPhase, mut call: impl FnMut(&mut dyn System)) {
        for entry in &mut self.systems {
            let span = tracing::trace_span!("system", name = %entry.name, phase = phase.as_str());
            let _enter = span.enter();
            let system = entry.system.as_mut();
            self.profiler
                .time_system(&entry.profile_keys[phase.slot()], || call(system));
        }
    }
}

impl Default for SystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct RegisteredSystem {
    name: String,
    /// Profiler names, one per `SystemPhase`, built once at registration.
    profile_keys: [String; 4],
    system: Box<dyn System>,
}
