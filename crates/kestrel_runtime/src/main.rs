//! Kestrel Engine Runtime
//!
//! Headless binary: loads settings, spawns a demo scene and runs the frame
//! loop for a fixed number of frames.
//!
//! Usage: `kestrel [settings.json]`

mod systems;

use anyhow::{Context, Result};
use kestrel_core::ecs::{Registry, SystemPhase, SystemRegistry};
use kestrel_core::time::{FixedTimestep, SimulationTime};
use kestrel_metrics::FrameTimer;
use kestrel_services::Settings;
use std::time::{Duration, Instant};
use systems::{spawn_demo_entities, MovementSystem, RenderBatchSystem};

const DEFAULT_SETTINGS_PATH: &str = "kestrel.json";
const DEMO_MATERIALS: u32 = 4;
const DEMO_BOUNDS: f32 = 50.0;

fn main() -> Result<()> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = Settings::load_or_default(&settings_path)
        .with_context(|| format!("loading settings from {settings_path}"))?;

    tracing_subscriber::fmt()
        .with_max_level(settings.logging.max_level()?)
        .init();

    tracing::info!("Kestrel Engine v{}", kestrel_core::VERSION);
    run(&settings)
}

fn run(settings: &Settings) -> Result<()> {
    let mut registry = Registry::new();
    spawn_demo_entities(&mut registry, settings.demo.entity_count, DEMO_MATERIALS);

    let mut systems = SystemRegistry::with_profile_window(settings.metrics.frame_window);
    let movement = systems.register(MovementSystem::new(DEMO_BOUNDS))?;
    let render = systems.register(RenderBatchSystem::new())?;

    let mut timestep = FixedTimestep::new(
        settings.simulation.tick_rate_hz,
        settings.simulation.max_substeps,
    );
    let mut sim_time = SimulationTime::new(timestep.step());
    let mut frame_timer = FrameTimer::new(settings.metrics.frame_window);
    let frame_budget = timestep.step();
    let report_every = settings.metrics.frame_window as u64;

    systems.run_init(&mut registry);

    let mut last_frame = Instant::now();
    for frame in 1..=settings.demo.frames {
        frame_timer.begin();
        let now = Instant::now();
        let delta = now - last_frame;
        last_frame = now;

        let steps = timestep.advance(delta);
        for _ in 0..steps {
            systems.run_update(&mut registry, timestep.step_secs());
            sim_time.advance_tick();
        }
        systems.run_render(&mut registry, delta.as_secs_f32());

        frame_timer.end();
        if frame % report_every == 0 {
            tracing::info!(
                frame,
                ticks = sim_time.tick_count(),
                fps = frame_timer.fps(),
                frame_ms = frame_timer.frame_time_ms(),
                movement_ms = ms(systems.timing(movement, SystemPhase::Update)),
                render_ms = ms(systems.timing(render, SystemPhase::Render)),
                entities = registry.entity_count(),
                "frame report"
            );
        }

        // Pace the loop to the simulation rate.
        if let Some(idle) = frame_budget.checked_sub(now.elapsed()) {
            std::thread::sleep(idle);
        }
    }

    systems.run_destroy(&mut registry);
    tracing::info!(
        ticks = sim_time.tick_count(),
        simulated_secs = sim_time.total_time().as_secs_f64(),
        dropped_ms = ms(timestep.dropped()),
        "shutdown complete"
    );
    Ok(())
}

fn ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
