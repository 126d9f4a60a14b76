//! Demo systems driven by the runtime loop

use kestrel_core::components::{Transform, Velocity};
use kestrel_core::ecs::{Registry, System};
use kestrel_core::glam::{Mat4, Vec3};
use rayon::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// What to draw for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderable {
    pub mesh: MeshId,
    pub material: MaterialId,
}

/// Integrates `Velocity` into `Transform` and keeps entities inside a cube
/// of half-extent `bounds` by reflecting them off its faces.
pub struct MovementSystem {
    bounds: f32,
}

impl MovementSystem {
    pub fn new(bounds: f32) -> Self {
        Self { bounds }
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn on_update(&mut self, registry: &mut Registry, delta_time: f32) {
        let bounds = self.bounds;
        registry
            .view::<(Transform, Velocity)>()
            .par_iter_mut()
            .for_each(|view| {
                let Some(mut linear) = view.get::<Velocity>().map(|v| v.linear) else {
                    return;
                };
                let Some(transform) = view.get_mut::<Transform>() else {
                    return;
                };

                transform.position += linear * delta_time;
                for axis in 0..3 {
                    if transform.position[axis].abs() > bounds {
                        transform.position[axis] = transform.position[axis].clamp(-bounds, bounds);
                        linear[axis] = -linear[axis];
                    }
                }

                if let Some(velocity) = view.get_mut::<Velocity>() {
                    velocity.linear = linear;
                }
            });
    }
}

/// One draw batch: every instance sharing a material.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBatch {
    pub material: MaterialId,
    pub instances: Vec<(MeshId, Mat4)>,
}

/// Headless stand-in for the renderer. Each frame it groups renderable
/// entities by material, which is the order a GPU backend would bind state.
#[derive(Default)]
pub struct RenderBatchSystem {
    batches: Vec<RenderBatch>,
    frames: u64,
}

impl RenderBatchSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches built by the most recent render pass, ordered by material.
    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.instances.len()).sum()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn build_batches(&mut self, registry: &mut Registry) {
        let mut by_material: HashMap<MaterialId, Vec<(MeshId, Mat4)>> = HashMap::new();
        for view in registry.view::<(Transform, Renderable)>() {
            let (Some(transform), Some(renderable)) =
                (view.get::<Transform>(), view.get::<Renderable>())
            else {
                continue;
            };
            by_material
                .entry(renderable.material)
                .or_default()
                .push((renderable.mesh, transform.matrix()));
        }

        self.batches = by_material
            .into_iter()
            .map(|(material, instances)| RenderBatch {
                material,
                instances,
            })
            .collect();
        self.batches.sort_by_key(|batch| batch.material);
    }
}

impl System for RenderBatchSystem {
    fn name(&self) -> &str {
        "render_batch"
    }

    fn on_render(&mut self, registry: &mut Registry, _delta_time: f32) {
        self.build_batches(registry);
        self.frames += 1;
        tracing::trace!(
            batches = self.batches.len(),
            instances = self.instance_count(),
            "built render batches"
        );
    }

    fn on_destroy(&mut self, _registry: &mut Registry) {
        tracing::info!(frames = self.frames, "render batching stopped");
        self.batches.clear();
    }
}

/// Spawn `count` moving, renderable entities spread over a grid.
pub fn spawn_demo_entities(registry: &mut Registry, count: usize, materials: u32) {
    let side = (count as f32).cbrt().ceil().max(1.0) as usize;
    let materials = materials.max(1);

    for i in 0..count {
        let entity = registry.create_entity();
        let cell = Vec3::new(
            (i % side) as f32,
            ((i / side) % side) as f32,
            (i / (side * side)) as f32,
        );
        let position = cell - Vec3::splat(side as f32 / 2.0);
        let heading = Vec3::new(
            (i as f32 * 0.37).sin(),
            (i as f32 * 0.11).cos(),
            (i as f32 * 0.23).sin(),
        );

        registry.add_component(entity, Transform::from_position(position));
        registry.add_component(entity, Velocity::new(heading));
        registry.add_component(
            entity,
            Renderable {
                mesh: MeshId(i as u32 % 3),
                material: MaterialId(i as u32 % materials),
            },
        );
    }
    tracing::info!(count, "spawned demo entities");
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::ecs::EntityAllocator;
    use std::sync::Arc;

    fn registry() -> Registry {
        Registry::with_allocator(Arc::new(EntityAllocator::new()))
    }

    #[test]
    fn movement_integrates_velocity() {
        let mut registry = registry();
        let moving = registry.create_entity();
        registry.add_component(moving, Transform::default());
        registry.add_component(moving, Velocity::new(Vec3::new(2.0, 0.0, -1.0)));
        let still = registry.create_entity();
        registry.add_component(still, Transform::default());

        let mut movement = MovementSystem::new(100.0);
        movement.on_update(&mut registry, 0.5);

        let moved = registry.get_component::<Transform>(moving).unwrap();
        assert_eq!(moved.position, Vec3::new(1.0, 0.0, -0.5));
        assert_eq!(
            registry.get_component::<Transform>(still).unwrap().position,
            Vec3::ZERO
        );
    }

    #[test]
    fn movement_reflects_at_bounds() {
        let mut registry = registry();
        let e = registry.create_entity();
        registry.add_component(e, Transform::from_position(Vec3::new(0.9, 0.0, 0.0)));
        registry.add_component(e, Velocity::new(Vec3::new(1.0, 0.0, 0.0)));

        MovementSystem::new(1.0).on_update(&mut registry, 0.5);

        assert_eq!(registry.get_component::<Transform>(e).unwrap().position.x, 1.0);
        assert_eq!(registry.get_component::<Velocity>(e).unwrap().linear.x, -1.0);
    }

    #[test]
    fn render_batches_group_by_material() {
        let mut registry = registry();
        spawn_demo_entities(&mut registry, 10, 3);
        // No transform, so not drawn.
        let hidden = registry.create_entity();
        registry.add_component(
            hidden,
            Renderable {
                mesh: MeshId(0),
                material: MaterialId(0),
            },
        );

        let mut render = RenderBatchSystem::new();
        render.on_render(&mut registry, 0.016);

        let materials: Vec<_> = render.batches().iter().map(|b| b.material).collect();
        assert_eq!(materials, vec![MaterialId(0), MaterialId(1), MaterialId(2)]);
        assert_eq!(render.batches()[0].instances.len(), 4);
        assert_eq!(render.instance_count(), 10);
        assert_eq!(render.frames(), 1);

        render.on_destroy(&mut registry);
        assert!(render.batches().is_empty());
    }

    #[test]
    fn demo_spawn_creates_full_entities() {
        let mut registry = registry();
        spawn_demo_entities(&mut registry, 27, 0);
        assert_eq!(registry.count::<Transform>(), 27);
        assert_eq!(registry.entities_with::<(Transform, Velocity, Renderable)>().len(), 27);
        assert!(registry
            .components::<Renderable>()
            .all(|(_, r)| r.material == MaterialId(0)));
    }
}
