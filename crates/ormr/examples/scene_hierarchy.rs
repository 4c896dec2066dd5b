//! Entity Hierarchies — solar system, headless.
//!
//! Builds a sun with orbiting planets and moons purely out of entity paths,
//! spins the orbit pivots for a few steps and prints where everything ends up.
//! Moons follow their planets through the transform hierarchy alone.
//!
//! Run with: `RUST_LOG=debug cargo run -p ormr --example scene_hierarchy`

use std::f32::consts::TAU;

use ormr::prelude::*;

const STEPS: usize = 4;

fn main() -> Result<()> {
    env_logger::init();

    let mut world = World::new();
    let scene = world.spawn("system");
    world.make_path_to_component(scene, "sun:TransformNode")?;

    // (name, distance, orbit speed in turns per step, moon count)
    let planets = [("mercury", 4.0, 0.24, 0), ("earth", 10.0, 0.1, 1), ("jupiter", 25.0, 0.02, 2)];

    for &(name, distance, _, moons) in &planets {
        let pivot = world.make_path(scene, &format!("sun/{name}_orbit"))?;
        world.component::<TransformNode>(pivot)?;

        let planet = world.entity(pivot, name)?;
        world.component::<TransformNode>(planet)?.set_position(Vec3::new(distance, 0.0, 0.0));
        world.component::<Object3D>(planet)?;

        for i in 0..moons {
            let moon_pivot = world.spawn_child(planet, "moon_orbit")?;
            world.component::<TransformNode>(moon_pivot)?;
            let moon = world.entity(moon_pivot, "moon")?;
            world
                .component::<TransformNode>(moon)?
                .set_position(Vec3::new(1.5 + i as f32, 0.0, 0.0));
        }
    }

    // A camera that tracks the earth explicitly, wherever it sits in the tree.
    let camera = world.make_path(scene, "camera")?;
    world.component::<Camera>(camera)?;
    world.component::<TransformNode>(camera)?.set_position(Vec3::new(0.0, 2.0, 6.0));
    let earth = world
        .entity_by_path(scene, "sun/earth_orbit/earth")
        .ok_or(SceneError::NoSuchEntity)?;
    world.set_transform_parent(camera, Some(earth))?;

    for step in 0..STEPS {
        for &(name, _, speed, _) in &planets {
            let pivot = world
                .entity_by_path(scene, &format!("sun/{name}_orbit"))
                .ok_or(SceneError::NoSuchEntity)?;
            world.modify_transform(pivot, |node| node.rotate_around_axis(Vec3::Y, speed * TAU));
        }
        let recomputed = world.update_transforms(scene)?;
        log::debug!("step {step}: recomputed {recomputed} nodes");
    }

    println!("after {STEPS} steps:");
    world.for_each_entity_in_branch(scene, |entity| {
        if let Some(node) = world.transform(entity) {
            let p = node.world_position();
            println!("  {:<40} ({:>7.2}, {:>5.2}, {:>7.2})", world.path(entity), p.x, p.y, p.z);
        }
    });

    let earth_pos = world.transform(earth).map(|n| n.world_position()).unwrap_or_default();
    let camera_pos = world.transform(camera).map(|n| n.world_position()).unwrap_or_default();
    println!("camera offset from earth: {:?}", camera_pos - earth_pos);
    Ok(())
}
