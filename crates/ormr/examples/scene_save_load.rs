//! Scene Save/Load — round-trip through a JSON file.
//!
//! Registers a custom component next to the built-ins, builds a small scene
//! with cross-references, saves it, loads it into a fresh world and checks
//! the two documents match.
//!
//! Run with: `cargo run -p ormr --example scene_save_load`

use ormr::prelude::*;

const SAVE_PATH: &str = "/tmp/ormr_scene.json";

// ── Custom component ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Label {
    entity: Option<EntityId>,
    text: String,
    tint: Vec3,
}

impl_component!(Label, "Label");

fn register_label(registry: &mut Registry) {
    registry.descriptor(Label::default, |d| {
        d.string("text", "", |l| l.text.clone(), |l, v| l.text = v);
        d.vec3("tint", Vec3::ONE, |l| l.tint, |l, v| l.tint = v);
    });
}

fn main() -> Result<()> {
    env_logger::init();
    ormr::registry::register(register_label);

    let mut world = World::new();
    let scene = world.spawn("level");

    let cube = world.make_path(scene, "assets/cube")?;
    world.component::<Mesh>(cube)?.vertex_count = 24;

    let configs = [
        ("red", Vec3::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 0.3, 0.3)),
        ("green", Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.3, 1.0, 0.3)),
        ("blue", Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.3, 0.3, 1.0)),
    ];
    for (name, position, tint) in configs {
        let e = world.make_path(scene, &format!("boxes/{name}"))?;
        world.component::<TransformNode>(e)?.set_position(position);
        world.component::<Object3D>(e)?.mesh = Some(cube);
        let label = world.component::<Label>(e)?;
        label.text = name.to_uppercase();
        label.tint = tint;
    }

    // Editor-only helper; not saved.
    let gizmo = world.make_path(scene, "gizmo")?;
    world.set_serialized(gizmo, false)?;

    world.set_property(scene, "boxes/green:RigidBody.mass", FieldValue::Float(5.0))?;

    world.save(scene, SAVE_PATH)?;
    println!("saved to {SAVE_PATH}");

    let mut fresh = World::new();
    let loaded = fresh.load(SAVE_PATH)?;
    fresh.update_transforms(loaded)?;

    let before = world.write_entity(scene)?;
    let after = fresh.write_entity(loaded)?;
    println!("round trip {}", if before == after { "matches" } else { "DIFFERS" });

    println!("gizmo survived: {}", fresh.entity_by_path(loaded, "gizmo").is_some());
    println!("green mass: {:?}", fresh.property(loaded, "boxes/green:RigidBody.mass")?);

    let blue = fresh
        .entity_by_path(loaded, "boxes/blue")
        .ok_or(SceneError::NoSuchEntity)?;
    if let Some(label) = fresh.get_component::<Label>(blue) {
        println!("blue label: {} tint {:?}", label.text, label.tint);
    }
    let mesh = fresh.get_component::<Object3D>(blue).and_then(|o| o.mesh);
    println!(
        "blue instances mesh at `{}`",
        mesh.map(|m| fresh.path(m)).unwrap_or_default()
    );
    Ok(())
}
