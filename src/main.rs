// Transform demo: a spinning world with a cube and a sphere nested under it

use anyhow::{Context, Result};
use glam::Vec3;
use scene_transform::{AxisAngle, ModelUniform, Scene, Transform};

const FRAMES: u32 = 8;
const SPIN_PER_FRAME: f32 = 15.0;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let mut scene = Scene::new();
    let world = scene.add_node("world", Transform::IDENTITY);
    let cube = scene.add_node(
        "cube",
        Transform::new(Vec3::ONE, AxisAngle::IDENTITY, Vec3::splat(2.0)),
    );
    scene.set_parent(cube, Some(world), 0)?;
    let sphere = scene.add_node(
        "sphere",
        Transform::new(Vec3::ONE, AxisAngle::IDENTITY, Vec3::ONE),
    );
    scene.set_parent(sphere, Some(cube), 0)?;

    let mut spin = 0.0;
    for frame in 0..FRAMES {
        scene
            .node_mut(world)
            .context("world node missing")?
            .set_local_rotation(AxisAngle::new(Vec3::Y, spin));

        for id in [cube, sphere] {
            let name = &scene.node(id).context("scene node missing")?.name;
            let position = scene.world_position(id)?;
            let rotation = scene.world_rotation(id)?;
            let scale = scene.world_scale(id)?;
            let uniform = ModelUniform::from_node(&scene, id)
                .with_context(|| format!("packing uniform for {name}"))?;
            log::info!(
                "frame {frame} {name}: position {position:?} rotation {:?} {:.1}deg \
                 scale {scale:?} ({} uniform bytes)",
                rotation.axis,
                rotation.angle,
                bytemuck::bytes_of(&uniform).len()
            );
        }

        spin += SPIN_PER_FRAME;
    }

    Ok(())
}
