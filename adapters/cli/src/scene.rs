use blobsync_core::{Hsba, RenderPass};
use blobsync_rendering::{Color, OutlinePresentation, Scene, ShapeStyle, WallPresentation};
use blobsync_world::{query, KinematicGrowingBlob, World};
use glam::Vec2;

/// Stroke width of kinematic outlines.
pub(crate) const OUTLINE_STROKE_WEIGHT: f32 = 4.0;

/// Rebuilds `scene` from the current world state.
///
/// Walls come first, then physics-backed blobs pass by pass, then the
/// outline batch and finally the growing batch.
pub(crate) fn populate_scene(world: &World, scene: &mut Scene) {
    scene.clear();

    if let Some(walls) = query::walls(world) {
        let color = Color::from(Hsba::WHITE);
        for wall in walls.walls() {
            let (width, height) = wall.visible_size();
            if width <= 0.0 || height <= 0.0 {
                continue;
            }
            let (x, y) = wall.center();
            scene.walls.push(WallPresentation {
                center: Vec2::new(x, y),
                size: Vec2::new(width, height),
                color,
            });
        }
    }

    for blob in query::physics_blobs(world) {
        let path = blob.path();
        for pass in blob.render_passes() {
            scene.outlines.push(OutlinePresentation {
                path: path.clone(),
                transform: blob.pass_transform(pass.scale),
                style: pass_style(&pass),
            });
        }
    }

    let kinematic = query::outline_blobs(world)
        .iter()
        .chain(query::growing_blobs(world));
    scene.outlines.extend(kinematic.map(kinematic_outline));
}

fn pass_style(pass: &RenderPass) -> ShapeStyle {
    ShapeStyle {
        fill: pass.fill.map(Color::from),
        stroke: pass.stroke.map(Color::from),
        stroke_weight: pass.stroke_weight,
    }
}

fn kinematic_outline(blob: &KinematicGrowingBlob) -> OutlinePresentation {
    OutlinePresentation {
        path: blob.path(),
        transform: blob.transform(),
        style: ShapeStyle {
            fill: Some(Color::from(blob.fill())),
            stroke: Some(Color::from(blob.stroke())),
            stroke_weight: OUTLINE_STROKE_WEIGHT,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobsync_core::{Canvas, Command, KinematicBlobSpec, PhysicsBlobSpec};
    use blobsync_physics::ArenaPhysics;
    use blobsync_world::apply;

    fn world() -> World {
        let mut world = World::new(Box::new(ArenaPhysics::default()));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureCanvas {
                canvas: Canvas::new(800.0, 600.0),
            },
            &mut events,
        );
        world
    }

    fn physics_spec(layered: bool) -> PhysicsBlobSpec {
        PhysicsBlobSpec {
            x: 400.0,
            y: 100.0,
            radius: 20.0,
            angle: 0.0,
            color: Hsba::new(200.0, 90.0, 70.0, 0.8),
            filled: true,
            layered,
            growth: 7,
            edges: 6,
            seed: 12.0,
        }
    }

    fn kinematic_spec() -> KinematicBlobSpec {
        KinematicBlobSpec {
            x: 200.0,
            y: 200.0,
            size: 100.0,
            growth_speed: 0.0,
            growth: 6,
            edges: 8,
            seed: 3.0,
            fill: Hsba::new(10.0, 100.0, 100.0, 0.33),
            stroke: Hsba::WHITE,
        }
    }

    #[test]
    fn hidden_walls_are_not_drawn() {
        let mut world = world();
        let mut events = Vec::new();
        apply(&mut world, Command::BuildWalls, &mut events);

        let mut scene = Scene::default();
        populate_scene(&world, &mut scene);
        assert!(scene.walls.is_empty(), "walls start unrevealed");

        apply(
            &mut world,
            Command::Tick {
                dt: std::time::Duration::from_millis(16),
            },
            &mut events,
        );
        populate_scene(&world, &mut scene);
        assert_eq!(scene.walls.len(), 4);
        assert!(scene
            .walls
            .iter()
            .all(|wall| wall.color == Color::new(1.0, 1.0, 1.0, 1.0)));
    }

    #[test]
    fn layered_blobs_contribute_three_outlines_before_kinematic_ones() {
        let mut world = world();
        let mut events = Vec::new();
        for command in [
            Command::AddOutlineBlob {
                spec: kinematic_spec(),
            },
            Command::SpawnPhysicsBlob {
                spec: physics_spec(true),
            },
            Command::SpawnPhysicsBlob {
                spec: physics_spec(false),
            },
        ] {
            apply(&mut world, command, &mut events);
        }

        let mut scene = Scene::default();
        populate_scene(&world, &mut scene);

        assert_eq!(scene.outlines.len(), 5);
        assert_eq!(scene.outlines[0].style.stroke_weight, 4.0);
        let last = scene.outlines.last().expect("kinematic outline");
        assert_eq!(last.style.stroke, Some(Color::new(1.0, 1.0, 1.0, 1.0)));
        assert!((last.style.fill.expect("fill").alpha - 0.33).abs() < 1e-6);
    }

    #[test]
    fn repopulating_replaces_the_previous_frame() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AddGrowingBlob {
                spec: kinematic_spec(),
            },
            &mut events,
        );

        let mut scene = Scene::default();
        populate_scene(&world, &mut scene);
        populate_scene(&world, &mut scene);
        assert_eq!(scene.outlines.len(), 1);

        apply(&mut world, Command::ClearGrowingBlobs, &mut events);
        populate_scene(&world, &mut scene);
        assert!(scene.outlines.is_empty());
    }
}
