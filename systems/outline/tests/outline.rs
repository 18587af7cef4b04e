use blobsync_core::PathCommand;
use blobsync_outline::{generate, points, OutlineSpec};

#[test]
fn generated_outline_parses_into_one_curve_per_edge() {
    let spec = OutlineSpec {
        size: 120.0,
        growth: 5,
        edges: 16,
        seed: 17.5,
    };
    let commands = blobsync_path::parse(&generate(&spec));

    assert_eq!(commands.len(), 1 + 16 + 1);
    assert!(matches!(commands[0], PathCommand::Move { .. }));
    assert!(commands[1..17]
        .iter()
        .all(|command| matches!(command, PathCommand::QuadraticCurve { .. })));
    assert_eq!(
        commands[17],
        PathCommand::Unsupported {
            command: 'Z',
            params: Vec::new(),
        }
    );
}

#[test]
fn outline_closes_on_its_starting_point() {
    let spec = OutlineSpec {
        size: 80.0,
        growth: 3,
        edges: 7,
        seed: 9.0,
    };
    let commands = blobsync_path::parse(&generate(&spec));
    let PathCommand::Move { x: start_x, y: start_y } = commands[0] else {
        panic!("outline must start with a move");
    };
    let PathCommand::QuadraticCurve { x, y, .. } = commands[commands.len() - 2] else {
        panic!("outline must end with a curve before closing");
    };
    assert!((x - start_x).abs() < 1e-3 && (y - start_y).abs() < 1e-3);
}

#[test]
fn points_stay_between_inner_and_outer_radius() {
    let spec = OutlineSpec {
        size: 100.0,
        growth: 4,
        edges: 24,
        seed: 63.0,
    };
    for (x, y) in points(&spec) {
        let distance = ((x - 50.0).powi(2) + (y - 50.0).powi(2)).sqrt();
        assert!(distance >= 20.0 - 1e-3, "point too close to centre: {distance}");
        assert!(distance <= 50.0 + 1e-3, "point outside outer radius: {distance}");
    }
}

#[test]
fn growing_size_keeps_the_silhouette() {
    let small = OutlineSpec {
        size: 100.0,
        growth: 6,
        edges: 12,
        seed: 5.0,
    };
    let large = OutlineSpec {
        size: 200.0,
        ..small
    };
    for ((sx, sy), (lx, ly)) in points(&small).into_iter().zip(points(&large)) {
        assert!((lx - sx * 2.0).abs() < 1e-2 && (ly - sy * 2.0).abs() < 1e-2);
    }
}
