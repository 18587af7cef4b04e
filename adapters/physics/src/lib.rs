#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Arena-containment physics backend.
//!
//! Simulates dynamic circles falling under gravity inside static axis-aligned
//! rectangles. Contacts are resolved with positional correction and a
//! restitution impulse; bodies keep the rotation they were created with.
//! This is deliberately the minimum needed to keep blobs piling up inside the
//! arena walls, not a general rigid-body engine.

use std::{collections::BTreeMap, time::Duration};

use blobsync_core::{BodyHandle, BodyPose, CircleBody, PhysicsBackend, RectangleBody};
use glam::Vec2;

const CONTACT_EPSILON: f32 = 1e-6;
const MIN_CELL_SIZE: f32 = 1.0;

/// Half of the eight-cell neighbourhood, so each adjacent pair of cells is visited once.
const FORWARD_NEIGHBOURS: [(i32, i32); 4] = [(1, -1), (1, 0), (1, 1), (0, 1)];

/// Tuning knobs for the arena simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsTuning {
    /// Constant acceleration applied to dynamic bodies, in pixels per second squared.
    pub gravity: Vec2,
    /// Length of one integration step.
    pub fixed_step: Duration,
    /// Maximum integration steps per `step` call; surplus time is dropped.
    pub max_substeps: u32,
    /// Number of contact resolution passes per integration step.
    pub solver_iterations: u32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 4_000.0),
            fixed_step: Duration::from_micros(16_667),
            max_substeps: 5,
            solver_iterations: 4,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum BodyShape {
    Circle { radius: f32 },
    StaticRectangle { half_extents: Vec2 },
}

#[derive(Clone, Copy, Debug)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    restitution: f32,
    shape: BodyShape,
}

/// Physics backend holding every body of the arena.
#[derive(Debug)]
pub struct ArenaPhysics {
    tuning: PhysicsTuning,
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u32,
    accumulator: Duration,
    pair_checks: u64,
}

impl Default for ArenaPhysics {
    fn default() -> Self {
        Self::new(PhysicsTuning::default())
    }
}

impl ArenaPhysics {
    /// Creates an empty simulation with the provided tuning.
    #[must_use]
    pub fn new(tuning: PhysicsTuning) -> Self {
        Self {
            tuning,
            bodies: BTreeMap::new(),
            next_handle: 0,
            accumulator: Duration::ZERO,
            pair_checks: 0,
        }
    }

    /// Tuning currently applied to the simulation.
    #[must_use]
    pub fn tuning(&self) -> &PhysicsTuning {
        &self.tuning
    }

    /// Circle pairs tested for contact during the most recent `step` call.
    #[doc(hidden)]
    #[must_use]
    pub fn pair_checks(&self) -> u64 {
        self.pair_checks
    }

    fn insert(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let _ = self.bodies.insert(handle, body);
        handle
    }

    fn integrate(&mut self, h: f32) {
        let gravity = self.tuning.gravity;
        for body in self.bodies.values_mut() {
            if let BodyShape::Circle { .. } = body.shape {
                body.velocity += gravity * h;
                body.position += body.velocity * h;
            }
        }
    }

    fn resolve_contacts(&mut self) {
        let mut circles: Vec<(BodyHandle, f32)> = Vec::new();
        let mut statics: Vec<Body> = Vec::new();
        for (handle, body) in &self.bodies {
            match body.shape {
                BodyShape::Circle { radius } => circles.push((*handle, radius)),
                BodyShape::StaticRectangle { .. } => statics.push(*body),
            }
        }
        let max_radius = circles.iter().map(|(_, radius)| *radius).fold(0.0, f32::max);
        let cell_size = (2.0 * max_radius).max(MIN_CELL_SIZE);

        for _ in 0..self.tuning.solver_iterations {
            let grid = self.broadphase(&circles, cell_size);
            for (&(column, row), members) in &grid {
                for (index, first) in members.iter().enumerate() {
                    for second in &members[index + 1..] {
                        self.resolve_circle_pair(*first, *second);
                    }
                    for offset in FORWARD_NEIGHBOURS {
                        let Some(neighbours) = grid.get(&(column + offset.0, row + offset.1))
                        else {
                            continue;
                        };
                        for second in neighbours {
                            self.resolve_circle_pair(*first, *second);
                        }
                    }
                }
            }
            for (handle, _) in &circles {
                if let Some(body) = self.bodies.get_mut(handle) {
                    for wall in &statics {
                        resolve_circle_against_rectangle(body, wall);
                    }
                }
            }
        }
    }

    /// Buckets circles into square cells no smaller than the largest diameter,
    /// so touching circles always share a cell or sit in adjacent ones.
    fn broadphase(
        &self,
        circles: &[(BodyHandle, f32)],
        cell_size: f32,
    ) -> BTreeMap<(i32, i32), Vec<BodyHandle>> {
        let mut grid: BTreeMap<(i32, i32), Vec<BodyHandle>> = BTreeMap::new();
        for (handle, _) in circles {
            if let Some(body) = self.bodies.get(handle) {
                let key = (
                    (body.position.x / cell_size).floor() as i32,
                    (body.position.y / cell_size).floor() as i32,
                );
                grid.entry(key).or_default().push(*handle);
            }
        }
        grid
    }

    fn resolve_circle_pair(&mut self, first: BodyHandle, second: BodyHandle) {
        let (Some(mut a), Some(mut b)) = (
            self.bodies.get(&first).copied(),
            self.bodies.get(&second).copied(),
        ) else {
            return;
        };
        let (BodyShape::Circle { radius: ra }, BodyShape::Circle { radius: rb }) =
            (a.shape, b.shape)
        else {
            return;
        };

        self.pair_checks = self.pair_checks.saturating_add(1);
        let delta = b.position - a.position;
        let distance = delta.length();
        let overlap = ra + rb - distance;
        if overlap <= 0.0 {
            return;
        }

        let normal = if distance > CONTACT_EPSILON {
            delta / distance
        } else {
            Vec2::X
        };
        a.position -= normal * (overlap / 2.0);
        b.position += normal * (overlap / 2.0);

        let approach = (b.velocity - a.velocity).dot(normal);
        if approach < 0.0 {
            let restitution = a.restitution.max(b.restitution);
            let impulse = -(1.0 + restitution) * approach / 2.0;
            a.velocity -= normal * impulse;
            b.velocity += normal * impulse;
        }

        let _ = self.bodies.insert(first, a);
        let _ = self.bodies.insert(second, b);
    }
}

fn resolve_circle_against_rectangle(circle: &mut Body, wall: &Body) {
    let (BodyShape::Circle { radius }, BodyShape::StaticRectangle { half_extents }) =
        (circle.shape, wall.shape)
    else {
        return;
    };

    let closest = circle
        .position
        .clamp(wall.position - half_extents, wall.position + half_extents);
    let delta = circle.position - closest;
    let distance_sq = delta.length_squared();
    if distance_sq >= radius * radius {
        return;
    }

    let (normal, penetration) = if distance_sq > CONTACT_EPSILON {
        let distance = distance_sq.sqrt();
        (delta / distance, radius - distance)
    } else {
        // Centre inside the rectangle: push out along the shallowest axis.
        let local = circle.position - wall.position;
        let overlap_x = half_extents.x - local.x.abs();
        let overlap_y = half_extents.y - local.y.abs();
        if overlap_x < overlap_y {
            (Vec2::new(local.x.signum(), 0.0), overlap_x + radius)
        } else {
            (Vec2::new(0.0, local.y.signum()), overlap_y + radius)
        }
    };

    circle.position += normal * penetration;
    let approach = circle.velocity.dot(normal);
    if approach < 0.0 {
        let restitution = circle.restitution.max(wall.restitution);
        circle.velocity -= normal * ((1.0 + restitution) * approach);
    }
}

impl PhysicsBackend for ArenaPhysics {
    fn insert_circle(&mut self, body: CircleBody) -> BodyHandle {
        self.insert(Body {
            position: Vec2::new(body.x, body.y),
            velocity: Vec2::ZERO,
            angle: body.angle,
            restitution: body.restitution,
            shape: BodyShape::Circle {
                radius: body.radius.max(0.0),
            },
        })
    }

    fn insert_static_rectangle(&mut self, body: RectangleBody) -> BodyHandle {
        self.insert(Body {
            position: Vec2::new(body.x, body.y),
            velocity: Vec2::ZERO,
            angle: 0.0,
            restitution: 0.0,
            shape: BodyShape::StaticRectangle {
                half_extents: Vec2::new(body.width.abs(), body.height.abs()) / 2.0,
            },
        })
    }

    fn remove(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(&handle).is_some()
    }

    fn pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        self.bodies.get(&handle).map(|body| BodyPose {
            x: body.position.x,
            y: body.position.y,
            angle: body.angle,
        })
    }

    fn step(&mut self, dt: Duration) {
        let step = self.tuning.fixed_step;
        if step.is_zero() {
            return;
        }

        self.pair_checks = 0;
        self.accumulator = self.accumulator.saturating_add(dt);
        let h = step.as_secs_f32();
        let mut substeps = 0;
        while self.accumulator >= step {
            if substeps == self.tuning.max_substeps {
                self.accumulator = Duration::ZERO;
                break;
            }
            self.integrate(h);
            self.resolve_contacts();
            self.accumulator -= step;
            substeps += 1;
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: f32, y: f32, radius: f32) -> CircleBody {
        CircleBody {
            x,
            y,
            radius,
            angle: 0.3,
            restitution: 0.5,
        }
    }

    #[test]
    fn gravity_pulls_dynamic_bodies_down() {
        let mut physics = ArenaPhysics::default();
        let ball = physics.insert_circle(circle(100.0, 100.0, 10.0));
        physics.step(Duration::from_millis(100));
        let pose = physics.pose(ball).expect("ball registered");
        assert!(pose.y > 100.0);
        assert_eq!(pose.x, 100.0);
        assert_eq!(pose.angle, 0.3);
    }

    #[test]
    fn static_floor_contains_falling_circle() {
        let mut physics = ArenaPhysics::default();
        let _floor = physics.insert_static_rectangle(RectangleBody {
            x: 200.0,
            y: 400.0,
            width: 400.0,
            height: 20.0,
        });
        let ball = physics.insert_circle(circle(200.0, 300.0, 10.0));
        for _ in 0..240 {
            physics.step(Duration::from_millis(16));
        }
        let pose = physics.pose(ball).expect("ball registered");
        assert!(pose.y <= 390.0 - 10.0 + 1.0, "ball sank into the floor: {}", pose.y);
        assert!(pose.y > 300.0);
    }

    #[test]
    fn static_rectangles_do_not_move() {
        let mut physics = ArenaPhysics::default();
        let wall = physics.insert_static_rectangle(RectangleBody {
            x: 5.0,
            y: 6.0,
            width: 10.0,
            height: 10.0,
        });
        physics.step(Duration::from_secs(1));
        assert_eq!(
            physics.pose(wall),
            Some(BodyPose {
                x: 5.0,
                y: 6.0,
                angle: 0.0
            })
        );
    }

    #[test]
    fn overlapping_circles_are_pushed_apart() {
        let mut physics = ArenaPhysics::new(PhysicsTuning {
            gravity: Vec2::ZERO,
            ..PhysicsTuning::default()
        });
        let left = physics.insert_circle(circle(100.0, 100.0, 10.0));
        let right = physics.insert_circle(circle(105.0, 100.0, 10.0));
        physics.step(Duration::from_millis(17));
        let a = physics.pose(left).expect("left registered");
        let b = physics.pose(right).expect("right registered");
        assert!(b.x - a.x >= 20.0 - 1e-3);
    }

    #[test]
    fn circles_straddling_a_cell_border_are_separated() {
        let mut physics = ArenaPhysics::new(PhysicsTuning {
            gravity: Vec2::ZERO,
            ..PhysicsTuning::default()
        });
        // Cells are 20 px wide here, so x = 18 and x = 24 land in neighbouring columns.
        let left = physics.insert_circle(circle(18.0, 39.0, 10.0));
        let right = physics.insert_circle(circle(24.0, 41.0, 10.0));
        physics.step(Duration::from_millis(17));
        let a = physics.pose(left).expect("left registered");
        let b = physics.pose(right).expect("right registered");
        let distance = Vec2::new(b.x - a.x, b.y - a.y).length();
        assert!(distance >= 20.0 - 1e-3, "still overlapping at {distance}");
    }

    #[test]
    fn pair_checks_stay_local_in_a_large_crowd() {
        let mut physics = ArenaPhysics::new(PhysicsTuning {
            gravity: Vec2::ZERO,
            ..PhysicsTuning::default()
        });
        // 12 px spacing against 10 px cells: at most one circle per cell, none touching.
        let side = 32_u32;
        for row in 0..side {
            for column in 0..side {
                let _ = physics.insert_circle(circle(
                    column as f32 * 12.0,
                    row as f32 * 12.0,
                    5.0,
                ));
            }
        }
        let count = u64::from(side * side);
        let iterations = u64::from(PhysicsTuning::default().solver_iterations);

        physics.step(PhysicsTuning::default().fixed_step);

        let checks = physics.pair_checks();
        assert!(checks > 0, "neighbouring cells were never visited");
        assert!(checks <= count * 4 * iterations, "{checks} pair checks");
        assert!(checks < count * (count - 1) / 2 * iterations / 100);
    }

    #[test]
    fn removed_bodies_are_gone() {
        let mut physics = ArenaPhysics::default();
        let ball = physics.insert_circle(circle(0.0, 0.0, 1.0));
        assert_eq!(physics.body_count(), 1);
        assert!(physics.remove(ball));
        assert!(!physics.remove(ball));
        assert_eq!(physics.pose(ball), None);
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn surplus_time_beyond_the_substep_cap_is_dropped() {
        let mut physics = ArenaPhysics::default();
        let ball = physics.insert_circle(circle(0.0, 0.0, 1.0));
        physics.step(Duration::from_secs(10));
        let capped = physics.pose(ball).expect("ball registered").y;
        let h = PhysicsTuning::default().fixed_step.as_secs_f32();
        // Five semi-implicit Euler steps: g * h^2 * (1 + 2 + 3 + 4 + 5).
        let expected = 4_000.0 * h * h * 15.0;
        assert!((capped - expected).abs() < 1e-2, "{capped} vs {expected}");
    }
}
