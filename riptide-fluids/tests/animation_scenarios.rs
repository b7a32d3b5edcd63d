//! Kinematic animation and mass-spring scenarios driven through the
//! animation traits, the way external solvers consume them.

use glam::DVec3;
use riptide_fluids::{
    Animation, ConstantVectorField3, Frame, PhysicsAnimation, PhysicsAnimationState,
    VectorField3,
};

struct SineAnimation {
    x: f64,
}

impl Animation for SineAnimation {
    fn on_update(&mut self, frame: Frame) {
        self.x = (10.0 * frame.time_in_seconds()).sin();
    }
}

#[test]
fn sine_animation_tracks_frame_time() {
    let mut animation = SineAnimation { x: 0.0 };
    let mut recorded = Vec::new();

    let mut frame = Frame::new(0, 1.0 / 60.0);
    while frame.index < 240 {
        animation.update(frame);
        recorded.push(animation.x);
        frame.advance();
    }

    assert_eq!(recorded.len(), 240);
    let expected = (10.0_f64 * 239.0 / 60.0).sin();
    assert!((recorded[239] - expected).abs() < 1e-12);
}

/// A chain of point masses connected by damped springs, with a floor, wind,
/// and pin constraints. Explicit state, no particle-system storage: only the
/// physics-animation driver is exercised.
struct MassSpringAnimation {
    state: PhysicsAnimationState,
    positions: Vec<DVec3>,
    velocities: Vec<DVec3>,
    forces: Vec<DVec3>,
    edges: Vec<(usize, usize)>,
    mass: f64,
    gravity: DVec3,
    stiffness: f64,
    rest_length: f64,
    damping_coefficient: f64,
    drag_coefficient: f64,
    floor_position_y: Option<f64>,
    restitution_coefficient: f64,
    wind: Option<ConstantVectorField3>,
    /// (node, position, velocity) triples enforced after integration.
    constraints: Vec<(usize, DVec3, DVec3)>,
}

impl MassSpringAnimation {
    fn chain(number_of_points: usize) -> Self {
        let positions: Vec<DVec3> = (0..number_of_points)
            .map(|i| DVec3::new(-(i as f64), 0.0, 0.0))
            .collect();
        let edges = (0..number_of_points.saturating_sub(1))
            .map(|i| (i, i + 1))
            .collect();
        Self {
            state: PhysicsAnimationState::default(),
            velocities: vec![DVec3::ZERO; number_of_points],
            forces: vec![DVec3::ZERO; number_of_points],
            positions,
            edges,
            mass: 1.0,
            gravity: DVec3::new(0.0, -9.8, 0.0),
            stiffness: 500.0,
            rest_length: 1.0,
            damping_coefficient: 1.0,
            drag_coefficient: 0.1,
            floor_position_y: Some(-7.0),
            restitution_coefficient: 0.3,
            wind: None,
            constraints: Vec::new(),
        }
    }

    fn total_chain_length(&self) -> f64 {
        self.edges
            .iter()
            .map(|&(a, b)| self.positions[a].distance(self.positions[b]))
            .sum()
    }

    fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass
            * self
                .velocities
                .iter()
                .map(|v| v.length_squared())
                .sum::<f64>()
    }

    fn spring_energy(&self) -> f64 {
        0.5 * self.stiffness
            * self
                .edges
                .iter()
                .map(|&(a, b)| {
                    let stretch = self.positions[a].distance(self.positions[b]) - self.rest_length;
                    stretch * stretch
                })
                .sum::<f64>()
    }
}

impl PhysicsAnimation for MassSpringAnimation {
    fn physics_state(&self) -> &PhysicsAnimationState {
        &self.state
    }

    fn physics_state_mut(&mut self) -> &mut PhysicsAnimationState {
        &mut self.state
    }

    fn on_advance_sub_time_step(&mut self, dt: f64) -> riptide_fluids::Result<()> {
        // Gravity and air drag.
        for i in 0..self.positions.len() {
            self.forces[i] = self.mass * self.gravity;
            let mut relative_velocity = self.velocities[i];
            if let Some(wind) = &self.wind {
                relative_velocity -= wind.sample(self.positions[i]);
            }
            self.forces[i] += -self.drag_coefficient * relative_velocity;
        }

        // Spring and damping forces along each edge.
        for &(a, b) in &self.edges {
            let r = self.positions[a] - self.positions[b];
            let distance = r.length();
            if distance > 0.0 {
                let force =
                    -self.stiffness * (distance - self.rest_length) * (r / distance);
                self.forces[a] += force;
                self.forces[b] -= force;
            }

            let damping =
                -self.damping_coefficient * (self.velocities[a] - self.velocities[b]);
            self.forces[a] += damping;
            self.forces[b] -= damping;
        }

        // Integrate, then respond to the floor.
        for i in 0..self.positions.len() {
            let mut new_velocity = self.velocities[i] + dt * self.forces[i] / self.mass;
            let mut new_position = self.positions[i] + dt * new_velocity;

            if let Some(floor_y) = self.floor_position_y {
                if new_position.y < floor_y {
                    new_position.y = floor_y;
                    if new_velocity.y < 0.0 {
                        new_velocity.y *= -self.restitution_coefficient;
                        new_position.y += dt * new_velocity.y;
                    }
                }
            }

            self.velocities[i] = new_velocity;
            self.positions[i] = new_position;
        }

        for &(node, position, velocity) in &self.constraints {
            self.positions[node] = position;
            self.velocities[node] = velocity;
        }

        Ok(())
    }
}

#[test]
fn mass_spring_chain_with_wind_and_floor() {
    let mut animation = MassSpringAnimation::chain(10);
    animation.wind = Some(ConstantVectorField3::new(DVec3::new(30.0, 0.0, 0.0)));
    animation
        .constraints
        .push((0, DVec3::ZERO, DVec3::ZERO));

    for index in 1..=360u32 {
        animation.update(Frame::new(index, 1.0 / 60.0)).unwrap();

        // The pinned node never moves.
        assert_eq!(animation.positions[0], DVec3::ZERO);

        // Nothing sinks below the floor.
        for p in &animation.positions {
            assert!(p.y >= -7.0 - 1e-9, "node below floor at frame {index}");
        }

        // Once transients settle, the chain stays near its rest length.
        if index >= 60 {
            let length = animation.total_chain_length();
            assert!(
                (4.5..=15.0).contains(&length),
                "chain length {length} out of band at frame {index}"
            );
        }
    }
}

#[test]
fn damped_chain_dissipates_energy() {
    let mut animation = MassSpringAnimation::chain(8);
    // Stretch the chain 50% past rest and let it relax with no driving.
    for (i, p) in animation.positions.iter_mut().enumerate() {
        p.x = -1.5 * i as f64;
    }
    animation.gravity = DVec3::ZERO;
    animation.drag_coefficient = 0.0;
    animation.damping_coefficient = 5.0;
    animation.floor_position_y = None;
    animation
        .state
        .set_number_of_fixed_sub_time_steps(20);

    let mut previous_energy = animation.kinetic_energy() + animation.spring_energy();
    assert!(previous_energy > 0.0);

    for index in 1..=240u32 {
        animation.update(Frame::new(index, 1.0 / 60.0)).unwrap();

        let energy = animation.kinetic_energy() + animation.spring_energy();
        assert!(
            energy <= previous_energy * (1.0 + 1e-6) + 1e-12,
            "energy rose from {previous_energy} to {energy} at frame {index}"
        );
        previous_energy = energy;
    }

    // The damped chain ends essentially at rest.
    assert!(previous_energy < 1e-3);
}
