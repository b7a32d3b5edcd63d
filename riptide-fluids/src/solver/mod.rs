//! Particle solvers.
//!
//! Every sub-timestep runs the same strict pipeline:
//! begin (clear forces, update collider/emitter, size scratch buffers) →
//! accumulate forces → integrate → resolve collisions → end (commit).
//! The inner loops are data-parallel over particles; each phase is a join
//! barrier, so a phase observes every write of the previous one.

pub mod particle_solver;
pub mod sph_solver;

pub use particle_solver::ParticleSystemSolver2;
pub use sph_solver::SphSolver2;

use glam::DVec2;
use rayon::prelude::*;

use crate::collider::Collider2;
use crate::emitter::ParticleEmitter2;
use crate::error::Result;
use crate::field::{ConstantVectorField2, VectorField2};
use crate::particle_data::ParticleSystemData2;

const DEFAULT_GRAVITY: f64 = -9.8;
const DEFAULT_DRAG_COEFFICIENT: f64 = 1e-4;

/// Ambient state and phase machinery shared by the particle and SPH solvers.
pub(crate) struct SolverBase2 {
    pub gravity: DVec2,
    pub drag_coefficient: f64,
    pub restitution_coefficient: f64,
    pub wind: Box<dyn VectorField2>,
    pub collider: Option<Box<dyn Collider2>>,
    pub emitter: Option<Box<dyn ParticleEmitter2>>,
    pub new_positions: Vec<DVec2>,
    pub new_velocities: Vec<DVec2>,
}

impl SolverBase2 {
    pub fn new() -> Self {
        Self {
            gravity: DVec2::new(0.0, DEFAULT_GRAVITY),
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            restitution_coefficient: 0.0,
            wind: Box::new(ConstantVectorField2::new(DVec2::ZERO)),
            collider: None,
            emitter: None,
            new_positions: Vec::new(),
            new_velocities: Vec::new(),
        }
    }

    pub fn update_collider(&mut self, current_time: f64, time_interval: f64) {
        if let Some(collider) = &mut self.collider {
            collider.update(current_time, time_interval);
        }
    }

    pub fn update_emitter(
        &mut self,
        particles: &mut ParticleSystemData2,
        current_time: f64,
        time_interval: f64,
    ) -> Result<()> {
        if let Some(emitter) = &mut self.emitter {
            emitter.update(particles, current_time, time_interval)?;
        }
        Ok(())
    }

    /// Begin phase: zero forces, run collider/emitter updates, size the
    /// scratch buffers to the (possibly grown) particle count.
    pub fn begin_advance(
        &mut self,
        particles: &mut ParticleSystemData2,
        current_time: f64,
        time_interval: f64,
    ) -> Result<()> {
        particles
            .forces_mut()
            .par_iter_mut()
            .for_each(|f| *f = DVec2::ZERO);

        self.update_collider(current_time, time_interval);
        self.update_emitter(particles, current_time, time_interval)?;

        let n = particles.number_of_particles();
        self.new_positions.resize(n, DVec2::ZERO);
        self.new_velocities.resize(n, DVec2::ZERO);

        Ok(())
    }

    /// Gravity plus wind drag.
    pub fn accumulate_external_forces(&self, particles: &mut ParticleSystemData2) {
        let mass = particles.mass();
        let gravity = self.gravity;
        let drag_coefficient = self.drag_coefficient;
        let wind = self.wind.as_ref();

        let (positions, velocities, forces) = particles.kinematics_and_forces_mut();
        forces.par_iter_mut().enumerate().for_each(|(i, force)| {
            let mut f = mass * gravity;
            let relative_velocity = velocities[i] - wind.sample(positions[i]);
            f += -drag_coefficient * relative_velocity;
            *force += f;
        });
    }

    /// Semi-implicit Euler into the scratch buffers.
    pub fn time_integration(&mut self, particles: &ParticleSystemData2, time_interval: f64) {
        let mass = particles.mass();
        let positions = particles.positions();
        let velocities = particles.velocities();
        let forces = particles.forces();

        self.new_velocities
            .par_iter_mut()
            .zip(self.new_positions.par_iter_mut())
            .enumerate()
            .for_each(|(i, (new_velocity, new_position))| {
                *new_velocity = velocities[i] + time_interval * forces[i] / mass;
                *new_position = positions[i] + time_interval * *new_velocity;
            });
    }

    /// Run the collider over every scratch position/velocity pair.
    pub fn resolve_collision(&mut self, radius: f64) {
        let Self {
            collider,
            restitution_coefficient,
            new_positions,
            new_velocities,
            ..
        } = self;

        if let Some(collider) = collider {
            let collider = collider.as_ref();
            let restitution = *restitution_coefficient;
            new_positions
                .par_iter_mut()
                .zip(new_velocities.par_iter_mut())
                .for_each(|(position, velocity)| {
                    collider.resolve_collision(radius, restitution, position, velocity);
                });
        }
    }

    /// Commit the scratch buffers into the particle data.
    pub fn end_advance(&mut self, particles: &mut ParticleSystemData2) {
        let (positions, velocities) = particles.positions_and_velocities_mut();
        positions
            .par_iter_mut()
            .zip(self.new_positions.par_iter())
            .for_each(|(p, np)| *p = *np);
        velocities
            .par_iter_mut()
            .zip(self.new_velocities.par_iter())
            .for_each(|(v, nv)| *v = *nv);
    }
}
