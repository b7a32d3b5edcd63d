use glam::DVec2;

use super::SolverBase2;
use crate::collider::Collider2;
use crate::emitter::ParticleEmitter2;
use crate::error::Result;
use crate::field::VectorField2;
use crate::particle_data::ParticleSystemData2;
use crate::physics_animation::{PhysicsAnimation, PhysicsAnimationState};

/// Basic particle system solver: gravity, wind drag, semi-implicit Euler,
/// and collision resolution against an optional collider.
///
/// One sub-timestep per frame by default; SPH specializations switch to
/// adaptive stepping.
pub struct ParticleSystemSolver2 {
    state: PhysicsAnimationState,
    base: SolverBase2,
    particles: ParticleSystemData2,
}

impl ParticleSystemSolver2 {
    pub fn new() -> Self {
        Self::with_radius_and_mass(1e-3, 1e-3)
    }

    pub fn with_radius_and_mass(radius: f64, mass: f64) -> Self {
        let mut particles = ParticleSystemData2::new();
        particles.set_radius(radius);
        particles.set_mass(mass);
        Self {
            state: PhysicsAnimationState::default(),
            base: SolverBase2::new(),
            particles,
        }
    }

    pub fn particle_system_data(&self) -> &ParticleSystemData2 {
        &self.particles
    }

    pub fn particle_system_data_mut(&mut self) -> &mut ParticleSystemData2 {
        &mut self.particles
    }

    pub fn gravity(&self) -> DVec2 {
        self.base.gravity
    }

    pub fn set_gravity(&mut self, gravity: DVec2) {
        self.base.gravity = gravity;
    }

    pub fn drag_coefficient(&self) -> f64 {
        self.base.drag_coefficient
    }

    pub fn set_drag_coefficient(&mut self, drag_coefficient: f64) {
        self.base.drag_coefficient = drag_coefficient.max(0.0);
    }

    pub fn restitution_coefficient(&self) -> f64 {
        self.base.restitution_coefficient
    }

    pub fn set_restitution_coefficient(&mut self, restitution: f64) {
        self.base.restitution_coefficient = restitution.clamp(0.0, 1.0);
    }

    pub fn set_collider(&mut self, collider: Box<dyn Collider2>) {
        self.base.collider = Some(collider);
    }

    pub fn set_emitter(&mut self, emitter: Box<dyn ParticleEmitter2>) {
        self.base.emitter = Some(emitter);
    }

    pub fn set_wind(&mut self, wind: Box<dyn VectorField2>) {
        self.base.wind = wind;
    }
}

impl Default for ParticleSystemSolver2 {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsAnimation for ParticleSystemSolver2 {
    fn physics_state(&self) -> &PhysicsAnimationState {
        &self.state
    }

    fn physics_state_mut(&mut self) -> &mut PhysicsAnimationState {
        &mut self.state
    }

    fn on_initialize(&mut self) -> Result<()> {
        // The collider and emitter shape the initial condition as well.
        let current_time = self.state.current_time_in_seconds();
        self.base.update_collider(current_time, 0.0);
        self.base.update_emitter(&mut self.particles, current_time, 0.0)
    }

    fn on_advance_sub_time_step(&mut self, time_interval: f64) -> Result<()> {
        let current_time = self.state.current_time_in_seconds();

        self.base
            .begin_advance(&mut self.particles, current_time, time_interval)?;
        self.base.accumulate_external_forces(&mut self.particles);
        self.base.time_integration(&self.particles, time_interval);
        self.base.resolve_collision(self.particles.radius());
        self.base.end_advance(&mut self.particles);

        Ok(())
    }
}
