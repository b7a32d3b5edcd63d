use glam::DVec2;
use rayon::prelude::*;
use std::time::Instant;

use super::SolverBase2;
use crate::collider::Collider2;
use crate::emitter::ParticleEmitter2;
use crate::error::Result;
use crate::field::VectorField2;
use crate::physics_animation::{PhysicsAnimation, PhysicsAnimationState};
use crate::sph_data::SphSystemData2;
use crate::sph_kernels::SphSpikyKernel2;

const TIME_STEP_LIMIT_BY_SPEED_FACTOR: f64 = 0.4;
const TIME_STEP_LIMIT_BY_FORCE_FACTOR: f64 = 0.25;

const DEFAULT_EOS_EXPONENT: f64 = 7.0;
const DEFAULT_VISCOSITY_COEFFICIENT: f64 = 0.01;
const DEFAULT_PSEUDO_VISCOSITY_COEFFICIENT: f64 = 10.0;
const DEFAULT_SPEED_OF_SOUND: f64 = 100.0;

/// Weakly-compressible SPH solver.
///
/// On top of the base pipeline it adds equation-of-state pressure, SPH
/// viscosity, a pseudo-viscosity smoothing pass at step end, and an adaptive
/// sub-timestep derived from the CFL condition and the peak force magnitude.
pub struct SphSolver2 {
    state: PhysicsAnimationState,
    base: SolverBase2,
    particles: SphSystemData2,
    eos_exponent: f64,
    negative_pressure_scale: f64,
    viscosity_coefficient: f64,
    pseudo_viscosity_coefficient: f64,
    speed_of_sound: f64,
    time_step_limit_scale: f64,
}

impl SphSolver2 {
    pub fn new() -> Self {
        let mut state = PhysicsAnimationState::default();
        state.set_is_using_fixed_sub_time_steps(false);
        Self {
            state,
            base: SolverBase2::new(),
            particles: SphSystemData2::new(),
            eos_exponent: DEFAULT_EOS_EXPONENT,
            negative_pressure_scale: 0.0,
            viscosity_coefficient: DEFAULT_VISCOSITY_COEFFICIENT,
            pseudo_viscosity_coefficient: DEFAULT_PSEUDO_VISCOSITY_COEFFICIENT,
            speed_of_sound: DEFAULT_SPEED_OF_SOUND,
            time_step_limit_scale: 1.0,
        }
    }

    pub fn with_params(
        target_density: f64,
        target_spacing: f64,
        relative_kernel_radius: f64,
    ) -> Self {
        let mut solver = Self::new();
        solver.particles.set_target_density(target_density);
        solver.particles.set_target_spacing(target_spacing);
        solver
            .particles
            .set_relative_kernel_radius(relative_kernel_radius);
        solver
    }

    pub fn sph_system_data(&self) -> &SphSystemData2 {
        &self.particles
    }

    pub fn sph_system_data_mut(&mut self) -> &mut SphSystemData2 {
        &mut self.particles
    }

    pub fn eos_exponent(&self) -> f64 {
        self.eos_exponent
    }

    /// Stiffness of the equation of state; larger values make the fluid less
    /// compressible and the time step smaller.
    pub fn set_eos_exponent(&mut self, eos_exponent: f64) {
        self.eos_exponent = eos_exponent.max(1.0);
    }

    pub fn negative_pressure_scale(&self) -> f64 {
        self.negative_pressure_scale
    }

    /// Fraction of negative pressure retained. Zero clamps tensile states
    /// away entirely; one keeps them.
    pub fn set_negative_pressure_scale(&mut self, scale: f64) {
        self.negative_pressure_scale = scale.clamp(0.0, 1.0);
    }

    pub fn viscosity_coefficient(&self) -> f64 {
        self.viscosity_coefficient
    }

    pub fn set_viscosity_coefficient(&mut self, coefficient: f64) {
        self.viscosity_coefficient = coefficient.max(0.0);
    }

    pub fn pseudo_viscosity_coefficient(&self) -> f64 {
        self.pseudo_viscosity_coefficient
    }

    /// Amount of end-of-step velocity smoothing; damps particle jitter
    /// without entering the force balance.
    pub fn set_pseudo_viscosity_coefficient(&mut self, coefficient: f64) {
        self.pseudo_viscosity_coefficient = coefficient.max(0.0);
    }

    pub fn speed_of_sound(&self) -> f64 {
        self.speed_of_sound
    }

    pub fn set_speed_of_sound(&mut self, speed_of_sound: f64) {
        self.speed_of_sound = speed_of_sound.max(f64::EPSILON);
    }

    pub fn time_step_limit_scale(&self) -> f64 {
        self.time_step_limit_scale
    }

    pub fn set_time_step_limit_scale(&mut self, scale: f64) {
        self.time_step_limit_scale = scale.max(0.0);
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

    fn accumulate_viscosity_force(&mut self) {
        let n = self.particles.number_of_particles();
        let mass_squared = self.particles.mass() * self.particles.mass();
        let kernel = SphSpikyKernel2::new(self.particles.kernel_radius());
        let viscosity = self.viscosity_coefficient;

        let contributions: Vec<DVec2> = {
            let positions = self.particles.base().positions();
            let velocities = self.particles.base().velocities();
            let densities = self.particles.densities();
            let neighbor_lists = self.particles.base().neighbor_lists();

            (0..n)
                .into_par_iter()
                .map(|i| {
                    let mut force = DVec2::ZERO;
                    for &j in &neighbor_lists[i] {
                        let distance = positions[i].distance(positions[j]);
                        force += viscosity * mass_squared
                            / densities[j]
                            * kernel.second_derivative(distance)
                            * (velocities[j] - velocities[i]);
                    }
                    force
                })
                .collect()
        };

        self.particles
            .base_mut()
            .forces_mut()
            .par_iter_mut()
            .zip(contributions.par_iter())
            .for_each(|(force, contribution)| *force += *contribution);
    }

    fn compute_pressure(&mut self) {
        let target_density = self.particles.target_density();
        let eos_scale =
            target_density * self.speed_of_sound * self.speed_of_sound / self.eos_exponent;
        let eos_exponent = self.eos_exponent;
        let negative_pressure_scale = self.negative_pressure_scale;

        let (density_id, pressure_id) = (
            self.particles.density_layer_id(),
            self.particles.pressure_layer_id(),
        );
        let (densities, pressures) = self
            .particles
            .base_mut()
            .scalar_layer_pair_mut(density_id, pressure_id);

        pressures
            .par_iter_mut()
            .zip(densities.par_iter())
            .for_each(|(pressure, &density)| {
                *pressure = compute_pressure_from_eos(
                    density,
                    target_density,
                    eos_scale,
                    eos_exponent,
                    negative_pressure_scale,
                );
            });
    }

    fn accumulate_pressure_force(&mut self) {
        let n = self.particles.number_of_particles();
        let mass_squared = self.particles.mass() * self.particles.mass();
        let kernel = SphSpikyKernel2::new(self.particles.kernel_radius());

        let contributions: Vec<DVec2> = {
            let positions = self.particles.base().positions();
            let densities = self.particles.densities();
            let pressures = self.particles.pressures();
            let neighbor_lists = self.particles.base().neighbor_lists();

            (0..n)
                .into_par_iter()
                .map(|i| {
                    let mut force = DVec2::ZERO;
                    for &j in &neighbor_lists[i] {
                        let distance = positions[i].distance(positions[j]);
                        if distance > 0.0 {
                            let direction = (positions[j] - positions[i]) / distance;
                            force -= mass_squared
                                * (pressures[i] / (densities[i] * densities[i])
                                    + pressures[j] / (densities[j] * densities[j]))
                                * kernel.gradient(distance, direction);
                        }
                    }
                    force
                })
                .collect()
        };

        self.particles
            .base_mut()
            .forces_mut()
            .par_iter_mut()
            .zip(contributions.par_iter())
            .for_each(|(force, contribution)| *force += *contribution);
    }

    /// Blend every particle's velocity toward the kernel-weighted average of
    /// its neighborhood by `clamp(dt * coefficient, 0, 1)`.
    fn compute_pseudo_viscosity(&mut self, time_interval: f64) {
        let n = self.particles.number_of_particles();
        let mass = self.particles.mass();
        let kernel = SphSpikyKernel2::new(self.particles.kernel_radius());

        let smoothed_velocities: Vec<DVec2> = {
            let positions = self.particles.base().positions();
            let velocities = self.particles.base().velocities();
            let densities = self.particles.densities();
            let neighbor_lists = self.particles.base().neighbor_lists();

            (0..n)
                .into_par_iter()
                .map(|i| {
                    let mut weight_sum = 0.0;
                    let mut smoothed_velocity = DVec2::ZERO;
                    for &j in &neighbor_lists[i] {
                        let distance = positions[i].distance(positions[j]);
                        let weight = mass / densities[j] * kernel.value(distance);
                        weight_sum += weight;
                        smoothed_velocity += weight * velocities[j];
                    }

                    let self_weight = mass / densities[i];
                    weight_sum += self_weight;
                    smoothed_velocity += self_weight * velocities[i];

                    if weight_sum > 0.0 {
                        smoothed_velocity /= weight_sum;
                    }
                    smoothed_velocity
                })
                .collect()
        };

        let factor = (time_interval * self.pseudo_viscosity_coefficient).clamp(0.0, 1.0);
        self.particles
            .base_mut()
            .velocities_mut()
            .par_iter_mut()
            .zip(smoothed_velocities.par_iter())
            .for_each(|(velocity, smoothed)| {
                *velocity = velocity.lerp(*smoothed, factor);
            });
    }
}

/// Stiffened-gas equation of state with negative-pressure attenuation.
fn compute_pressure_from_eos(
    density: f64,
    target_density: f64,
    eos_scale: f64,
    eos_exponent: f64,
    negative_pressure_scale: f64,
) -> f64 {
    let mut pressure = eos_scale * ((density / target_density).powf(eos_exponent) - 1.0);
    if pressure < 0.0 {
        pressure *= negative_pressure_scale;
    }
    pressure
}

impl Default for SphSolver2 {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsAnimation for SphSolver2 {
    fn physics_state(&self) -> &PhysicsAnimationState {
        &self.state
    }

    fn physics_state_mut(&mut self) -> &mut PhysicsAnimationState {
        &mut self.state
    }

    fn number_of_sub_time_steps(&self, time_interval: f64) -> usize {
        let kernel_radius = self.particles.kernel_radius();
        let mass = self.particles.mass();

        let max_force_magnitude = self
            .particles
            .base()
            .forces()
            .iter()
            .fold(0.0f64, |acc, f| acc.max(f.length()));

        let time_step_limit_by_speed =
            TIME_STEP_LIMIT_BY_SPEED_FACTOR * kernel_radius / self.speed_of_sound;
        let time_step_limit_by_force = TIME_STEP_LIMIT_BY_FORCE_FACTOR
            * (kernel_radius * mass / max_force_magnitude).sqrt();

        let desired_time_step = self.time_step_limit_scale
            * time_step_limit_by_speed.min(time_step_limit_by_force);

        (time_interval / desired_time_step).ceil() as usize
    }

    fn on_initialize(&mut self) -> Result<()> {
        let current_time = self.state.current_time_in_seconds();
        self.base.update_collider(current_time, 0.0);
        self.base
            .update_emitter(self.particles.base_mut(), current_time, 0.0)
    }

    fn on_advance_sub_time_step(&mut self, time_interval: f64) -> Result<()> {
        let current_time = self.state.current_time_in_seconds();

        // Begin: forces cleared, collider/emitter updated, buffers sized,
        // then neighbor state and densities refreshed for this step.
        self.base
            .begin_advance(self.particles.base_mut(), current_time, time_interval)?;
        {
            let timer = Instant::now();
            self.particles.build_neighbor_search();
            self.particles.build_neighbor_lists();
            self.particles.update_densities();
            tracing::debug!(
                elapsed = ?timer.elapsed(),
                "rebuilt neighbor state and densities"
            );
        }

        // Non-pressure forces, then pressure.
        self.base
            .accumulate_external_forces(self.particles.base_mut());
        self.accumulate_viscosity_force();
        self.compute_pressure();
        self.accumulate_pressure_force();

        self.base.time_integration(self.particles.base(), time_interval);
        self.base.resolve_collision(self.particles.base().radius());
        self.base.end_advance(self.particles.base_mut());

        // End: smooth the committed velocities.
        self.compute_pseudo_viscosity(time_interval);

        if tracing::enabled!(tracing::Level::DEBUG) {
            let max_density = self
                .particles
                .densities()
                .iter()
                .fold(0.0f64, |acc, &d| acc.max(d));
            tracing::debug!(
                max_density,
                ratio = max_density / self.particles.target_density(),
                "sph sub-timestep complete"
            );
        }

        Ok(())
    }
}
