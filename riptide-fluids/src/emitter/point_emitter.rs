use glam::{DVec2, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

use super::{ParticleEmitter2, ParticleEmitter3};
use crate::error::Result;
use crate::particle_data::{ParticleSystemData2, ParticleSystemData3};

/// Emits particles from a fixed origin at a capped rate.
///
/// Each particle leaves at `speed` along the emitter direction rotated by a
/// uniform random angle within the spread. Emission is paced so that the
/// total emitted count tracks `rate * elapsed_time`, capped by the lifetime
/// maximum.
pub struct PointParticleEmitter2 {
    rng: StdRng,
    origin: DVec2,
    direction: DVec2,
    speed: f64,
    spread_angle_in_radians: f64,
    max_particle_rate: f64,
    max_number_of_particles: usize,
    number_of_emitted_particles: usize,
    first_frame_time_in_seconds: f64,
    is_enabled: bool,
}

impl PointParticleEmitter2 {
    pub fn new(
        origin: DVec2,
        direction: DVec2,
        speed: f64,
        spread_angle_in_degrees: f64,
    ) -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            origin,
            direction,
            speed,
            spread_angle_in_radians: spread_angle_in_degrees.to_radians(),
            max_particle_rate: 1.0,
            max_number_of_particles: usize::MAX,
            number_of_emitted_particles: 0,
            first_frame_time_in_seconds: 0.0,
            is_enabled: true,
        }
    }

    pub fn with_max_particle_rate(mut self, particles_per_second: f64) -> Self {
        self.set_max_particle_rate(particles_per_second);
        self
    }

    pub fn with_max_number_of_particles(mut self, max: usize) -> Self {
        self.max_number_of_particles = max;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn max_particle_rate(&self) -> f64 {
        self.max_particle_rate
    }

    pub fn set_max_particle_rate(&mut self, particles_per_second: f64) {
        self.max_particle_rate = particles_per_second.max(0.0);
    }

    pub fn max_number_of_particles(&self) -> usize {
        self.max_number_of_particles
    }

    pub fn set_max_number_of_particles(&mut self, max: usize) {
        self.max_number_of_particles = max;
    }

    pub fn number_of_emitted_particles(&self) -> usize {
        self.number_of_emitted_particles
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    fn emit(&mut self, count: usize) -> (Vec<DVec2>, Vec<DVec2>) {
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);

        for _ in 0..count {
            let angle = (self.rng.random::<f64>() - 0.5) * self.spread_angle_in_radians;
            let direction = DVec2::from_angle(angle).rotate(self.direction);
            positions.push(self.origin);
            velocities.push(self.speed * direction);
        }

        (positions, velocities)
    }
}

impl ParticleEmitter2 for PointParticleEmitter2 {
    fn update(
        &mut self,
        particles: &mut ParticleSystemData2,
        current_time_in_seconds: f64,
        time_interval_in_seconds: f64,
    ) -> Result<()> {
        if !self.is_enabled {
            return Ok(());
        }

        if self.number_of_emitted_particles == 0 {
            self.first_frame_time_in_seconds = current_time_in_seconds;
        }

        let elapsed = current_time_in_seconds - self.first_frame_time_in_seconds;
        let target_total = (((elapsed + time_interval_in_seconds) * self.max_particle_rate)
            .ceil() as usize)
            .min(self.max_number_of_particles);

        if target_total > self.number_of_emitted_particles {
            let count = target_total - self.number_of_emitted_particles;
            let (positions, velocities) = self.emit(count);
            particles.add_particles(&positions, &velocities, &[])?;
            self.number_of_emitted_particles += positions.len();
        }

        Ok(())
    }
}

/// 3D point emitter; spread is a cone half-angle around the direction.
pub struct PointParticleEmitter3 {
    rng: StdRng,
    origin: DVec3,
    direction: DVec3,
    speed: f64,
    spread_angle_in_radians: f64,
    max_particle_rate: f64,
    max_number_of_particles: usize,
    number_of_emitted_particles: usize,
    first_frame_time_in_seconds: f64,
    is_enabled: bool,
}

impl PointParticleEmitter3 {
    pub fn new(
        origin: DVec3,
        direction: DVec3,
        speed: f64,
        spread_angle_in_degrees: f64,
    ) -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            origin,
            direction: direction.normalize(),
            speed,
            spread_angle_in_radians: spread_angle_in_degrees.to_radians(),
            max_particle_rate: 1.0,
            max_number_of_particles: usize::MAX,
            number_of_emitted_particles: 0,
            first_frame_time_in_seconds: 0.0,
            is_enabled: true,
        }
    }

    pub fn with_max_particle_rate(mut self, particles_per_second: f64) -> Self {
        self.max_particle_rate = particles_per_second.max(0.0);
        self
    }

    pub fn with_max_number_of_particles(mut self, max: usize) -> Self {
        self.max_number_of_particles = max;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn number_of_emitted_particles(&self) -> usize {
        self.number_of_emitted_particles
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    /// Uniform sample on the spherical cap of half-angle `angle` around
    /// `axis`.
    fn uniform_sample_cone(u1: f64, u2: f64, axis: DVec3, angle: f64) -> DVec3 {
        let cos_half_angle = (angle / 2.0).cos();
        let y = 1.0 - (1.0 - cos_half_angle) * u1;
        let r = (1.0 - y * y).max(0.0).sqrt();
        let phi = TAU * u2;
        let (tangent, bitangent) = axis.any_orthonormal_pair();
        tangent * (r * phi.cos()) + axis * y + bitangent * (r * phi.sin())
    }

    fn emit(&mut self, count: usize) -> (Vec<DVec3>, Vec<DVec3>) {
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);

        for _ in 0..count {
            let u1 = self.rng.random::<f64>();
            let u2 = self.rng.random::<f64>();
            let direction = Self::uniform_sample_cone(
                u1,
                u2,
                self.direction,
                self.spread_angle_in_radians,
            );
            positions.push(self.origin);
            velocities.push(self.speed * direction);
        }

        (positions, velocities)
    }
}

impl ParticleEmitter3 for PointParticleEmitter3 {
    fn update(
        &mut self,
        particles: &mut ParticleSystemData3,
        current_time_in_seconds: f64,
        time_interval_in_seconds: f64,
    ) -> Result<()> {
        if !self.is_enabled {
            return Ok(());
        }

        if self.number_of_emitted_particles == 0 {
            self.first_frame_time_in_seconds = current_time_in_seconds;
        }

        let elapsed = current_time_in_seconds - self.first_frame_time_in_seconds;
        let target_total = (((elapsed + time_interval_in_seconds) * self.max_particle_rate)
            .ceil() as usize)
            .min(self.max_number_of_particles);

        if target_total > self.number_of_emitted_particles {
            let count = target_total - self.number_of_emitted_particles;
            let (positions, velocities) = self.emit(count);
            particles.add_particles(&positions, &velocities, &[])?;
            self.number_of_emitted_particles += positions.len();
        }

        Ok(())
    }
}
