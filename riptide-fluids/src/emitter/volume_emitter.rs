use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

use super::ParticleEmitter2;
use crate::error::Result;
use crate::neighbor::{PointHashGridSearch2, PointNeighborSearch2};
use crate::particle_data::ParticleSystemData2;
use riptide_geom::{BoundingBox2, ImplicitSurface2, PointGenerator2, TrianglePointGenerator};

const DEFAULT_HASH_GRID_RESOLUTION: usize = 64;

/// Fills the inside of an implicit surface with particles on a triangular
/// lattice.
///
/// Candidates are jittered along a random unit direction by up to
/// `0.5 * jitter * spacing` and accepted while they lie inside the surface
/// (`signed_distance <= 0`). Unless overlapping is allowed, candidates within
/// one spacing of an existing or already-accepted particle are rejected.
pub struct VolumeParticleEmitter2 {
    rng: StdRng,
    implicit_surface: Box<dyn ImplicitSurface2>,
    bounds: BoundingBox2,
    spacing: f64,
    initial_velocity: DVec2,
    point_generator: Box<dyn PointGenerator2>,
    max_number_of_particles: usize,
    jitter: f64,
    is_one_shot: bool,
    allow_overlapping: bool,
    number_of_emitted_particles: usize,
    is_enabled: bool,
}

impl VolumeParticleEmitter2 {
    pub fn new(
        implicit_surface: Box<dyn ImplicitSurface2>,
        bounds: BoundingBox2,
        spacing: f64,
        initial_velocity: DVec2,
    ) -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            implicit_surface,
            bounds,
            spacing,
            initial_velocity,
            point_generator: Box::new(TrianglePointGenerator),
            max_number_of_particles: usize::MAX,
            jitter: 0.0,
            is_one_shot: true,
            allow_overlapping: false,
            number_of_emitted_particles: 0,
            is_enabled: true,
        }
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.set_jitter(jitter);
        self
    }

    pub fn with_is_one_shot(mut self, one_shot: bool) -> Self {
        self.is_one_shot = one_shot;
        self
    }

    pub fn with_allow_overlapping(mut self, allow: bool) -> Self {
        self.allow_overlapping = allow;
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

    pub fn set_point_generator(&mut self, generator: Box<dyn PointGenerator2>) {
        self.point_generator = generator;
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn set_jitter(&mut self, jitter: f64) {
        self.jitter = jitter.clamp(0.0, 1.0);
    }

    pub fn is_one_shot(&self) -> bool {
        self.is_one_shot
    }

    pub fn allow_overlapping(&self) -> bool {
        self.allow_overlapping
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn initial_velocity(&self) -> DVec2 {
        self.initial_velocity
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

    fn emit(&mut self, particles: &ParticleSystemData2) -> Vec<DVec2> {
        let max_jitter_distance = 0.5 * self.jitter * self.spacing;
        let spacing = self.spacing;
        let bounds = self.bounds;
        let max_total = self.max_number_of_particles;
        let surface = self.implicit_surface.as_ref();
        let generator = self.point_generator.as_ref();
        let rng = &mut self.rng;
        let emitted = &mut self.number_of_emitted_particles;

        let jitter_offset = move |rng: &mut StdRng| {
            let angle = (rng.random::<f64>() - 0.5) * TAU;
            max_jitter_distance * DVec2::from_angle(angle)
        };

        let mut new_positions = Vec::new();

        if self.allow_overlapping || self.is_one_shot {
            generator.for_each_point(&bounds, spacing, &mut |point| {
                let candidate = point + jitter_offset(rng);
                if surface.signed_distance(candidate) <= 0.0 {
                    if *emitted < max_total {
                        new_positions.push(candidate);
                        *emitted += 1;
                    } else {
                        return false;
                    }
                }
                true
            });
        } else {
            // Continuous update: reject candidates that overlap existing or
            // freshly accepted particles, tracked in a serial hash grid that
            // grows as candidates are accepted.
            let mut neighbor_search = PointHashGridSearch2::new(
                DEFAULT_HASH_GRID_RESOLUTION,
                DEFAULT_HASH_GRID_RESOLUTION,
                2.0 * spacing,
            );
            neighbor_search.build(particles.positions());

            generator.for_each_point(&bounds, spacing, &mut |point| {
                let candidate = point + jitter_offset(rng);
                if surface.signed_distance(candidate) <= 0.0
                    && !neighbor_search.has_nearby_point(candidate, spacing)
                {
                    if *emitted < max_total {
                        new_positions.push(candidate);
                        neighbor_search.add(candidate);
                        *emitted += 1;
                    } else {
                        return false;
                    }
                }
                true
            });
        }

        new_positions
    }
}

impl ParticleEmitter2 for VolumeParticleEmitter2 {
    fn update(
        &mut self,
        particles: &mut ParticleSystemData2,
        _current_time_in_seconds: f64,
        _time_interval_in_seconds: f64,
    ) -> Result<()> {
        if !self.is_enabled {
            return Ok(());
        }

        if self.number_of_emitted_particles > 0 && self.is_one_shot {
            return Ok(());
        }

        let new_positions = self.emit(particles);
        let new_velocities = vec![self.initial_velocity; new_positions.len()];
        particles.add_particles(&new_positions, &new_velocities, &[])?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riptide_geom::{Sphere2, SurfaceToImplicit2};

    fn unit_disk() -> Box<dyn ImplicitSurface2> {
        Box::new(SurfaceToImplicit2::new(Box::new(Sphere2::new(
            DVec2::ZERO,
            1.0,
        ))))
    }

    fn disk_bounds() -> BoundingBox2 {
        BoundingBox2::new(DVec2::splat(-1.0), DVec2::splat(1.0))
    }

    #[test]
    fn fills_the_surface_interior() {
        let mut emitter =
            VolumeParticleEmitter2::new(unit_disk(), disk_bounds(), 0.1, DVec2::ZERO);
        let mut particles = ParticleSystemData2::new();
        emitter.update(&mut particles, 0.0, 1.0 / 60.0).unwrap();

        assert!(particles.number_of_particles() > 100);
        for p in particles.positions() {
            assert!(p.length() <= 1.0 + 1e-12);
        }
        for v in particles.velocities() {
            assert_eq!(*v, DVec2::ZERO);
        }
    }

    #[test]
    fn one_shot_emits_only_once() {
        let mut emitter =
            VolumeParticleEmitter2::new(unit_disk(), disk_bounds(), 0.1, DVec2::ZERO);
        let mut particles = ParticleSystemData2::new();
        emitter.update(&mut particles, 0.0, 1.0 / 60.0).unwrap();
        let first_count = particles.number_of_particles();
        emitter.update(&mut particles, 1.0 / 60.0, 1.0 / 60.0).unwrap();
        assert_eq!(particles.number_of_particles(), first_count);
    }

    #[test]
    fn max_total_caps_emission() {
        let mut emitter =
            VolumeParticleEmitter2::new(unit_disk(), disk_bounds(), 0.1, DVec2::ZERO)
                .with_max_number_of_particles(10);
        let mut particles = ParticleSystemData2::new();
        emitter.update(&mut particles, 0.0, 1.0 / 60.0).unwrap();
        assert_eq!(particles.number_of_particles(), 10);
    }

    #[test]
    fn continuous_mode_respects_existing_particles() {
        let mut emitter =
            VolumeParticleEmitter2::new(unit_disk(), disk_bounds(), 0.1, DVec2::ZERO)
                .with_is_one_shot(false);
        let mut particles = ParticleSystemData2::new();

        emitter.update(&mut particles, 0.0, 1.0 / 60.0).unwrap();
        let first_count = particles.number_of_particles();
        assert!(first_count > 0);

        // The volume is already packed at the target spacing, so the second
        // pass finds no room.
        emitter.update(&mut particles, 1.0 / 60.0, 1.0 / 60.0).unwrap();
        assert_eq!(particles.number_of_particles(), first_count);
    }

    #[test]
    fn jitter_is_clamped_and_bounded() {
        let mut emitter =
            VolumeParticleEmitter2::new(unit_disk(), disk_bounds(), 0.1, DVec2::ZERO)
                .with_jitter(5.0)
                .with_random_seed(3);
        assert_eq!(emitter.jitter(), 1.0);

        let mut particles = ParticleSystemData2::new();
        emitter.update(&mut particles, 0.0, 1.0 / 60.0).unwrap();

        // Every particle stays within half a spacing of some lattice point.
        let lattice = TrianglePointGenerator.generate(&disk_bounds(), 0.1);
        for p in particles.positions() {
            let nearest = lattice
                .iter()
                .map(|q| q.distance(*p))
                .fold(f64::MAX, f64::min);
            assert!(nearest <= 0.05 + 1e-12);
        }
    }
}
