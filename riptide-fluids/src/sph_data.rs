//! SPH-aware particle data: density and pressure layers plus kernel-based
//! field queries.

use glam::DVec2;
use rayon::prelude::*;
use riptide_geom::{BoundingBox2, PointGenerator2, TrianglePointGenerator};
use std::time::Instant;

use crate::particle_data::{ParticleSystemData2, ScalarLayerId};
use crate::sph_kernels::{SphSpikyKernel2, SphStdKernel2};

const DEFAULT_TARGET_DENSITY: f64 = 1000.0;
const DEFAULT_TARGET_SPACING: f64 = 0.1;
const DEFAULT_RELATIVE_KERNEL_RADIUS: f64 = 1.8;

/// 2D particle data specialized for SPH.
///
/// Target density, target spacing, and relative kernel radius are coupled:
/// changing any of them recomputes the kernel radius and recalibrates the
/// per-particle mass so a fluid at rest at the target spacing reproduces the
/// target density.
pub struct SphSystemData2 {
    base: ParticleSystemData2,
    target_density: f64,
    target_spacing: f64,
    relative_kernel_radius: f64,
    kernel_radius: f64,
    density_id: ScalarLayerId,
    pressure_id: ScalarLayerId,
}

impl SphSystemData2 {
    pub fn new() -> Self {
        Self::with_particle_count(0)
    }

    pub fn with_particle_count(number_of_particles: usize) -> Self {
        let mut base = ParticleSystemData2::with_particle_count(number_of_particles);
        let density_id = base.add_scalar_layer(0.0);
        let pressure_id = base.add_scalar_layer(0.0);

        let mut data = Self {
            base,
            target_density: DEFAULT_TARGET_DENSITY,
            target_spacing: DEFAULT_TARGET_SPACING,
            relative_kernel_radius: DEFAULT_RELATIVE_KERNEL_RADIUS,
            kernel_radius: DEFAULT_RELATIVE_KERNEL_RADIUS * DEFAULT_TARGET_SPACING,
            density_id,
            pressure_id,
        };
        data.set_target_spacing(DEFAULT_TARGET_SPACING);
        data
    }

    pub fn base(&self) -> &ParticleSystemData2 {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ParticleSystemData2 {
        &mut self.base
    }

    pub fn number_of_particles(&self) -> usize {
        self.base.number_of_particles()
    }

    pub fn mass(&self) -> f64 {
        self.base.mass()
    }

    /// Setting the mass directly rescales the target density by the same
    /// ratio, keeping the calibration consistent.
    pub fn set_mass(&mut self, mass: f64) {
        let ratio = mass / self.base.mass();
        self.target_density *= ratio;
        self.base.set_mass(mass);
    }

    /// Particle radius is interpreted as the target spacing.
    pub fn set_radius(&mut self, radius: f64) {
        self.set_target_spacing(radius);
    }

    pub fn densities(&self) -> &[f64] {
        self.base.scalar_layer(self.density_id)
    }

    pub fn densities_mut(&mut self) -> &mut [f64] {
        self.base.scalar_layer_mut(self.density_id)
    }

    pub fn pressures(&self) -> &[f64] {
        self.base.scalar_layer(self.pressure_id)
    }

    pub fn pressures_mut(&mut self) -> &mut [f64] {
        self.base.scalar_layer_mut(self.pressure_id)
    }

    pub fn density_layer_id(&self) -> ScalarLayerId {
        self.density_id
    }

    pub fn pressure_layer_id(&self) -> ScalarLayerId {
        self.pressure_id
    }

    pub fn target_density(&self) -> f64 {
        self.target_density
    }

    pub fn set_target_density(&mut self, target_density: f64) {
        self.target_density = target_density;
        self.compute_mass();
    }

    pub fn target_spacing(&self) -> f64 {
        self.target_spacing
    }

    pub fn set_target_spacing(&mut self, spacing: f64) {
        self.base.set_radius(spacing);
        self.target_spacing = spacing;
        self.kernel_radius = self.relative_kernel_radius * spacing;
        self.compute_mass();
    }

    pub fn relative_kernel_radius(&self) -> f64 {
        self.relative_kernel_radius
    }

    pub fn set_relative_kernel_radius(&mut self, relative_radius: f64) {
        self.relative_kernel_radius = relative_radius;
        self.kernel_radius = relative_radius * self.target_spacing;
        self.compute_mass();
    }

    pub fn kernel_radius(&self) -> f64 {
        self.kernel_radius
    }

    /// Sum of standard-kernel weights over every point within the kernel
    /// radius of `origin` (the number density at `origin`).
    pub fn sum_of_kernels_nearby(&self, origin: DVec2) -> f64 {
        let kernel = SphStdKernel2::new(self.kernel_radius);
        let mut sum = 0.0;
        self.base
            .neighbor_search()
            .for_each_nearby_point(origin, self.kernel_radius, &mut |_, neighbor| {
                sum += kernel.value(origin.distance(neighbor));
            });
        sum
    }

    /// Recompute the density of every particle from the current positions.
    /// Requires an up-to-date neighbor search.
    pub fn update_densities(&mut self) {
        let timer = Instant::now();
        let kernel_radius = self.kernel_radius;
        let kernel = SphStdKernel2::new(kernel_radius);

        let sums: Vec<f64> = {
            let positions = self.base.positions();
            let search = self.base.neighbor_search();
            positions
                .par_iter()
                .map(|&origin| {
                    let mut sum = 0.0;
                    search.for_each_nearby_point(origin, kernel_radius, &mut |_, neighbor| {
                        sum += kernel.value(origin.distance(neighbor));
                    });
                    sum
                })
                .collect()
        };

        let mass = self.base.mass();
        self.base
            .scalar_layer_mut(self.density_id)
            .par_iter_mut()
            .zip(sums.par_iter())
            .for_each(|(density, &sum)| *density = mass * sum);

        tracing::debug!(elapsed = ?timer.elapsed(), "updated densities");
    }

    /// Kernel-weighted interpolation of a scalar field sampled at particles.
    pub fn interpolate(&self, origin: DVec2, values: &[f64]) -> f64 {
        let kernel = SphStdKernel2::new(self.kernel_radius);
        let densities = self.densities();
        let mass = self.base.mass();

        let mut sum = 0.0;
        self.base
            .neighbor_search()
            .for_each_nearby_point(origin, self.kernel_radius, &mut |i, neighbor| {
                let weight = mass / densities[i] * kernel.value(origin.distance(neighbor));
                sum += weight * values[i];
            });
        sum
    }

    /// Kernel-weighted interpolation of a vector field sampled at particles.
    pub fn interpolate_vector(&self, origin: DVec2, values: &[DVec2]) -> DVec2 {
        let kernel = SphStdKernel2::new(self.kernel_radius);
        let densities = self.densities();
        let mass = self.base.mass();

        let mut sum = DVec2::ZERO;
        self.base
            .neighbor_search()
            .for_each_nearby_point(origin, self.kernel_radius, &mut |i, neighbor| {
                let weight = mass / densities[i] * kernel.value(origin.distance(neighbor));
                sum += weight * values[i];
            });
        sum
    }

    /// Symmetrized SPH gradient of a scalar field at particle `i`. Requires
    /// up-to-date neighbor lists and densities.
    pub fn gradient_at(&self, i: usize, values: &[f64]) -> DVec2 {
        let positions = self.base.positions();
        let densities = self.densities();
        let neighbors = &self.base.neighbor_lists()[i];
        let kernel = SphSpikyKernel2::new(self.kernel_radius);
        let mass = self.base.mass();
        let origin = positions[i];

        let mut sum = DVec2::ZERO;
        for &j in neighbors {
            let neighbor = positions[j];
            let distance = origin.distance(neighbor);
            if distance > 0.0 {
                let direction = (neighbor - origin) / distance;
                sum += densities[i]
                    * mass
                    * (values[i] / (densities[i] * densities[i])
                        + values[j] / (densities[j] * densities[j]))
                    * kernel.gradient(distance, direction);
            }
        }
        sum
    }

    /// SPH Laplacian of a scalar field at particle `i`.
    pub fn laplacian_at(&self, i: usize, values: &[f64]) -> f64 {
        let positions = self.base.positions();
        let densities = self.densities();
        let neighbors = &self.base.neighbor_lists()[i];
        let kernel = SphSpikyKernel2::new(self.kernel_radius);
        let mass = self.base.mass();
        let origin = positions[i];

        let mut sum = 0.0;
        for &j in neighbors {
            let distance = origin.distance(positions[j]);
            sum += mass * (values[j] - values[i]) / densities[j]
                * kernel.second_derivative(distance);
        }
        sum
    }

    /// SPH Laplacian of a vector field at particle `i`.
    pub fn laplacian_vector_at(&self, i: usize, values: &[DVec2]) -> DVec2 {
        let positions = self.base.positions();
        let densities = self.densities();
        let neighbors = &self.base.neighbor_lists()[i];
        let kernel = SphSpikyKernel2::new(self.kernel_radius);
        let mass = self.base.mass();
        let origin = positions[i];

        let mut sum = DVec2::ZERO;
        for &j in neighbors {
            let distance = origin.distance(positions[j]);
            sum += mass * kernel.second_derivative(distance) / densities[j]
                * (values[j] - values[i]);
        }
        sum
    }

    /// Rebuild the neighbor search over the kernel radius.
    pub fn build_neighbor_search(&mut self) {
        self.base.build_neighbor_search(self.kernel_radius);
    }

    /// Rebuild the per-particle neighbor lists over the kernel radius.
    pub fn build_neighbor_lists(&mut self) {
        self.base.build_neighbor_lists(self.kernel_radius);
    }

    /// Calibrate the particle mass so a triangular lattice at the target
    /// spacing reproduces the target density: sample the lattice in a box of
    /// side `3h`, take the largest number density, and divide.
    fn compute_mass(&mut self) {
        let sample_bound = BoundingBox2::new(
            DVec2::splat(-1.5 * self.kernel_radius),
            DVec2::splat(1.5 * self.kernel_radius),
        );
        let points = TrianglePointGenerator.generate(&sample_bound, self.target_spacing);

        let kernel = SphStdKernel2::new(self.kernel_radius);
        let mut max_number_density = 0.0f64;
        for &point in &points {
            let mut sum = 0.0;
            for &neighbor_point in &points {
                sum += kernel.value(neighbor_point.distance(point));
            }
            max_number_density = max_number_density.max(sum);
        }

        debug_assert!(max_number_density > 0.0);
        if max_number_density > 0.0 {
            self.base.set_mass(self.target_density / max_number_density);
        }
    }
}

impl Default for SphSystemData2 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_creates_density_and_pressure_layers() {
        let data = SphSystemData2::with_particle_count(4);
        assert_eq!(data.densities().len(), 4);
        assert_eq!(data.pressures().len(), 4);
        assert_ne!(data.density_layer_id(), data.pressure_layer_id());
    }

    #[test]
    fn kernel_radius_tracks_spacing_and_relative_radius() {
        let mut data = SphSystemData2::new();
        data.set_target_spacing(0.02);
        assert!((data.kernel_radius() - 1.8 * 0.02).abs() < 1e-12);

        data.set_relative_kernel_radius(2.0);
        assert!((data.kernel_radius() - 2.0 * 0.02).abs() < 1e-12);
    }

    #[test]
    fn mass_calibration_tracks_target_density() {
        let mut data = SphSystemData2::new();
        data.set_target_density(1000.0);
        data.set_target_spacing(0.1);
        let mass_at_1000 = data.mass();
        assert!(mass_at_1000 > 0.0);

        data.set_target_density(500.0);
        assert!((data.mass() - 0.5 * mass_at_1000).abs() < 1e-12 * mass_at_1000);
    }

    #[test]
    fn setting_mass_rescales_target_density() {
        let mut data = SphSystemData2::new();
        let density_before = data.target_density();
        let mass_before = data.mass();
        data.set_mass(2.0 * mass_before);
        assert!((data.target_density() - 2.0 * density_before).abs() < 1e-9);
    }

    #[test]
    fn lattice_seed_reaches_target_density() {
        let mut data = SphSystemData2::new();
        data.set_target_density(1000.0);
        data.set_target_spacing(0.1);

        // Seed a lattice larger than the calibration box.
        let bound = BoundingBox2::new(DVec2::splat(-0.5), DVec2::splat(0.5));
        let points = TrianglePointGenerator.generate(&bound, data.target_spacing());
        data.base_mut().add_particles(&points, &[], &[]).unwrap();

        data.build_neighbor_search();
        data.build_neighbor_lists();
        data.update_densities();

        let max_density = data.densities().iter().fold(0.0f64, |a, &b| a.max(b));
        assert!(max_density <= 1000.0 * (1.0 + 1e-6), "max density {max_density}");
        // The interior of the lattice should actually get close to the target.
        assert!(max_density > 900.0, "max density {max_density}");
    }

    #[test]
    fn interpolation_reproduces_constant_fields() {
        let mut data = SphSystemData2::new();
        data.set_target_spacing(0.1);
        let bound = BoundingBox2::new(DVec2::splat(-0.4), DVec2::splat(0.4));
        let points = TrianglePointGenerator.generate(&bound, 0.1);
        data.base_mut().add_particles(&points, &[], &[]).unwrap();
        data.build_neighbor_search();
        data.build_neighbor_lists();
        data.update_densities();

        // Sample at an interior lattice point, where the calibrated mass makes
        // the kernel weights sum to one.
        let origin = *data
            .base()
            .positions()
            .iter()
            .min_by(|a, b| {
                a.length_squared()
                    .partial_cmp(&b.length_squared())
                    .unwrap()
            })
            .unwrap();
        let ones = vec![1.0; data.number_of_particles()];
        let value = data.interpolate(origin, &ones);
        assert!((value - 1.0).abs() < 0.05, "interpolated {value}");
    }
}
