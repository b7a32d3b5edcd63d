//! Particle attribute storage.
//!
//! Positions, velocities, and forces are built-in layers; callers can append
//! extra scalar or vector layers and address them through the ids returned at
//! creation. Every layer always has one entry per particle: resizing and
//! particle insertion grow all layers together, filling new slots with zero
//! for built-ins and with each extra layer's declared initial value.

use glam::{DVec2, DVec3};
use rayon::prelude::*;
use std::time::Instant;

use crate::error::{FluidError, Result};
use crate::neighbor::{
    PointNeighborSearch2, PointNeighborSearch3, PointParallelHashGridSearch2,
    PointParallelHashGridSearch3,
};

const DEFAULT_HASH_GRID_RESOLUTION: usize = 64;
const DEFAULT_RADIUS: f64 = 1e-3;
const DEFAULT_MASS: f64 = 1e-3;

/// Handle to an extra scalar layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarLayerId(pub(crate) usize);

/// Handle to an extra vector layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorLayerId(pub(crate) usize);

#[derive(Debug, Clone)]
struct ScalarLayer {
    initial_value: f64,
    data: Vec<f64>,
}

#[derive(Debug, Clone)]
struct VectorLayer<V> {
    initial_value: V,
    data: Vec<V>,
}

/// 2D particle system data: attribute layers plus the neighbor-search state.
pub struct ParticleSystemData2 {
    radius: f64,
    mass: f64,
    positions: Vec<DVec2>,
    velocities: Vec<DVec2>,
    forces: Vec<DVec2>,
    scalar_layers: Vec<ScalarLayer>,
    vector_layers: Vec<VectorLayer<DVec2>>,
    neighbor_search: Box<dyn PointNeighborSearch2>,
    neighbor_lists: Vec<Vec<usize>>,
}

impl ParticleSystemData2 {
    pub fn new() -> Self {
        Self::with_particle_count(0)
    }

    pub fn with_particle_count(number_of_particles: usize) -> Self {
        let mut data = Self {
            radius: DEFAULT_RADIUS,
            mass: DEFAULT_MASS,
            positions: Vec::new(),
            velocities: Vec::new(),
            forces: Vec::new(),
            scalar_layers: Vec::new(),
            vector_layers: Vec::new(),
            neighbor_search: Box::new(PointParallelHashGridSearch2::new(
                DEFAULT_HASH_GRID_RESOLUTION,
                DEFAULT_HASH_GRID_RESOLUTION,
                2.0 * DEFAULT_RADIUS,
            )),
            neighbor_lists: Vec::new(),
        };
        data.resize(number_of_particles);
        data
    }

    pub fn number_of_particles(&self) -> usize {
        self.positions.len()
    }

    /// Set every layer's length to `n`, zero-filling new built-in slots and
    /// initial-value-filling new extra-layer slots.
    pub fn resize(&mut self, n: usize) {
        self.positions.resize(n, DVec2::ZERO);
        self.velocities.resize(n, DVec2::ZERO);
        self.forces.resize(n, DVec2::ZERO);
        for layer in &mut self.scalar_layers {
            layer.data.resize(n, layer.initial_value);
        }
        for layer in &mut self.vector_layers {
            layer.data.resize(n, layer.initial_value);
        }
    }

    pub fn add_scalar_layer(&mut self, initial_value: f64) -> ScalarLayerId {
        let id = ScalarLayerId(self.scalar_layers.len());
        self.scalar_layers.push(ScalarLayer {
            initial_value,
            data: vec![initial_value; self.number_of_particles()],
        });
        id
    }

    pub fn add_vector_layer(&mut self, initial_value: DVec2) -> VectorLayerId {
        let id = VectorLayerId(self.vector_layers.len());
        self.vector_layers.push(VectorLayer {
            initial_value,
            data: vec![initial_value; self.number_of_particles()],
        });
        id
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass.max(0.0);
    }

    pub fn positions(&self) -> &[DVec2] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [DVec2] {
        &mut self.positions
    }

    pub fn velocities(&self) -> &[DVec2] {
        &self.velocities
    }

    pub fn velocities_mut(&mut self) -> &mut [DVec2] {
        &mut self.velocities
    }

    pub fn forces(&self) -> &[DVec2] {
        &self.forces
    }

    pub fn forces_mut(&mut self) -> &mut [DVec2] {
        &mut self.forces
    }

    pub fn scalar_layer(&self, id: ScalarLayerId) -> &[f64] {
        &self.scalar_layers[id.0].data
    }

    pub fn scalar_layer_mut(&mut self, id: ScalarLayerId) -> &mut [f64] {
        &mut self.scalar_layers[id.0].data
    }

    pub fn vector_layer(&self, id: VectorLayerId) -> &[DVec2] {
        &self.vector_layers[id.0].data
    }

    pub fn vector_layer_mut(&mut self, id: VectorLayerId) -> &mut [DVec2] {
        &mut self.vector_layers[id.0].data
    }

    /// Borrow one scalar layer read-only and another mutably.
    pub fn scalar_layer_pair_mut(
        &mut self,
        read: ScalarLayerId,
        write: ScalarLayerId,
    ) -> (&[f64], &mut [f64]) {
        assert_ne!(read.0, write.0, "layer pair must be distinct");
        if read.0 < write.0 {
            let (head, tail) = self.scalar_layers.split_at_mut(write.0);
            (&head[read.0].data, &mut tail[0].data)
        } else {
            let (head, tail) = self.scalar_layers.split_at_mut(read.0);
            (&tail[0].data, &mut head[write.0].data)
        }
    }

    /// Read-only kinematics alongside a mutable force layer.
    pub(crate) fn kinematics_and_forces_mut(
        &mut self,
    ) -> (&[DVec2], &[DVec2], &mut [DVec2]) {
        (&self.positions, &self.velocities, &mut self.forces)
    }

    /// Mutable position and velocity layers for the commit phase.
    pub(crate) fn positions_and_velocities_mut(
        &mut self,
    ) -> (&mut [DVec2], &mut [DVec2]) {
        (&mut self.positions, &mut self.velocities)
    }

    pub fn add_particle(
        &mut self,
        position: DVec2,
        velocity: DVec2,
        force: DVec2,
    ) {
        // Single-element slices always satisfy the length contract.
        self.add_particles(&[position], &[velocity], &[force])
            .expect("single-particle insertion cannot fail");
    }

    /// Append `positions.len()` particles. `velocities` and `forces` must be
    /// empty or match `positions` in length; no state changes on failure.
    pub fn add_particles(
        &mut self,
        positions: &[DVec2],
        velocities: &[DVec2],
        forces: &[DVec2],
    ) -> Result<()> {
        if !velocities.is_empty() && velocities.len() != positions.len() {
            return Err(FluidError::InvalidArgument(format!(
                "velocities length {} does not match positions length {}",
                velocities.len(),
                positions.len()
            )));
        }
        if !forces.is_empty() && forces.len() != positions.len() {
            return Err(FluidError::InvalidArgument(format!(
                "forces length {} does not match positions length {}",
                forces.len(),
                positions.len()
            )));
        }

        let old_count = self.number_of_particles();
        self.resize(old_count + positions.len());

        self.positions[old_count..].copy_from_slice(positions);
        if !velocities.is_empty() {
            self.velocities[old_count..].copy_from_slice(velocities);
        }
        if !forces.is_empty() {
            self.forces[old_count..].copy_from_slice(forces);
        }

        Ok(())
    }

    pub fn neighbor_search(&self) -> &dyn PointNeighborSearch2 {
        self.neighbor_search.as_ref()
    }

    /// Replace the neighbor-search instance; cached neighbor lists become
    /// stale and are dropped.
    pub fn set_neighbor_search(&mut self, search: Box<dyn PointNeighborSearch2>) {
        self.neighbor_search = search;
        self.neighbor_lists.clear();
    }

    pub fn neighbor_lists(&self) -> &[Vec<usize>] {
        &self.neighbor_lists
    }

    /// Rebuild the neighbor-search structure from the current positions using
    /// a fresh parallel hash grid spaced for `max_search_radius`.
    pub fn build_neighbor_search(&mut self, max_search_radius: f64) {
        let timer = Instant::now();

        let mut search = PointParallelHashGridSearch2::new(
            DEFAULT_HASH_GRID_RESOLUTION,
            DEFAULT_HASH_GRID_RESOLUTION,
            2.0 * max_search_radius,
        );
        search.build(&self.positions);
        self.neighbor_search = Box::new(search);

        tracing::debug!(elapsed = ?timer.elapsed(), "built neighbor search");
    }

    /// Fill per-particle neighbor lists (self excluded) from the current
    /// neighbor-search structure.
    pub fn build_neighbor_lists(&mut self, max_search_radius: f64) {
        let timer = Instant::now();

        self.neighbor_lists
            .resize(self.number_of_particles(), Vec::new());

        let Self {
            positions,
            neighbor_search,
            neighbor_lists,
            ..
        } = self;
        let positions: &[DVec2] = positions;
        let search = neighbor_search.as_ref();

        neighbor_lists
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, list)| {
                let origin = positions[i];
                list.clear();
                search.for_each_nearby_point(origin, max_search_radius, &mut |j, _| {
                    if i != j {
                        list.push(j);
                    }
                });
            });

        tracing::debug!(elapsed = ?timer.elapsed(), "built neighbor lists");
    }
}

impl Default for ParticleSystemData2 {
    fn default() -> Self {
        Self::new()
    }
}

/// 3D particle system data.
pub struct ParticleSystemData3 {
    radius: f64,
    mass: f64,
    positions: Vec<DVec3>,
    velocities: Vec<DVec3>,
    forces: Vec<DVec3>,
    scalar_layers: Vec<ScalarLayer>,
    vector_layers: Vec<VectorLayer<DVec3>>,
    neighbor_search: Box<dyn PointNeighborSearch3>,
    neighbor_lists: Vec<Vec<usize>>,
}

impl ParticleSystemData3 {
    pub fn new() -> Self {
        Self::with_particle_count(0)
    }

    pub fn with_particle_count(number_of_particles: usize) -> Self {
        let mut data = Self {
            radius: DEFAULT_RADIUS,
            mass: DEFAULT_MASS,
            positions: Vec::new(),
            velocities: Vec::new(),
            forces: Vec::new(),
            scalar_layers: Vec::new(),
            vector_layers: Vec::new(),
            neighbor_search: Box::new(PointParallelHashGridSearch3::new(
                DEFAULT_HASH_GRID_RESOLUTION,
                DEFAULT_HASH_GRID_RESOLUTION,
                DEFAULT_HASH_GRID_RESOLUTION,
                2.0 * DEFAULT_RADIUS,
            )),
            neighbor_lists: Vec::new(),
        };
        data.resize(number_of_particles);
        data
    }

    pub fn number_of_particles(&self) -> usize {
        self.positions.len()
    }

    pub fn resize(&mut self, n: usize) {
        self.positions.resize(n, DVec3::ZERO);
        self.velocities.resize(n, DVec3::ZERO);
        self.forces.resize(n, DVec3::ZERO);
        for layer in &mut self.scalar_layers {
            layer.data.resize(n, layer.initial_value);
        }
        for layer in &mut self.vector_layers {
            layer.data.resize(n, layer.initial_value);
        }
    }

    pub fn add_scalar_layer(&mut self, initial_value: f64) -> ScalarLayerId {
        let id = ScalarLayerId(self.scalar_layers.len());
        self.scalar_layers.push(ScalarLayer {
            initial_value,
            data: vec![initial_value; self.number_of_particles()],
        });
        id
    }

    pub fn add_vector_layer(&mut self, initial_value: DVec3) -> VectorLayerId {
        let id = VectorLayerId(self.vector_layers.len());
        self.vector_layers.push(VectorLayer {
            initial_value,
            data: vec![initial_value; self.number_of_particles()],
        });
        id
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass.max(0.0);
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [DVec3] {
        &mut self.positions
    }

    pub fn velocities(&self) -> &[DVec3] {
        &self.velocities
    }

    pub fn velocities_mut(&mut self) -> &mut [DVec3] {
        &mut self.velocities
    }

    pub fn forces(&self) -> &[DVec3] {
        &self.forces
    }

    pub fn forces_mut(&mut self) -> &mut [DVec3] {
        &mut self.forces
    }

    pub fn scalar_layer(&self, id: ScalarLayerId) -> &[f64] {
        &self.scalar_layers[id.0].data
    }

    pub fn scalar_layer_mut(&mut self, id: ScalarLayerId) -> &mut [f64] {
        &mut self.scalar_layers[id.0].data
    }

    pub fn vector_layer(&self, id: VectorLayerId) -> &[DVec3] {
        &self.vector_layers[id.0].data
    }

    pub fn vector_layer_mut(&mut self, id: VectorLayerId) -> &mut [DVec3] {
        &mut self.vector_layers[id.0].data
    }

    pub fn add_particle(&mut self, position: DVec3, velocity: DVec3, force: DVec3) {
        self.add_particles(&[position], &[velocity], &[force])
            .expect("single-particle insertion cannot fail");
    }

    pub fn add_particles(
        &mut self,
        positions: &[DVec3],
        velocities: &[DVec3],
        forces: &[DVec3],
    ) -> Result<()> {
        if !velocities.is_empty() && velocities.len() != positions.len() {
            return Err(FluidError::InvalidArgument(format!(
                "velocities length {} does not match positions length {}",
                velocities.len(),
                positions.len()
            )));
        }
        if !forces.is_empty() && forces.len() != positions.len() {
            return Err(FluidError::InvalidArgument(format!(
                "forces length {} does not match positions length {}",
                forces.len(),
                positions.len()
            )));
        }

        let old_count = self.number_of_particles();
        self.resize(old_count + positions.len());

        self.positions[old_count..].copy_from_slice(positions);
        if !velocities.is_empty() {
            self.velocities[old_count..].copy_from_slice(velocities);
        }
        if !forces.is_empty() {
            self.forces[old_count..].copy_from_slice(forces);
        }

        Ok(())
    }

    pub fn neighbor_search(&self) -> &dyn PointNeighborSearch3 {
        self.neighbor_search.as_ref()
    }

    pub fn set_neighbor_search(&mut self, search: Box<dyn PointNeighborSearch3>) {
        self.neighbor_search = search;
        self.neighbor_lists.clear();
    }

    pub fn neighbor_lists(&self) -> &[Vec<usize>] {
        &self.neighbor_lists
    }

    pub fn build_neighbor_search(&mut self, max_search_radius: f64) {
        let timer = Instant::now();

        let mut search = PointParallelHashGridSearch3::new(
            DEFAULT_HASH_GRID_RESOLUTION,
            DEFAULT_HASH_GRID_RESOLUTION,
            DEFAULT_HASH_GRID_RESOLUTION,
            2.0 * max_search_radius,
        );
        search.build(&self.positions);
        self.neighbor_search = Box::new(search);

        tracing::debug!(elapsed = ?timer.elapsed(), "built neighbor search");
    }

    pub fn build_neighbor_lists(&mut self, max_search_radius: f64) {
        let timer = Instant::now();

        self.neighbor_lists
            .resize(self.number_of_particles(), Vec::new());

        let Self {
            positions,
            neighbor_search,
            neighbor_lists,
            ..
        } = self;
        let positions: &[DVec3] = positions;
        let search = neighbor_search.as_ref();

        neighbor_lists
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, list)| {
                let origin = positions[i];
                list.clear();
                search.for_each_nearby_point(origin, max_search_radius, &mut |j, _| {
                    if i != j {
                        list.push(j);
                    }
                });
            });

        tracing::debug!(elapsed = ?timer.elapsed(), "built neighbor lists");
    }
}

impl Default for ParticleSystemData3 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_grow_together() {
        let mut data = ParticleSystemData2::with_particle_count(3);
        let density = data.add_scalar_layer(7.5);
        let smoothed = data.add_vector_layer(DVec2::new(1.0, 2.0));

        data.resize(5);
        assert_eq!(data.number_of_particles(), 5);
        assert_eq!(data.positions().len(), 5);
        assert_eq!(data.scalar_layer(density), &[7.5; 5]);
        assert_eq!(data.vector_layer(smoothed).len(), 5);
        assert_eq!(data.vector_layer(smoothed)[4], DVec2::new(1.0, 2.0));
    }

    #[test]
    fn add_particles_zero_fills_unnamed_layers() {
        let mut data = ParticleSystemData2::new();
        data.add_particles(&[DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0)], &[], &[])
            .unwrap();

        assert_eq!(data.number_of_particles(), 2);
        assert_eq!(data.velocities(), &[DVec2::ZERO, DVec2::ZERO]);
        assert_eq!(data.forces(), &[DVec2::ZERO, DVec2::ZERO]);
    }

    #[test]
    fn mismatched_secondary_lengths_leave_data_unchanged() {
        let mut data = ParticleSystemData2::new();
        data.add_particle(DVec2::ZERO, DVec2::ZERO, DVec2::ZERO);

        let positions = [DVec2::ZERO; 4];
        let velocities = [DVec2::ZERO; 3];
        let result = data.add_particles(&positions, &velocities, &[]);
        assert!(matches!(result, Err(FluidError::InvalidArgument(_))));
        assert_eq!(data.number_of_particles(), 1);

        let forces = [DVec2::ZERO; 2];
        let result = data.add_particles(&positions, &[], &forces);
        assert!(matches!(result, Err(FluidError::InvalidArgument(_))));
        assert_eq!(data.number_of_particles(), 1);
    }

    #[test]
    fn radius_and_mass_clamp_to_non_negative() {
        let mut data = ParticleSystemData2::new();
        data.set_radius(-1.0);
        data.set_mass(-5.0);
        assert_eq!(data.radius(), 0.0);
        assert_eq!(data.mass(), 0.0);
    }

    #[test]
    fn neighbor_lists_exclude_self() {
        let mut data = ParticleSystemData2::new();
        data.add_particles(
            &[
                DVec2::new(0.0, 0.0),
                DVec2::new(0.05, 0.0),
                DVec2::new(10.0, 10.0),
            ],
            &[],
            &[],
        )
        .unwrap();

        data.build_neighbor_search(0.1);
        data.build_neighbor_lists(0.1);

        assert_eq!(data.neighbor_lists()[0], vec![1]);
        assert_eq!(data.neighbor_lists()[1], vec![0]);
        assert!(data.neighbor_lists()[2].is_empty());
    }

    #[test]
    fn replacing_search_drops_cached_lists() {
        let mut data = ParticleSystemData2::new();
        data.add_particles(&[DVec2::ZERO, DVec2::new(0.01, 0.0)], &[], &[])
            .unwrap();
        data.build_neighbor_search(0.1);
        data.build_neighbor_lists(0.1);
        assert!(!data.neighbor_lists().is_empty());

        data.set_neighbor_search(Box::new(PointParallelHashGridSearch2::new(
            16, 16, 0.2,
        )));
        assert!(data.neighbor_lists().is_empty());
    }

    #[test]
    fn scalar_layer_pair_split_borrows() {
        let mut data = ParticleSystemData2::with_particle_count(2);
        let a = data.add_scalar_layer(1.0);
        let b = data.add_scalar_layer(0.0);

        let (read, write) = data.scalar_layer_pair_mut(a, b);
        write[0] = read[0] * 2.0;
        assert_eq!(data.scalar_layer(b)[0], 2.0);
    }
}
