//! # Riptide Fluids
//!
//! CPU particle and SPH fluid simulation kernel:
//!
//! - **Animation layer** - fixed-rate frames with adaptive sub-timestepping
//! - **Particle system data** - built-in position/velocity/force layers plus
//!   caller-extensible scalar and vector layers
//! - **Neighbor search** - list, hash-grid, and parallel hash-grid variants
//!   in 2D and 3D
//! - **SPH** - density/pressure layers, poly6 and spiky kernels, mass
//!   calibration, field operators, and a weakly-compressible solver
//! - **Emitters** - point sources and volume filling over implicit surfaces
//! - **Colliders** - implicit-surface penetration resolution with restitution
//!   and optional friction
//!
//! Geometry (implicit surfaces, bounding boxes, point generators) lives in
//! the `riptide-geom` crate; `rayon` drives the data-parallel inner loops.
//!
//! ## Quick start
//! ```
//! use glam::DVec2;
//! use riptide_fluids::frame::Frame;
//! use riptide_fluids::physics_animation::PhysicsAnimation;
//! use riptide_fluids::solver::SphSolver2;
//!
//! let mut solver = SphSolver2::with_params(1000.0, 0.05, 1.8);
//! solver
//!     .sph_system_data_mut()
//!     .base_mut()
//!     .add_particles(&[DVec2::new(0.0, 1.0)], &[], &[])
//!     .unwrap();
//!
//! for index in 1..=10 {
//!     solver.update(Frame::new(index, 1.0 / 60.0)).unwrap();
//! }
//! ```

pub mod collider;
pub mod emitter;
pub mod error;
pub mod field;
pub mod frame;
pub mod neighbor;
pub mod particle_data;
pub mod physics_animation;
pub mod solver;
pub mod sph_data;
pub mod sph_kernels;

pub use collider::{Collider2, RigidBodyCollider2};
pub use emitter::{
    ParticleEmitter2, ParticleEmitter3, PointParticleEmitter2, PointParticleEmitter3,
    VolumeParticleEmitter2,
};
pub use error::{FluidError, Result};
pub use field::{ConstantVectorField2, ConstantVectorField3, VectorField2, VectorField3};
pub use frame::{Animation, Frame};
pub use neighbor::{
    PointHashGridSearch2, PointHashGridSearch3, PointListSearch2, PointListSearch3,
    PointNeighborSearch2, PointNeighborSearch3, PointParallelHashGridSearch2,
    PointParallelHashGridSearch3,
};
pub use particle_data::{
    ParticleSystemData2, ParticleSystemData3, ScalarLayerId, VectorLayerId,
};
pub use physics_animation::{PhysicsAnimation, PhysicsAnimationState};
pub use solver::{ParticleSystemSolver2, SphSolver2};
pub use sph_data::SphSystemData2;
pub use sph_kernels::{SphSpikyKernel2, SphStdKernel2};
