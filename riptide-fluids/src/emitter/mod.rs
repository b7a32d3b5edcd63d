//! Particle emitters.
//!
//! Emitters receive the target particle data as a borrow on every update
//! (rather than holding a back-reference), and are driven by the solver
//! during the begin phase of each sub-timestep.

pub mod point_emitter;
pub mod volume_emitter;

pub use point_emitter::{PointParticleEmitter2, PointParticleEmitter3};
pub use volume_emitter::VolumeParticleEmitter2;

use crate::error::Result;
use crate::particle_data::{ParticleSystemData2, ParticleSystemData3};

/// Produces new 2D particles over time.
pub trait ParticleEmitter2: Send {
    /// Push any particles due by `current_time + time_interval` into
    /// `particles`. Disabled emitters do nothing.
    fn update(
        &mut self,
        particles: &mut ParticleSystemData2,
        current_time_in_seconds: f64,
        time_interval_in_seconds: f64,
    ) -> Result<()>;
}

/// Produces new 3D particles over time.
pub trait ParticleEmitter3: Send {
    fn update(
        &mut self,
        particles: &mut ParticleSystemData3,
        current_time_in_seconds: f64,
        time_interval_in_seconds: f64,
    ) -> Result<()>;
}
