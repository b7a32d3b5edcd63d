//! Radial smoothing kernels for 2D SPH.
//!
//! Two kernels, both with compact support `[0, h]`: the standard (poly6)
//! kernel used for density and interpolation, and the spiky kernel whose
//! sharper gradient near the origin drives pressure and viscosity terms.
//! Constants follow Müller et al., "Particle-Based Fluid Simulation for
//! Interactive Applications".

use glam::DVec2;
use std::f64::consts::PI;

/// Standard (poly6) SPH kernel.
#[derive(Debug, Clone, Copy)]
pub struct SphStdKernel2 {
    /// Kernel support radius.
    pub h: f64,
    h2: f64,
    h4: f64,
}

impl SphStdKernel2 {
    pub fn new(kernel_radius: f64) -> Self {
        let h2 = kernel_radius * kernel_radius;
        Self {
            h: kernel_radius,
            h2,
            h4: h2 * h2,
        }
    }

    pub fn value(&self, distance: f64) -> f64 {
        let distance_squared = distance * distance;
        if distance_squared >= self.h2 {
            0.0
        } else {
            let x = 1.0 - distance_squared / self.h2;
            4.0 / (PI * self.h2) * x * x * x
        }
    }

    pub fn first_derivative(&self, distance: f64) -> f64 {
        if distance >= self.h {
            0.0
        } else {
            let x = 1.0 - distance * distance / self.h2;
            -24.0 * distance / (PI * self.h4) * x * x
        }
    }

    /// Gradient with respect to the query point, given the direction from the
    /// query point toward the kernel center.
    pub fn gradient(&self, distance: f64, direction_to_center: DVec2) -> DVec2 {
        -self.first_derivative(distance) * direction_to_center
    }

    pub fn second_derivative(&self, distance: f64) -> f64 {
        let distance_squared = distance * distance;
        if distance_squared >= self.h2 {
            0.0
        } else {
            let x = distance_squared / self.h2;
            24.0 / (PI * self.h4) * (1.0 - x) * (5.0 * x - 1.0)
        }
    }
}

/// Spiky SPH kernel; its gradient does not vanish at the origin.
#[derive(Debug, Clone, Copy)]
pub struct SphSpikyKernel2 {
    pub h: f64,
    h2: f64,
    h3: f64,
    h4: f64,
}

impl SphSpikyKernel2 {
    pub fn new(kernel_radius: f64) -> Self {
        let h2 = kernel_radius * kernel_radius;
        Self {
            h: kernel_radius,
            h2,
            h3: h2 * kernel_radius,
            h4: h2 * h2,
        }
    }

    pub fn value(&self, distance: f64) -> f64 {
        if distance >= self.h {
            0.0
        } else {
            let x = 1.0 - distance / self.h;
            10.0 / (PI * self.h2) * x * x * x
        }
    }

    pub fn first_derivative(&self, distance: f64) -> f64 {
        if distance >= self.h {
            0.0
        } else {
            let x = 1.0 - distance / self.h;
            -30.0 / (PI * self.h3) * x * x
        }
    }

    pub fn gradient(&self, distance: f64, direction_to_center: DVec2) -> DVec2 {
        -self.first_derivative(distance) * direction_to_center
    }

    pub fn second_derivative(&self, distance: f64) -> f64 {
        if distance >= self.h {
            0.0
        } else {
            let x = 1.0 - distance / self.h;
            60.0 / (PI * self.h4) * x
        }
    }
}
