use glam::DVec2;

/// A 2D ray with normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray2 {
    pub origin: DVec2,
    pub direction: DVec2,
}

impl Ray2 {
    /// Create a ray from an origin and a (not necessarily normalized)
    /// direction. A zero direction falls back to +x.
    pub fn new(origin: DVec2, direction: DVec2) -> Self {
        let direction = if direction.length_squared() > 0.0 {
            direction.normalize()
        } else {
            DVec2::X
        };
        Self { origin, direction }
    }

    /// Point on the ray at parameter `t`.
    pub fn point_at(&self, t: f64) -> DVec2 {
        self.origin + t * self.direction
    }
}

impl Default for Ray2 {
    fn default() -> Self {
        Self {
            origin: DVec2::ZERO,
            direction: DVec2::X,
        }
    }
}
