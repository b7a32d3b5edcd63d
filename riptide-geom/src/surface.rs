use glam::DVec2;

use crate::bounding_box::BoundingBox2;
use crate::ray::Ray2;

/// Result of a ray / surface intersection query.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceRayIntersection2 {
    pub is_intersecting: bool,
    /// Ray parameter of the hit. `f64::MAX` when there is no hit.
    pub distance: f64,
    pub point: DVec2,
    pub normal: DVec2,
}

impl Default for SurfaceRayIntersection2 {
    fn default() -> Self {
        Self {
            is_intersecting: false,
            distance: f64::MAX,
            point: DVec2::ZERO,
            normal: DVec2::X,
        }
    }
}

/// Capability set every 2D surface exposes to colliders and emitters.
///
/// Implementations report *outward* normals unless constructed with their
/// normal-flip flag set, in which case every reported normal (and therefore
/// the inside test) is reversed.
pub trait Surface2: Send + Sync {
    /// The point on the surface closest to `other_point`.
    fn closest_point(&self, other_point: DVec2) -> DVec2;

    /// Surface normal at the point closest to `other_point`.
    fn closest_normal(&self, other_point: DVec2) -> DVec2;

    fn closest_intersection(&self, ray: &Ray2) -> SurfaceRayIntersection2;

    fn bounding_box(&self) -> BoundingBox2;

    /// Unsigned distance from `other_point` to the surface.
    fn closest_distance(&self, other_point: DVec2) -> f64 {
        other_point.distance(self.closest_point(other_point))
    }

    fn intersects(&self, ray: &Ray2) -> bool {
        self.closest_intersection(ray).is_intersecting
    }

    /// True when `other_point` lies on the opposite side of the surface from
    /// its reported normal.
    fn is_inside(&self, other_point: DVec2) -> bool {
        let closest = self.closest_point(other_point);
        let normal = self.closest_normal(other_point);
        (other_point - closest).dot(normal) < 0.0
    }
}

/// A surface that can also report a signed distance (negative inside).
pub trait ImplicitSurface2: Surface2 {
    fn signed_distance(&self, other_point: DVec2) -> f64;
}

/// Adapter that turns any explicit [`Surface2`] into an implicit one by
/// signing its closest distance with the inside test.
pub struct SurfaceToImplicit2 {
    surface: Box<dyn Surface2>,
}

impl SurfaceToImplicit2 {
    pub fn new(surface: Box<dyn Surface2>) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &dyn Surface2 {
        self.surface.as_ref()
    }
}

impl Surface2 for SurfaceToImplicit2 {
    fn closest_point(&self, other_point: DVec2) -> DVec2 {
        self.surface.closest_point(other_point)
    }

    fn closest_normal(&self, other_point: DVec2) -> DVec2 {
        self.surface.closest_normal(other_point)
    }

    fn closest_intersection(&self, ray: &Ray2) -> SurfaceRayIntersection2 {
        self.surface.closest_intersection(ray)
    }

    fn bounding_box(&self) -> BoundingBox2 {
        self.surface.bounding_box()
    }

    fn closest_distance(&self, other_point: DVec2) -> f64 {
        self.surface.closest_distance(other_point)
    }

    fn is_inside(&self, other_point: DVec2) -> bool {
        self.surface.is_inside(other_point)
    }
}

impl ImplicitSurface2 for SurfaceToImplicit2 {
    fn signed_distance(&self, other_point: DVec2) -> f64 {
        let distance = self.surface.closest_distance(other_point);
        if self.surface.is_inside(other_point) {
            -distance
        } else {
            distance
        }
    }
}
