use glam::DVec2;

use crate::bounding_box::BoundingBox2;
use crate::ray::Ray2;
use crate::surface::{Surface2, SurfaceRayIntersection2};

/// An infinite 2D plane (a line) defined by a normal and a point on it.
pub struct Plane2 {
    pub normal: DVec2,
    pub point: DVec2,
    pub is_normal_flipped: bool,
}

impl Plane2 {
    pub fn new(normal: DVec2, point: DVec2) -> Self {
        Self {
            normal: normal.normalize(),
            point,
            is_normal_flipped: false,
        }
    }

    pub fn with_flipped_normal(mut self) -> Self {
        self.is_normal_flipped = true;
        self
    }

    fn oriented_normal(&self) -> DVec2 {
        if self.is_normal_flipped {
            -self.normal
        } else {
            self.normal
        }
    }
}

impl Surface2 for Plane2 {
    fn closest_point(&self, other_point: DVec2) -> DVec2 {
        let r = other_point - self.point;
        other_point - self.normal.dot(r) * self.normal
    }

    fn closest_normal(&self, _other_point: DVec2) -> DVec2 {
        self.oriented_normal()
    }

    fn closest_distance(&self, other_point: DVec2) -> f64 {
        self.normal.dot(other_point - self.point).abs()
    }

    fn closest_intersection(&self, ray: &Ray2) -> SurfaceRayIntersection2 {
        let d_dot_n = ray.direction.dot(self.normal);
        if d_dot_n.abs() < f64::EPSILON {
            return SurfaceRayIntersection2::default();
        }

        let t = self.normal.dot(self.point - ray.origin) / d_dot_n;
        if t < 0.0 {
            return SurfaceRayIntersection2::default();
        }

        SurfaceRayIntersection2 {
            is_intersecting: true,
            distance: t,
            point: ray.point_at(t),
            normal: self.oriented_normal(),
        }
    }

    fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::new(DVec2::splat(-f64::MAX), DVec2::splat(f64::MAX))
    }
}
