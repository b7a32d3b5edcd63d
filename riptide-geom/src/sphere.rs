use glam::DVec2;

use crate::bounding_box::BoundingBox2;
use crate::ray::Ray2;
use crate::surface::{Surface2, SurfaceRayIntersection2};

/// A 2D sphere (circle).
pub struct Sphere2 {
    pub center: DVec2,
    pub radius: f64,
    pub is_normal_flipped: bool,
}

impl Sphere2 {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self {
            center,
            radius,
            is_normal_flipped: false,
        }
    }

    pub fn with_flipped_normal(mut self) -> Self {
        self.is_normal_flipped = true;
        self
    }

    fn outward_normal(&self, other_point: DVec2) -> DVec2 {
        let r = other_point - self.center;
        if r.length_squared() > 0.0 {
            r.normalize()
        } else {
            DVec2::X
        }
    }
}

impl Surface2 for Sphere2 {
    fn closest_point(&self, other_point: DVec2) -> DVec2 {
        self.center + self.radius * self.outward_normal(other_point)
    }

    fn closest_normal(&self, other_point: DVec2) -> DVec2 {
        let normal = self.outward_normal(other_point);
        if self.is_normal_flipped {
            -normal
        } else {
            normal
        }
    }

    fn closest_distance(&self, other_point: DVec2) -> f64 {
        (other_point.distance(self.center) - self.radius).abs()
    }

    fn closest_intersection(&self, ray: &Ray2) -> SurfaceRayIntersection2 {
        let r = ray.origin - self.center;
        let b = r.dot(ray.direction);
        let c = r.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return SurfaceRayIntersection2::default();
        }

        let sqrt_d = discriminant.sqrt();
        let mut t = -b - sqrt_d;
        if t < 0.0 {
            t = -b + sqrt_d;
        }
        if t < 0.0 {
            return SurfaceRayIntersection2::default();
        }

        let point = ray.point_at(t);
        SurfaceRayIntersection2 {
            is_intersecting: true,
            distance: t,
            point,
            normal: self.closest_normal(point),
        }
    }

    fn bounding_box(&self) -> BoundingBox2 {
        let r = DVec2::splat(self.radius);
        BoundingBox2::new(self.center - r, self.center + r)
    }
}
