use glam::DVec2;

use crate::bounding_box::BoundingBox2;
use crate::ray::Ray2;
use crate::surface::{Surface2, SurfaceRayIntersection2};

/// An axis-aligned 2D box surface.
///
/// With `is_normal_flipped` set the reported normals point into the box, which
/// turns it into a container: a collider built from a flipped box keeps
/// particles inside the bounds instead of outside of them.
pub struct Box2 {
    pub bound: BoundingBox2,
    pub is_normal_flipped: bool,
}

impl Box2 {
    pub fn new(bound: BoundingBox2) -> Self {
        Self {
            bound,
            is_normal_flipped: false,
        }
    }

    pub fn with_flipped_normal(mut self) -> Self {
        self.is_normal_flipped = true;
        self
    }

    fn orient(&self, normal: DVec2) -> DVec2 {
        if self.is_normal_flipped {
            -normal
        } else {
            normal
        }
    }

    /// Closest boundary point and outward face normal, handling interior
    /// queries by snapping to the nearest face.
    fn closest_boundary(&self, point: DVec2) -> (DVec2, DVec2) {
        let lower = self.bound.lower_corner;
        let upper = self.bound.upper_corner;

        if !self.bound.contains(point) {
            let clamped = self.bound.clamp(point);
            let offset = point - clamped;
            let normal = if offset.length_squared() > 0.0 {
                offset.normalize()
            } else {
                DVec2::Y
            };
            return (clamped, normal);
        }

        // Interior: snap to the nearest of the four faces.
        let face_distances = [
            (point.x - lower.x, DVec2::new(-1.0, 0.0)),
            (upper.x - point.x, DVec2::new(1.0, 0.0)),
            (point.y - lower.y, DVec2::new(0.0, -1.0)),
            (upper.y - point.y, DVec2::new(0.0, 1.0)),
        ];
        let (_, normal) = face_distances
            .iter()
            .copied()
            .fold(face_distances[0], |best, candidate| {
                if candidate.0 < best.0 {
                    candidate
                } else {
                    best
                }
            });
        let closest = if normal.x < 0.0 {
            DVec2::new(lower.x, point.y)
        } else if normal.x > 0.0 {
            DVec2::new(upper.x, point.y)
        } else if normal.y < 0.0 {
            DVec2::new(point.x, lower.y)
        } else {
            DVec2::new(point.x, upper.y)
        };
        (closest, normal)
    }
}

impl Surface2 for Box2 {
    fn closest_point(&self, other_point: DVec2) -> DVec2 {
        self.closest_boundary(other_point).0
    }

    fn closest_normal(&self, other_point: DVec2) -> DVec2 {
        self.orient(self.closest_boundary(other_point).1)
    }

    fn closest_intersection(&self, ray: &Ray2) -> SurfaceRayIntersection2 {
        let hit = self.bound.closest_intersection(ray);
        if !hit.is_intersecting {
            return SurfaceRayIntersection2::default();
        }

        let point = ray.point_at(hit.t_near);
        let eps = 1e-9 * (1.0 + self.bound.diagonal_length());
        let normal = if (point.x - self.bound.lower_corner.x).abs() < eps {
            DVec2::new(-1.0, 0.0)
        } else if (point.x - self.bound.upper_corner.x).abs() < eps {
            DVec2::new(1.0, 0.0)
        } else if (point.y - self.bound.lower_corner.y).abs() < eps {
            DVec2::new(0.0, -1.0)
        } else {
            DVec2::new(0.0, 1.0)
        };

        SurfaceRayIntersection2 {
            is_intersecting: true,
            distance: hit.t_near,
            point,
            normal: self.orient(normal),
        }
    }

    fn bounding_box(&self) -> BoundingBox2 {
        self.bound
    }
}
