use glam::DVec2;

use crate::ray::Ray2;

/// Result of a ray / bounding-box intersection query.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBoxRayIntersection2 {
    pub is_intersecting: bool,
    /// Ray parameter of the near hit. `f64::MAX` when there is no hit.
    pub t_near: f64,
    /// Ray parameter of the far hit. `f64::MAX` when there is no hit.
    pub t_far: f64,
}

/// Axis-aligned 2D bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox2 {
    pub lower_corner: DVec2,
    pub upper_corner: DVec2,
}

impl BoundingBox2 {
    /// Create a box from two arbitrary corner points.
    pub fn new(point1: DVec2, point2: DVec2) -> Self {
        Self {
            lower_corner: point1.min(point2),
            upper_corner: point1.max(point2),
        }
    }

    /// An empty box, ready to be grown with [`merge_point`](Self::merge_point).
    pub fn empty() -> Self {
        Self {
            lower_corner: DVec2::splat(f64::MAX),
            upper_corner: DVec2::splat(-f64::MAX),
        }
    }

    pub fn width(&self) -> f64 {
        self.upper_corner.x - self.lower_corner.x
    }

    pub fn height(&self) -> f64 {
        self.upper_corner.y - self.lower_corner.y
    }

    pub fn mid_point(&self) -> DVec2 {
        0.5 * (self.lower_corner + self.upper_corner)
    }

    pub fn diagonal_length(&self) -> f64 {
        (self.upper_corner - self.lower_corner).length()
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.lower_corner.x
            && point.x <= self.upper_corner.x
            && point.y >= self.lower_corner.y
            && point.y <= self.upper_corner.y
    }

    /// Grow (or shrink, for negative `delta`) the box by `delta` on every side.
    pub fn expand(&mut self, delta: f64) {
        self.lower_corner -= DVec2::splat(delta);
        self.upper_corner += DVec2::splat(delta);
    }

    /// A copy of this box expanded by `delta` on every side.
    pub fn expanded(&self, delta: f64) -> Self {
        let mut result = *self;
        result.expand(delta);
        result
    }

    /// Extend the box to contain `point`.
    pub fn merge_point(&mut self, point: DVec2) {
        self.lower_corner = self.lower_corner.min(point);
        self.upper_corner = self.upper_corner.max(point);
    }

    /// Extend the box to contain `other`.
    pub fn merge(&mut self, other: &BoundingBox2) {
        self.lower_corner = self.lower_corner.min(other.lower_corner);
        self.upper_corner = self.upper_corner.max(other.upper_corner);
    }

    pub fn overlaps(&self, other: &BoundingBox2) -> bool {
        self.lower_corner.x <= other.upper_corner.x
            && self.upper_corner.x >= other.lower_corner.x
            && self.lower_corner.y <= other.upper_corner.y
            && self.upper_corner.y >= other.lower_corner.y
    }

    /// Corner `idx` in the order (lower, lower), (upper, lower),
    /// (lower, upper), (upper, upper).
    pub fn corner(&self, idx: usize) -> DVec2 {
        let x = if idx & 1 == 0 {
            self.lower_corner.x
        } else {
            self.upper_corner.x
        };
        let y = if idx & 2 == 0 {
            self.lower_corner.y
        } else {
            self.upper_corner.y
        };
        DVec2::new(x, y)
    }

    /// Clamp `point` to the box.
    pub fn clamp(&self, point: DVec2) -> DVec2 {
        point.clamp(self.lower_corner, self.upper_corner)
    }

    pub fn intersects(&self, ray: &Ray2) -> bool {
        self.closest_intersection(ray).is_intersecting
    }

    /// Slab-method ray intersection.
    pub fn closest_intersection(&self, ray: &Ray2) -> BoundingBoxRayIntersection2 {
        let mut t_min: f64 = 0.0;
        let mut t_max = f64::MAX;

        for axis in 0..2 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let inv_dir = 1.0 / dir;
            let mut t_near = (self.lower_corner[axis] - origin) * inv_dir;
            let mut t_far = (self.upper_corner[axis] - origin) * inv_dir;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            t_min = t_min.max(t_near);
            t_max = t_max.min(t_far);
            if t_min > t_max {
                return BoundingBoxRayIntersection2 {
                    is_intersecting: false,
                    t_near: f64::MAX,
                    t_far: f64::MAX,
                };
            }
        }

        BoundingBoxRayIntersection2 {
            is_intersecting: true,
            t_near: t_min,
            t_far: t_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalized() {
        let b = BoundingBox2::new(DVec2::new(1.0, -1.0), DVec2::new(-2.0, 3.0));
        assert_eq!(b.lower_corner, DVec2::new(-2.0, -1.0));
        assert_eq!(b.upper_corner, DVec2::new(1.0, 3.0));
        assert_eq!(b.width(), 3.0);
        assert_eq!(b.height(), 4.0);
        assert_eq!(b.mid_point(), DVec2::new(-0.5, 1.0));
    }

    #[test]
    fn expand_shrinks_with_negative_delta() {
        let mut b = BoundingBox2::new(DVec2::ZERO, DVec2::new(1.0, 2.0));
        b.expand(-0.25);
        assert_eq!(b.lower_corner, DVec2::new(0.25, 0.25));
        assert_eq!(b.upper_corner, DVec2::new(0.75, 1.75));
    }

    #[test]
    fn ray_hits_box() {
        let b = BoundingBox2::new(DVec2::ZERO, DVec2::new(1.0, 1.0));
        let hit = b.closest_intersection(&Ray2::new(DVec2::new(-1.0, 0.5), DVec2::X));
        assert!(hit.is_intersecting);
        assert!((hit.t_near - 1.0).abs() < 1e-12);
        assert!((hit.t_far - 2.0).abs() < 1e-12);

        let miss = b.closest_intersection(&Ray2::new(DVec2::new(-1.0, 2.5), DVec2::X));
        assert!(!miss.is_intersecting);
    }

    #[test]
    fn contains_is_inclusive() {
        let b = BoundingBox2::new(DVec2::ZERO, DVec2::new(1.0, 1.0));
        assert!(b.contains(DVec2::new(0.0, 1.0)));
        assert!(!b.contains(DVec2::new(0.0, 1.0 + 1e-9)));
    }
}
