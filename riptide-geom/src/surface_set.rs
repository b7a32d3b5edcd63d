use glam::DVec2;

use crate::bounding_box::BoundingBox2;
use crate::ray::Ray2;
use crate::surface::{
    ImplicitSurface2, Surface2, SurfaceRayIntersection2, SurfaceToImplicit2,
};

/// A union of implicit surfaces. Queries return the member with the smallest
/// distance; the signed distance is the minimum over all members.
#[derive(Default)]
pub struct ImplicitSurfaceSet2 {
    surfaces: Vec<Box<dyn ImplicitSurface2>>,
}

impl ImplicitSurfaceSet2 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number_of_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn add_surface(&mut self, surface: Box<dyn ImplicitSurface2>) {
        self.surfaces.push(surface);
    }

    /// Wrap an explicit surface and add it to the set.
    pub fn add_explicit_surface(&mut self, surface: Box<dyn Surface2>) {
        self.surfaces
            .push(Box::new(SurfaceToImplicit2::new(surface)));
    }
}

impl Surface2 for ImplicitSurfaceSet2 {
    fn closest_point(&self, other_point: DVec2) -> DVec2 {
        let mut result = DVec2::splat(f64::MAX);
        let mut min_distance = f64::MAX;
        for surface in &self.surfaces {
            let distance = surface.closest_distance(other_point);
            if distance < min_distance {
                result = surface.closest_point(other_point);
                min_distance = distance;
            }
        }
        result
    }

    fn closest_normal(&self, other_point: DVec2) -> DVec2 {
        let mut result = DVec2::X;
        let mut min_distance = f64::MAX;
        for surface in &self.surfaces {
            let distance = surface.closest_distance(other_point);
            if distance < min_distance {
                result = surface.closest_normal(other_point);
                min_distance = distance;
            }
        }
        result
    }

    fn closest_distance(&self, other_point: DVec2) -> f64 {
        self.surfaces
            .iter()
            .map(|s| s.closest_distance(other_point))
            .fold(f64::MAX, f64::min)
    }

    fn closest_intersection(&self, ray: &Ray2) -> SurfaceRayIntersection2 {
        let mut best = SurfaceRayIntersection2::default();
        for surface in &self.surfaces {
            let hit = surface.closest_intersection(ray);
            if hit.is_intersecting && hit.distance < best.distance {
                best = hit;
            }
        }
        best
    }

    fn intersects(&self, ray: &Ray2) -> bool {
        self.surfaces.iter().any(|s| s.intersects(ray))
    }

    fn bounding_box(&self) -> BoundingBox2 {
        let mut result = BoundingBox2::empty();
        for surface in &self.surfaces {
            result.merge(&surface.bounding_box());
        }
        result
    }
}

impl ImplicitSurface2 for ImplicitSurfaceSet2 {
    fn signed_distance(&self, other_point: DVec2) -> f64 {
        self.surfaces
            .iter()
            .map(|s| s.signed_distance(other_point))
            .fold(f64::MAX, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane2;
    use crate::sphere::Sphere2;

    #[test]
    fn signed_distance_takes_minimum() {
        let mut set = ImplicitSurfaceSet2::new();
        set.add_explicit_surface(Box::new(Plane2::new(DVec2::Y, DVec2::new(0.0, 1.0))));
        set.add_explicit_surface(Box::new(Sphere2::new(DVec2::new(0.0, 4.0), 1.0)));

        // Below the plane: inside the half-space.
        assert!(set.signed_distance(DVec2::new(0.0, 0.5)) < 0.0);
        // Between the plane and the sphere, closer to the sphere shell.
        let d = set.signed_distance(DVec2::new(0.0, 2.5));
        assert!((d - 0.5).abs() < 1e-12);
        // Inside the sphere.
        assert!(set.signed_distance(DVec2::new(0.0, 4.2)) < 0.0);
    }

    #[test]
    fn closest_queries_pick_nearest_member() {
        let mut set = ImplicitSurfaceSet2::new();
        set.add_explicit_surface(Box::new(Plane2::new(DVec2::Y, DVec2::ZERO)));
        set.add_explicit_surface(Box::new(Sphere2::new(DVec2::new(0.0, 10.0), 1.0)));

        assert_eq!(set.closest_point(DVec2::new(3.0, 1.0)), DVec2::new(3.0, 0.0));
        assert_eq!(set.closest_normal(DVec2::new(0.0, 9.5)), DVec2::new(0.0, -1.0));
    }
}
