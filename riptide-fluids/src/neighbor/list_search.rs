use glam::{DVec2, DVec3};

use super::{PointNeighborSearch2, PointNeighborSearch3};

/// Brute-force neighbor search; no acceleration structure.
///
/// Useful as a reference implementation and for tiny point sets where a grid
/// is not worth building.
#[derive(Debug, Clone, Default)]
pub struct PointListSearch2 {
    points: Vec<DVec2>,
}

impl PointListSearch2 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointNeighborSearch2 for PointListSearch2 {
    fn build(&mut self, points: &[DVec2]) {
        self.points = points.to_vec();
    }

    fn for_each_nearby_point(
        &self,
        origin: DVec2,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec2),
    ) {
        let radius_squared = radius * radius;
        for (i, &point) in self.points.iter().enumerate() {
            if point.distance_squared(origin) <= radius_squared {
                callback(i, point);
            }
        }
    }

    fn has_nearby_point(&self, origin: DVec2, radius: f64) -> bool {
        let radius_squared = radius * radius;
        self.points
            .iter()
            .any(|p| p.distance_squared(origin) <= radius_squared)
    }

    fn clone_search(&self) -> Box<dyn PointNeighborSearch2> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PointListSearch3 {
    points: Vec<DVec3>,
}

impl PointListSearch3 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PointNeighborSearch3 for PointListSearch3 {
    fn build(&mut self, points: &[DVec3]) {
        self.points = points.to_vec();
    }

    fn for_each_nearby_point(
        &self,
        origin: DVec3,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec3),
    ) {
        let radius_squared = radius * radius;
        for (i, &point) in self.points.iter().enumerate() {
            if point.distance_squared(origin) <= radius_squared {
                callback(i, point);
            }
        }
    }

    fn has_nearby_point(&self, origin: DVec3, radius: f64) -> bool {
        let radius_squared = radius * radius;
        self.points
            .iter()
            .any(|p| p.distance_squared(origin) <= radius_squared)
    }

    fn clone_search(&self) -> Box<dyn PointNeighborSearch3> {
        Box::new(self.clone())
    }
}
