use glam::{DVec2, DVec3, I64Vec2, I64Vec3};

use super::{
    hash_key_from_position2, hash_key_from_position3, nearby_keys2, nearby_keys3,
    PointNeighborSearch2, PointNeighborSearch3,
};

/// Serial hash-grid neighbor search with per-bucket index lists.
///
/// Unlike the parallel variant this one supports O(1) amortized [`add`],
/// which the volume emitter relies on while accepting candidates.
///
/// [`add`]: PointHashGridSearch2::add
#[derive(Debug, Clone)]
pub struct PointHashGridSearch2 {
    grid_spacing: f64,
    resolution: I64Vec2,
    points: Vec<DVec2>,
    buckets: Vec<Vec<usize>>,
}

impl PointHashGridSearch2 {
    pub fn new(resolution_x: usize, resolution_y: usize, grid_spacing: f64) -> Self {
        let resolution = I64Vec2::new(resolution_x.max(1) as i64, resolution_y.max(1) as i64);
        Self {
            grid_spacing,
            resolution,
            points: Vec::new(),
            buckets: vec![Vec::new(); (resolution.x * resolution.y) as usize],
        }
    }

    /// Append a point without rebuilding.
    pub fn add(&mut self, point: DVec2) {
        let index = self.points.len();
        self.points.push(point);
        let key = hash_key_from_position2(point, self.grid_spacing, self.resolution);
        self.buckets[key].push(index);
    }

    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }
}

impl PointNeighborSearch2 for PointHashGridSearch2 {
    fn build(&mut self, points: &[DVec2]) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.points.clear();
        self.points.reserve(points.len());
        for &point in points {
            self.add(point);
        }
    }

    fn for_each_nearby_point(
        &self,
        origin: DVec2,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec2),
    ) {
        let keys = nearby_keys2(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in keys {
            for &i in &self.buckets[key] {
                let point = self.points[i];
                if point.distance_squared(origin) <= radius_squared {
                    callback(i, point);
                }
            }
        }
    }

    fn has_nearby_point(&self, origin: DVec2, radius: f64) -> bool {
        let keys = nearby_keys2(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in keys {
            for &i in &self.buckets[key] {
                if self.points[i].distance_squared(origin) <= radius_squared {
                    return true;
                }
            }
        }
        false
    }

    fn clone_search(&self) -> Box<dyn PointNeighborSearch2> {
        Box::new(self.clone())
    }
}

/// 3D serial hash-grid neighbor search.
#[derive(Debug, Clone)]
pub struct PointHashGridSearch3 {
    grid_spacing: f64,
    resolution: I64Vec3,
    points: Vec<DVec3>,
    buckets: Vec<Vec<usize>>,
}

impl PointHashGridSearch3 {
    pub fn new(
        resolution_x: usize,
        resolution_y: usize,
        resolution_z: usize,
        grid_spacing: f64,
    ) -> Self {
        let resolution = I64Vec3::new(
            resolution_x.max(1) as i64,
            resolution_y.max(1) as i64,
            resolution_z.max(1) as i64,
        );
        Self {
            grid_spacing,
            resolution,
            points: Vec::new(),
            buckets: vec![Vec::new(); (resolution.x * resolution.y * resolution.z) as usize],
        }
    }

    pub fn add(&mut self, point: DVec3) {
        let index = self.points.len();
        self.points.push(point);
        let key = hash_key_from_position3(point, self.grid_spacing, self.resolution);
        self.buckets[key].push(index);
    }
}

impl PointNeighborSearch3 for PointHashGridSearch3 {
    fn build(&mut self, points: &[DVec3]) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.points.clear();
        self.points.reserve(points.len());
        for &point in points {
            self.add(point);
        }
    }

    fn for_each_nearby_point(
        &self,
        origin: DVec3,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec3),
    ) {
        let keys = nearby_keys3(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in keys {
            for &i in &self.buckets[key] {
                let point = self.points[i];
                if point.distance_squared(origin) <= radius_squared {
                    callback(i, point);
                }
            }
        }
    }

    fn has_nearby_point(&self, origin: DVec3, radius: f64) -> bool {
        let keys = nearby_keys3(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in keys {
            for &i in &self.buckets[key] {
                if self.points[i].distance_squared(origin) <= radius_squared {
                    return true;
                }
            }
        }
        false
    }

    fn clone_search(&self) -> Box<dyn PointNeighborSearch3> {
        Box::new(self.clone())
    }
}
