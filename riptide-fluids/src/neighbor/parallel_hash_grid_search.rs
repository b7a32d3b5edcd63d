use glam::{DVec2, DVec3, I64Vec2, I64Vec3};
use rayon::prelude::*;

use super::{
    hash_key_from_position2, hash_key_from_position3, nearby_keys2, nearby_keys3,
    PointNeighborSearch2, PointNeighborSearch3,
};

/// Marks an empty bucket in the start/end index tables.
pub const EMPTY_BUCKET: usize = usize::MAX;

/// Parallel hash-grid neighbor search.
///
/// Instead of per-bucket lists, points are kept in a single flat array sorted
/// by hash key, with per-bucket `[start, end)` ranges in two parallel tables
/// (`EMPTY_BUCKET` marks unused buckets). `sorted_indices[i]` recovers the
/// pre-sort index of the i-th stored point, and is what queries report.
#[derive(Debug, Clone)]
pub struct PointParallelHashGridSearch2 {
    grid_spacing: f64,
    resolution: I64Vec2,
    points: Vec<DVec2>,
    keys: Vec<usize>,
    start_index_table: Vec<usize>,
    end_index_table: Vec<usize>,
    sorted_indices: Vec<usize>,
}

impl PointParallelHashGridSearch2 {
    pub fn new(resolution_x: usize, resolution_y: usize, grid_spacing: f64) -> Self {
        let resolution = I64Vec2::new(resolution_x.max(1) as i64, resolution_y.max(1) as i64);
        let table_size = (resolution.x * resolution.y) as usize;
        Self {
            grid_spacing,
            resolution,
            points: Vec::new(),
            keys: Vec::new(),
            start_index_table: vec![EMPTY_BUCKET; table_size],
            end_index_table: vec![EMPTY_BUCKET; table_size],
            sorted_indices: Vec::new(),
        }
    }

    /// Hash keys of the stored points, in sorted order.
    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    pub fn start_index_table(&self) -> &[usize] {
        &self.start_index_table
    }

    pub fn end_index_table(&self) -> &[usize] {
        &self.end_index_table
    }

    /// Permutation mapping sorted storage order back to input order.
    pub fn sorted_indices(&self) -> &[usize] {
        &self.sorted_indices
    }

    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }
}

impl PointNeighborSearch2 for PointParallelHashGridSearch2 {
    fn build(&mut self, points: &[DVec2]) {
        let num_points = points.len();
        let table_size = (self.resolution.x * self.resolution.y) as usize;

        self.points.clear();
        self.keys.clear();
        self.sorted_indices.clear();
        self.start_index_table.clear();
        self.start_index_table.resize(table_size, EMPTY_BUCKET);
        self.end_index_table.clear();
        self.end_index_table.resize(table_size, EMPTY_BUCKET);

        if num_points == 0 {
            return;
        }

        let grid_spacing = self.grid_spacing;
        let resolution = self.resolution;

        // Pass 1: hash every point.
        let temp_keys: Vec<usize> = points
            .par_iter()
            .map(|&p| hash_key_from_position2(p, grid_spacing, resolution))
            .collect();

        // Pass 2: stable-sort an index permutation by key.
        let mut sorted_indices: Vec<usize> = (0..num_points).collect();
        sorted_indices.par_sort_by_key(|&i| temp_keys[i]);

        // Pass 3: gather points and keys into key-sorted order.
        self.points = sorted_indices.par_iter().map(|&i| points[i]).collect();
        self.keys = sorted_indices.par_iter().map(|&i| temp_keys[i]).collect();
        self.sorted_indices = sorted_indices;

        // Pass 4: bucket ranges from key change points. The writes are
        // scattered by key value, so this stays serial.
        self.start_index_table[self.keys[0]] = 0;
        self.end_index_table[self.keys[num_points - 1]] = num_points;
        for i in 1..num_points {
            if self.keys[i] > self.keys[i - 1] {
                self.start_index_table[self.keys[i]] = i;
                self.end_index_table[self.keys[i - 1]] = i;
            }
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let mut non_empty = 0usize;
            let mut max_per_bucket = 0usize;
            for (start, end) in self.start_index_table.iter().zip(&self.end_index_table) {
                if *start != EMPTY_BUCKET {
                    non_empty += 1;
                    max_per_bucket = max_per_bucket.max(end - start);
                }
            }
            tracing::debug!(
                points = num_points,
                non_empty_buckets = non_empty,
                max_points_per_bucket = max_per_bucket,
                "built parallel hash grid"
            );
        }
    }

    fn for_each_nearby_point(
        &self,
        origin: DVec2,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec2),
    ) {
        let nearby_keys = nearby_keys2(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in nearby_keys {
            let start = self.start_index_table[key];
            if start == EMPTY_BUCKET {
                continue;
            }
            let end = self.end_index_table[key];

            for j in start..end {
                let point = self.points[j];
                if point.distance_squared(origin) <= radius_squared {
                    callback(self.sorted_indices[j], point);
                }
            }
        }
    }

    fn has_nearby_point(&self, origin: DVec2, radius: f64) -> bool {
        let nearby_keys = nearby_keys2(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in nearby_keys {
            let start = self.start_index_table[key];
            if start == EMPTY_BUCKET {
                continue;
            }
            let end = self.end_index_table[key];

            for j in start..end {
                if self.points[j].distance_squared(origin) <= radius_squared {
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

/// 3D parallel hash-grid neighbor search.
#[derive(Debug, Clone)]
pub struct PointParallelHashGridSearch3 {
    grid_spacing: f64,
    resolution: I64Vec3,
    points: Vec<DVec3>,
    keys: Vec<usize>,
    start_index_table: Vec<usize>,
    end_index_table: Vec<usize>,
    sorted_indices: Vec<usize>,
}

impl PointParallelHashGridSearch3 {
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
        let table_size = (resolution.x * resolution.y * resolution.z) as usize;
        Self {
            grid_spacing,
            resolution,
            points: Vec::new(),
            keys: Vec::new(),
            start_index_table: vec![EMPTY_BUCKET; table_size],
            end_index_table: vec![EMPTY_BUCKET; table_size],
            sorted_indices: Vec::new(),
        }
    }

    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    pub fn start_index_table(&self) -> &[usize] {
        &self.start_index_table
    }

    pub fn end_index_table(&self) -> &[usize] {
        &self.end_index_table
    }

    pub fn sorted_indices(&self) -> &[usize] {
        &self.sorted_indices
    }
}

impl PointNeighborSearch3 for PointParallelHashGridSearch3 {
    fn build(&mut self, points: &[DVec3]) {
        let num_points = points.len();
        let table_size = (self.resolution.x * self.resolution.y * self.resolution.z) as usize;

        self.points.clear();
        self.keys.clear();
        self.sorted_indices.clear();
        self.start_index_table.clear();
        self.start_index_table.resize(table_size, EMPTY_BUCKET);
        self.end_index_table.clear();
        self.end_index_table.resize(table_size, EMPTY_BUCKET);

        if num_points == 0 {
            return;
        }

        let grid_spacing = self.grid_spacing;
        let resolution = self.resolution;

        let temp_keys: Vec<usize> = points
            .par_iter()
            .map(|&p| hash_key_from_position3(p, grid_spacing, resolution))
            .collect();

        let mut sorted_indices: Vec<usize> = (0..num_points).collect();
        sorted_indices.par_sort_by_key(|&i| temp_keys[i]);

        self.points = sorted_indices.par_iter().map(|&i| points[i]).collect();
        self.keys = sorted_indices.par_iter().map(|&i| temp_keys[i]).collect();
        self.sorted_indices = sorted_indices;

        self.start_index_table[self.keys[0]] = 0;
        self.end_index_table[self.keys[num_points - 1]] = num_points;
        for i in 1..num_points {
            if self.keys[i] > self.keys[i - 1] {
                self.start_index_table[self.keys[i]] = i;
                self.end_index_table[self.keys[i - 1]] = i;
            }
        }
    }

    fn for_each_nearby_point(
        &self,
        origin: DVec3,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec3),
    ) {
        let nearby_keys = nearby_keys3(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in nearby_keys {
            let start = self.start_index_table[key];
            if start == EMPTY_BUCKET {
                continue;
            }
            let end = self.end_index_table[key];

            for j in start..end {
                let point = self.points[j];
                if point.distance_squared(origin) <= radius_squared {
                    callback(self.sorted_indices[j], point);
                }
            }
        }
    }

    fn has_nearby_point(&self, origin: DVec3, radius: f64) -> bool {
        let nearby_keys = nearby_keys3(origin, self.grid_spacing, self.resolution);
        let radius_squared = radius * radius;

        for key in nearby_keys {
            let start = self.start_index_table[key];
            if start == EMPTY_BUCKET {
                continue;
            }
            let end = self.end_index_table[key];

            for j in start..end {
                if self.points[j].distance_squared(origin) <= radius_squared {
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
