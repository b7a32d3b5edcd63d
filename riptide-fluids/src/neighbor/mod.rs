//! Spatial neighbor searches over point sets.
//!
//! Three variants per dimension: a brute-force list search, a serial hash
//! grid with O(1) incremental insertion, and a parallel hash grid that keeps
//! its points in key-sorted flat arrays.
//!
//! All hash-grid variants share the same scheme: bucket index
//! `floor(position / grid_spacing)` per axis (negative buckets allowed),
//! wrapped modulo the grid resolution, then linearized row-major. The
//! contract is lenient: grid spacing must be at least twice the query
//! radius, and violating that silently misses distant neighbors.

pub mod hash_grid_search;
pub mod list_search;
pub mod parallel_hash_grid_search;

pub use hash_grid_search::{PointHashGridSearch2, PointHashGridSearch3};
pub use list_search::{PointListSearch2, PointListSearch3};
pub use parallel_hash_grid_search::{PointParallelHashGridSearch2, PointParallelHashGridSearch3};

use glam::{DVec2, DVec3, I64Vec2, I64Vec3};

/// Radius search over a 2D point set.
///
/// `build` replaces any prior state. Callback order in
/// `for_each_nearby_point` is unspecified.
pub trait PointNeighborSearch2: Send + Sync {
    fn build(&mut self, points: &[DVec2]);

    /// Invoke `callback(index, position)` for every point within `radius` of
    /// `origin` (inclusive).
    fn for_each_nearby_point(
        &self,
        origin: DVec2,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec2),
    );

    fn has_nearby_point(&self, origin: DVec2, radius: f64) -> bool;

    fn clone_search(&self) -> Box<dyn PointNeighborSearch2>;
}

/// Radius search over a 3D point set.
pub trait PointNeighborSearch3: Send + Sync {
    fn build(&mut self, points: &[DVec3]);

    fn for_each_nearby_point(
        &self,
        origin: DVec3,
        radius: f64,
        callback: &mut dyn FnMut(usize, DVec3),
    );

    fn has_nearby_point(&self, origin: DVec3, radius: f64) -> bool;

    fn clone_search(&self) -> Box<dyn PointNeighborSearch3>;
}

pub(crate) fn bucket_index2(position: DVec2, grid_spacing: f64) -> I64Vec2 {
    I64Vec2::new(
        (position.x / grid_spacing).floor() as i64,
        (position.y / grid_spacing).floor() as i64,
    )
}

pub(crate) fn hash_key_from_bucket_index2(bucket_index: I64Vec2, resolution: I64Vec2) -> usize {
    let mut wrapped = I64Vec2::new(
        bucket_index.x % resolution.x,
        bucket_index.y % resolution.y,
    );
    if wrapped.x < 0 {
        wrapped.x += resolution.x;
    }
    if wrapped.y < 0 {
        wrapped.y += resolution.y;
    }
    (wrapped.y * resolution.x + wrapped.x) as usize
}

pub(crate) fn hash_key_from_position2(
    position: DVec2,
    grid_spacing: f64,
    resolution: I64Vec2,
) -> usize {
    hash_key_from_bucket_index2(bucket_index2(position, grid_spacing), resolution)
}

/// The query bucket plus the three adjacent buckets selected by comparing
/// the query position with the bucket midpoint on each axis.
pub(crate) fn nearby_keys2(
    position: DVec2,
    grid_spacing: f64,
    resolution: I64Vec2,
) -> [usize; 4] {
    let origin_index = bucket_index2(position, grid_spacing);
    let mut nearby = [origin_index; 4];

    if (origin_index.x as f64 + 0.5) * grid_spacing <= position.x {
        nearby[2].x += 1;
        nearby[3].x += 1;
    } else {
        nearby[2].x -= 1;
        nearby[3].x -= 1;
    }

    if (origin_index.y as f64 + 0.5) * grid_spacing <= position.y {
        nearby[1].y += 1;
        nearby[3].y += 1;
    } else {
        nearby[1].y -= 1;
        nearby[3].y -= 1;
    }

    nearby.map(|index| hash_key_from_bucket_index2(index, resolution))
}

pub(crate) fn bucket_index3(position: DVec3, grid_spacing: f64) -> I64Vec3 {
    I64Vec3::new(
        (position.x / grid_spacing).floor() as i64,
        (position.y / grid_spacing).floor() as i64,
        (position.z / grid_spacing).floor() as i64,
    )
}

pub(crate) fn hash_key_from_bucket_index3(bucket_index: I64Vec3, resolution: I64Vec3) -> usize {
    let mut wrapped = I64Vec3::new(
        bucket_index.x % resolution.x,
        bucket_index.y % resolution.y,
        bucket_index.z % resolution.z,
    );
    if wrapped.x < 0 {
        wrapped.x += resolution.x;
    }
    if wrapped.y < 0 {
        wrapped.y += resolution.y;
    }
    if wrapped.z < 0 {
        wrapped.z += resolution.z;
    }
    ((wrapped.z * resolution.y + wrapped.y) * resolution.x + wrapped.x) as usize
}

pub(crate) fn hash_key_from_position3(
    position: DVec3,
    grid_spacing: f64,
    resolution: I64Vec3,
) -> usize {
    hash_key_from_bucket_index3(bucket_index3(position, grid_spacing), resolution)
}

/// The query bucket plus the seven adjacent buckets selected per axis.
pub(crate) fn nearby_keys3(
    position: DVec3,
    grid_spacing: f64,
    resolution: I64Vec3,
) -> [usize; 8] {
    let origin_index = bucket_index3(position, grid_spacing);
    let mut nearby = [origin_index; 8];

    let offset_x =
        if (origin_index.x as f64 + 0.5) * grid_spacing <= position.x { 1 } else { -1 };
    let offset_y =
        if (origin_index.y as f64 + 0.5) * grid_spacing <= position.y { 1 } else { -1 };
    let offset_z =
        if (origin_index.z as f64 + 0.5) * grid_spacing <= position.z { 1 } else { -1 };

    for (i, index) in nearby.iter_mut().enumerate() {
        if i & 4 != 0 {
            index.x += offset_x;
        }
        if i & 2 != 0 {
            index.y += offset_y;
        }
        if i & 1 != 0 {
            index.z += offset_z;
        }
    }

    nearby.map(|index| hash_key_from_bucket_index3(index, resolution))
}
