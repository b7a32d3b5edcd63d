use glam::DVec2;

use crate::bounding_box::BoundingBox2;

/// Enumerates lattice points inside a bounding region at a given spacing.
///
/// The callback returns `false` to stop the walk early.
pub trait PointGenerator2: Send + Sync {
    fn for_each_point(
        &self,
        bounds: &BoundingBox2,
        spacing: f64,
        callback: &mut dyn FnMut(DVec2) -> bool,
    );

    /// Collect every generated point.
    fn generate(&self, bounds: &BoundingBox2, spacing: f64) -> Vec<DVec2> {
        let mut points = Vec::new();
        self.for_each_point(bounds, spacing, &mut |point| {
            points.push(point);
            true
        });
        points
    }
}

/// Regular triangular lattice: rows are `√3/2·spacing` apart and every other
/// row is offset by half a spacing, giving equilateral packing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrianglePointGenerator;

impl PointGenerator2 for TrianglePointGenerator {
    fn for_each_point(
        &self,
        bounds: &BoundingBox2,
        spacing: f64,
        callback: &mut dyn FnMut(DVec2) -> bool,
    ) {
        let half_spacing = spacing / 2.0;
        let y_spacing = spacing * 3f64.sqrt() / 2.0;
        let box_width = bounds.width();
        let box_height = bounds.height();

        let mut has_offset = false;
        let mut j = 0usize;
        while j as f64 * y_spacing <= box_height {
            let y = j as f64 * y_spacing + bounds.lower_corner.y;
            let offset = if has_offset { half_spacing } else { 0.0 };

            let mut i = 0usize;
            while i as f64 * spacing + offset <= box_width {
                let x = i as f64 * spacing + offset + bounds.lower_corner.x;
                if !callback(DVec2::new(x, y)) {
                    return;
                }
                i += 1;
            }

            has_offset = !has_offset;
            j += 1;
        }
    }
}
