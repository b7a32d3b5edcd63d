use glam::{DVec2, DVec3};

/// A sampled 2D vector field (wind, ambient flow).
pub trait VectorField2: Send + Sync {
    fn sample(&self, x: DVec2) -> DVec2;
}

/// A sampled 3D vector field.
pub trait VectorField3: Send + Sync {
    fn sample(&self, x: DVec3) -> DVec3;
}

/// A field that returns the same vector everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantVectorField2 {
    value: DVec2,
}

impl ConstantVectorField2 {
    pub fn new(value: DVec2) -> Self {
        Self { value }
    }
}

impl VectorField2 for ConstantVectorField2 {
    fn sample(&self, _x: DVec2) -> DVec2 {
        self.value
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantVectorField3 {
    value: DVec3,
}

impl ConstantVectorField3 {
    pub fn new(value: DVec3) -> Self {
        Self { value }
    }
}

impl VectorField3 for ConstantVectorField3 {
    fn sample(&self, _x: DVec3) -> DVec3 {
        self.value
    }
}
