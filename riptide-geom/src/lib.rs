//! Geometry collaborators for the Riptide particle kernel:
//! bounding volumes, rays, implicit surfaces, and lattice point generators.
//!
//! Everything here is 2D and double-precision. The simulation crate consumes
//! these types through the `Surface2` / `ImplicitSurface2` capability traits,
//! so colliders and emitters stay agnostic of the concrete shape.

pub mod bounding_box;
pub mod box2;
pub mod plane;
pub mod point_generator;
pub mod ray;
pub mod sphere;
pub mod surface;
pub mod surface_set;

pub use bounding_box::{BoundingBox2, BoundingBoxRayIntersection2};
pub use box2::Box2;
pub use plane::Plane2;
pub use point_generator::{PointGenerator2, TrianglePointGenerator};
pub use ray::Ray2;
pub use sphere::Sphere2;
pub use surface::{ImplicitSurface2, Surface2, SurfaceRayIntersection2, SurfaceToImplicit2};
pub use surface_set::ImplicitSurfaceSet2;
