//! Geometry primitives shared by the labeling pipeline.
//!
//! Two families of types live here:
//!
//! 1. **Image-space types** ([`Coord`], [`BBoxXYXY`]) tagged with the
//!    [`Pixel`] marker, so projected coordinates cannot be confused with
//!    plain numbers at an API boundary.
//!
//! 2. **Simulator-space types** ([`Vector3D`], [`Rotation`], [`Transform`])
//!    that mirror the simulator's pose snapshots: a left-handed frame with
//!    x forward, y right and z up, rotations given as pitch/yaw/roll in
//!    degrees.
//!
//! # Example
//!
//! ```
//! use simlabel::geom::{BBoxXYXY, Coord, Pixel, Rotation, Transform, Vector3D};
//!
//! let corners = [Coord::<Pixel>::new(10.0, 20.0), Coord::new(110.0, 70.0)];
//! let bbox = BBoxXYXY::enclosing(corners).unwrap();
//! assert_eq!(bbox.area(), 5000.0);
//!
//! let pose = Transform::new(Vector3D::new(1.0, 2.0, 0.5), Rotation::from_yaw(90.0));
//! let matrix = pose.matrix();
//! assert_eq!(matrix[(0, 3)], 1.0);
//! ```

mod bbox;
mod coord;
mod space;
mod transform;

pub use bbox::BBoxXYXY;
pub use coord::Coord;
pub use space::Pixel;
pub use transform::{Location, Rotation, Transform, Vector3D};
