//! Rigid poses in the simulator's world frame.
//!
//! The simulator uses a left-handed frame (x forward, y right, z up) and
//! Tait-Bryan angles in degrees. [`Transform::matrix`] builds the same 4x4
//! homogeneous matrix the simulator uses for its own local-to-world
//! mapping, so poses read from a snapshot can be composed directly.

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D vector as it appears in simulator snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3D {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// A position in the simulator's world (or some parent) frame.
pub type Location = Vector3D;

impl Vector3D {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f64>> for Vector3D {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Point3<f64>> for Vector3D {
    fn from(p: Point3<f64>) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

/// An orientation as pitch, yaw and roll in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub roll: f64,
}

impl Rotation {
    #[inline]
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// A rotation about the vertical axis only.
    #[inline]
    pub fn from_yaw(yaw: f64) -> Self {
        Self::new(0.0, yaw, 0.0)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// A rigid pose: a location plus a rotation about it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub rotation: Rotation,
}

impl Transform {
    #[inline]
    pub fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }

    /// A pure translation.
    #[inline]
    pub fn from_location(location: Location) -> Self {
        Self::new(location, Rotation::default())
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.location.is_finite() && self.rotation.is_finite()
    }

    /// Returns the homogeneous local-to-parent matrix of this pose.
    pub fn matrix(&self) -> Matrix4<f64> {
        let (s_y, c_y) = self.rotation.yaw.to_radians().sin_cos();
        let (s_r, c_r) = self.rotation.roll.to_radians().sin_cos();
        let (s_p, c_p) = self.rotation.pitch.to_radians().sin_cos();
        let Location { x, y, z } = self.location;

        #[rustfmt::skip]
        let matrix = Matrix4::new(
            c_p * c_y, c_y * s_p * s_r - s_y * c_r, -c_y * s_p * c_r - s_y * s_r, x,
            s_y * c_p, s_y * s_p * s_r + c_y * c_r, -s_y * s_p * c_r + c_y * s_r, y,
            s_p,       -c_p * s_r,                  c_p * c_r,                    z,
            0.0,       0.0,                         0.0,                          1.0,
        );
        matrix
    }
}
