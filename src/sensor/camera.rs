//! Pinhole camera with a pose in the world.

use nalgebra::Matrix3;

use crate::error::SimlabelError;
use crate::geom::Transform;

/// The image rectangle `[0, width) x [0, height)` in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if the continuous pixel position lies on the image.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < f64::from(self.width) && y >= 0.0 && y < f64::from(self.height)
    }

    /// Returns true if the integer (row, column) cell lies on the image.
    #[inline]
    pub fn contains_cell(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && row < i64::from(self.height) && col < i64::from(self.width)
    }
}

/// An RGB camera: world pose, pinhole calibration and image resolution.
///
/// The calibration matrix maps image-axis coordinates (see
/// [`sensor_to_image_axes`](crate::projection::sensor_to_image_axes)) to
/// homogeneous pixels:
///
/// ```text
/// | fx  0  cx |
/// |  0 fy  cy |
/// |  0  0   1 |
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Pose of the camera in the world frame.
    pub transform: Transform,
    /// 3x3 intrinsic calibration matrix.
    pub calibration: Matrix3<f64>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl Camera {
    pub fn new(transform: Transform, calibration: Matrix3<f64>, width: u32, height: u32) -> Self {
        Self {
            transform,
            calibration,
            width,
            height,
        }
    }

    /// Builds the calibration the simulator uses for a camera with the given
    /// horizontal field of view (degrees): square pixels, principal point at
    /// the image centre.
    pub fn from_fov(transform: Transform, width: u32, height: u32, fov: f64) -> Self {
        let focal = f64::from(width) / (2.0 * (fov * std::f64::consts::PI / 360.0).tan());
        let calibration = Matrix3::new(
            focal,
            0.0,
            f64::from(width) / 2.0,
            0.0,
            focal,
            f64::from(height) / 2.0,
            0.0,
            0.0,
            1.0,
        );
        Self::new(transform, calibration, width, height)
    }

    #[inline]
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Checks the camera for values that would make every projection
    /// degenerate.
    pub fn validate(&self) -> Result<(), SimlabelError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimlabelError::InvalidCamera(format!(
                "image resolution {}x{} must be positive",
                self.width, self.height
            )));
        }
        if !self.transform.is_finite() {
            return Err(SimlabelError::InvalidCamera(
                "camera pose contains non-finite values".to_string(),
            ));
        }
        if self.calibration.iter().any(|v| !v.is_finite()) {
            return Err(SimlabelError::InvalidCamera(
                "calibration matrix contains non-finite values".to_string(),
            ));
        }

        let k = &self.calibration;
        if k[(0, 0)] <= 0.0 || k[(1, 1)] <= 0.0 {
            return Err(SimlabelError::InvalidCamera(format!(
                "focal lengths must be positive (fx={}, fy={})",
                k[(0, 0)],
                k[(1, 1)]
            )));
        }
        if k[(2, 2)] <= 0.0 {
            return Err(SimlabelError::InvalidCamera(format!(
                "depth scale K[2][2]={} must be positive",
                k[(2, 2)]
            )));
        }
        if k.determinant().abs() < f64::EPSILON {
            return Err(SimlabelError::InvalidCamera(
                "calibration matrix is singular".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fov_ninety_puts_focal_at_half_width() {
        let camera = Camera::from_fov(Transform::default(), 800, 600, 90.0);
        let k = camera.calibration;
        assert!((k[(0, 0)] - 400.0).abs() < 1e-9);
        assert!((k[(1, 1)] - 400.0).abs() < 1e-9);
        assert_eq!(k[(0, 2)], 400.0);
        assert_eq!(k[(1, 2)], 300.0);
        assert_eq!(k[(2, 2)], 1.0);
        assert!(camera.validate().is_ok());
    }

    #[test]
    fn canvas_bounds_are_half_open() {
        let canvas = Canvas::new(640, 480);
        assert!(canvas.contains(0.0, 0.0));
        assert!(canvas.contains(639.999, 479.999));
        assert!(!canvas.contains(640.0, 10.0));
        assert!(!canvas.contains(10.0, 480.0));
        assert!(!canvas.contains(-0.001, 10.0));
        assert!(!canvas.contains(f64::NAN, 10.0));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let camera = Camera::from_fov(Transform::default(), 0, 600, 90.0);
        assert!(matches!(
            camera.validate(),
            Err(SimlabelError::InvalidCamera(_))
        ));
    }

    #[test]
    fn singular_calibration_is_rejected() {
        let mut camera = Camera::from_fov(Transform::default(), 800, 600, 90.0);
        camera.calibration[(2, 2)] = 0.0;
        assert!(camera.validate().is_err());

        camera.calibration = Matrix3::zeros();
        assert!(camera.validate().is_err());
    }

    #[test]
    fn non_finite_pose_is_rejected() {
        let mut camera = Camera::from_fov(Transform::default(), 800, 600, 90.0);
        camera.transform.rotation.yaw = f64::NAN;
        assert!(camera.validate().is_err());
    }
}
