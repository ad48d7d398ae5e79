//! Bounding-box vertices from agent space to camera pixels.
//!
//! The 8 corners of an agent's box and its reference point (the box centre)
//! are always carried together as the columns of one 4x9 homogeneous
//! matrix, so every stage of the pipeline is a single matrix product:
//!
//! ```text
//! local --anchor--> agent --pose--> world --inverse camera pose--> sensor
//! sensor --axis reorder--> image axes --calibration--> homogeneous pixels
//! ```

use nalgebra::{Matrix3, Matrix4, Point3, SMatrix};
use serde::Serialize;

use crate::agent::Agent;
use crate::geom::{Coord, Pixel, Transform, Vector3D};

/// Number of corners of a 3D bounding box.
pub const NUM_CORNERS: usize = 8;

/// Corners plus the reference point.
pub const NUM_BOX_POINTS: usize = NUM_CORNERS + 1;

/// Homogeneous box points, one per column.
pub type BoxPoints = SMatrix<f64, 4, NUM_BOX_POINTS>;

/// Box points in the camera's sensor frame (x forward, y right, z up).
pub type SensorPoints = SMatrix<f64, 3, NUM_BOX_POINTS>;

// Bottom face then top face, each counter-clockwise seen from above.
const CORNER_SIGNS: [[f64; 3]; NUM_CORNERS] = [
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
];

/// A point projected onto the image: pixel position plus depth along the
/// optical axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

impl ProjectedPoint {
    #[inline]
    pub fn new(x: f64, y: f64, depth: f64) -> Self {
        Self { x, y, depth }
    }

    #[inline]
    pub fn pixel(&self) -> Coord<Pixel> {
        Coord::new(self.x, self.y)
    }
}

/// All projections of one agent's box.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxProjection {
    /// Corner projections, in [`local_box_points`] order.
    pub corners: [ProjectedPoint; NUM_CORNERS],
    /// Projection of the reference point.
    pub reference: ProjectedPoint,
    /// Corners in the sensor frame.
    pub sensor_corners: [Point3<f64>; NUM_CORNERS],
    /// Reference point in the sensor frame.
    pub sensor_reference: Point3<f64>,
}

/// Builds the box corners for the given half-extents, followed by the
/// local origin as the reference point.
pub fn local_box_points(extent: &Vector3D) -> BoxPoints {
    let half = [extent.x, extent.y, extent.z];
    BoxPoints::from_fn(|row, col| match (row, col) {
        (3, _) => 1.0,
        (_, NUM_CORNERS) => 0.0,
        _ => CORNER_SIGNS[col][row] * half[row],
    })
}

/// The fixed permutation from the simulator's sensor axes to image axes.
///
/// Image x is the sensor's lateral axis (y), image y is the negated
/// vertical axis (-z) and depth is the forward axis (x):
///
/// ```text
/// | 0 1  0 |   | x |   |  y |
/// | 0 0 -1 | * | y | = | -z |
/// | 1 0  0 |   | z |   |  x |
/// ```
pub fn sensor_to_image_axes() -> Matrix3<f64> {
    Matrix3::new(
        0.0, 1.0, 0.0, //
        0.0, 0.0, -1.0, //
        1.0, 0.0, 0.0,
    )
}

/// Maps an agent's box points into the sensor frame of a camera.
///
/// `world_to_sensor` is the inverse of the camera's world pose.
pub fn agent_to_sensor(agent: &Agent, world_to_sensor: &Matrix4<f64>) -> SensorPoints {
    let anchor = Transform::from_location(agent.bounding_box.location).matrix();
    let local_to_sensor = world_to_sensor * agent.transform.matrix() * anchor;
    let points = local_to_sensor * local_box_points(&agent.bounding_box.extent);
    points.fixed_rows::<3>(0).into_owned()
}

/// Projects sensor-frame points through a pinhole calibration.
///
/// Points at or behind the camera plane come out with a non-positive
/// depth and mirrored (or non-finite) pixel positions.
pub fn project(sensor: &SensorPoints, calibration: &Matrix3<f64>) -> [ProjectedPoint; NUM_BOX_POINTS] {
    let image = calibration * sensor_to_image_axes() * sensor;
    std::array::from_fn(|i| {
        let column = image.column(i);
        let depth = column[2];
        ProjectedPoint::new(column[0] / depth, column[1] / depth, depth)
    })
}

/// Runs the full transform and projection for one agent.
pub fn project_box(
    agent: &Agent,
    world_to_sensor: &Matrix4<f64>,
    calibration: &Matrix3<f64>,
) -> BoxProjection {
    let sensor = agent_to_sensor(agent, world_to_sensor);
    let projected = project(&sensor, calibration);

    BoxProjection {
        corners: std::array::from_fn(|i| projected[i]),
        reference: projected[NUM_CORNERS],
        sensor_corners: std::array::from_fn(|i| Point3::from(sensor.column(i).into_owned())),
        sensor_reference: Point3::from(sensor.column(NUM_CORNERS).into_owned()),
    }
}
