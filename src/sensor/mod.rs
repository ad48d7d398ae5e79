//! Sensor models: the RGB camera and its aligned depth buffer.

mod camera;
mod depth;

pub use camera::{Camera, Canvas};
pub use depth::{DepthImage, DepthMap, CARLA_MAX_DEPTH};
