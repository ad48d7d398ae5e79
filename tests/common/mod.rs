#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use simlabel::agent::{Agent, BoundingBox};
use simlabel::geom::{Rotation, Transform, Vector3D};
use simlabel::sensor::{Camera, DepthImage};

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

/// 800x600, 90 degree FOV, at the world origin looking down +x.
pub fn camera() -> Camera {
    Camera::from_fov(Transform::default(), WIDTH, HEIGHT, 90.0)
}

/// Nothing in the scene but the far plane.
pub fn clear_depth() -> DepthImage {
    DepthImage::uniform(WIDTH, HEIGHT, 1000.0)
}

pub fn agent_at(type_id: &str, x: f64, y: f64, yaw: f64, extent: Vector3D) -> Agent {
    Agent::new(
        type_id,
        Transform::new(Vector3D::new(x, y, 0.0), Rotation::from_yaw(yaw)),
        BoundingBox::centered(extent),
    )
}

pub fn car_at(x: f64, y: f64) -> Agent {
    agent_at("vehicle.audi.a2", x, y, 0.0, Vector3D::new(2.0, 1.0, 0.8))
}

/// Builds a snapshot document for an 800x600 camera at the origin.
pub fn snapshot_json(frame: u64, depth: serde_json::Value, agents: &[Agent]) -> String {
    let doc = serde_json::json!({
        "frame": frame,
        "camera": {"width": WIDTH, "height": HEIGHT, "fov": 90.0},
        "depth": depth,
        "agents": agents,
    });
    serde_json::to_string_pretty(&doc).expect("serialize snapshot")
}

pub fn write_snapshot(dir: &Path, name: &str, json: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create snapshot dir");
    let path = dir.join(name);
    fs::write(&path, json).expect("write snapshot");
    path
}

/// Writes a raw little-endian f32 depth file with the same value everywhere.
pub fn write_raw_depth(path: &Path, width: u32, height: u32, depth: f32) {
    let bytes: Vec<u8> = std::iter::repeat(depth.to_le_bytes())
        .take(width as usize * height as usize)
        .flatten()
        .collect();
    fs::write(path, bytes).expect("write depth file");
}
