//! Frame snapshots: one camera frame's worth of simulator state.
//!
//! A snapshot is a JSON document written by whatever drives the simulator:
//!
//! ```json
//! {
//!   "frame": 42,
//!   "camera": {
//!     "transform": {"location": {"x": 0.0, "y": 0.0, "z": 1.6}},
//!     "width": 1242, "height": 375, "fov": 90.0
//!   },
//!   "reference": {"rotation": {"yaw": 0.0}},
//!   "depth": {"raw_f32": "depth/000042.bin"},
//!   "agents": [
//!     {
//!       "id": 7,
//!       "type_id": "vehicle.audi.a2",
//!       "transform": {"location": {"x": 15.0, "y": 2.0}, "rotation": {"yaw": 10.0}},
//!       "bounding_box": {"location": {"z": 0.7}, "extent": {"x": 1.8, "y": 0.9, "z": 0.7}}
//!     }
//!   ]
//! }
//! ```
//!
//! The camera takes either a `fov` (degrees) or an explicit row-major
//! `calibration` matrix. Depth file paths are resolved relative to the
//! snapshot file.

use std::fs;
use std::path::Path;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::SimlabelError;
use crate::geom::Transform;
use crate::sensor::{Camera, DepthImage};

/// Largest depth buffer a snapshot may declare, 16384 x 16384 pixels.
pub const MAX_DEPTH_PIXELS: u64 = 1 << 28;

/// One frame of simulator state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameSnapshot {
    #[serde(default)]
    pub frame: u64,

    pub camera: CameraSpec,

    /// Pose headings are measured against, usually the ego vehicle.
    #[serde(default)]
    pub reference: Transform,

    #[serde(default)]
    pub depth: DepthSource,

    #[serde(default)]
    pub agents: Vec<Agent>,
}

/// Camera as described in a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraSpec {
    #[serde(default)]
    pub transform: Transform,
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub intrinsics: Intrinsics,
}

/// Either a field of view or a full calibration matrix.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Intrinsics {
    Calibration { calibration: [[f64; 3]; 3] },
    Fov { fov: f64 },
}

/// Where the frame's depth buffer comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthSource {
    /// The same depth everywhere; an empty scene when very large.
    Uniform(f64),
    /// Little-endian `f32` values, row-major.
    RawF32(String),
    /// The simulator's packed BGRA depth capture.
    CarlaBgra(String),
}

impl Default for DepthSource {
    fn default() -> Self {
        DepthSource::Uniform(f64::INFINITY)
    }
}

impl CameraSpec {
    pub fn to_camera(&self) -> Camera {
        match &self.intrinsics {
            Intrinsics::Fov { fov } => {
                Camera::from_fov(self.transform, self.width, self.height, *fov)
            }
            Intrinsics::Calibration { calibration: k } => {
                let calibration = Matrix3::new(
                    k[0][0], k[0][1], k[0][2], //
                    k[1][0], k[1][1], k[1][2], //
                    k[2][0], k[2][1], k[2][2],
                );
                Camera::new(self.transform, calibration, self.width, self.height)
            }
        }
    }
}

impl FrameSnapshot {
    pub fn camera(&self) -> Camera {
        self.camera.to_camera()
    }

    /// Loads the depth buffer at the camera's resolution. Relative paths are
    /// resolved against `base_dir`.
    ///
    /// Resolutions above [`MAX_DEPTH_PIXELS`] are rejected before anything
    /// is allocated or read.
    pub fn load_depth(&self, base_dir: &Path) -> Result<DepthImage, SimlabelError> {
        let (width, height) = (self.camera.width, self.camera.height);
        if u64::from(width) * u64::from(height) > MAX_DEPTH_PIXELS {
            return Err(SimlabelError::InvalidInput(format!(
                "frame {}: {}x{} depth buffer exceeds {} pixels",
                self.frame, width, height, MAX_DEPTH_PIXELS
            )));
        }
        match &self.depth {
            DepthSource::Uniform(depth) => Ok(DepthImage::uniform(width, height, *depth as f32)),
            DepthSource::RawF32(path) => {
                DepthImage::read_raw_f32(&base_dir.join(path), width, height)
            }
            DepthSource::CarlaBgra(path) => {
                DepthImage::read_carla_bgra(&base_dir.join(path), width, height)
            }
        }
    }
}

/// Parses a snapshot from a JSON string.
pub fn from_snapshot_str(json: &str) -> Result<FrameSnapshot, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a snapshot file.
pub fn read_frame_snapshot(path: &Path) -> Result<FrameSnapshot, SimlabelError> {
    let content = fs::read_to_string(path)?;
    from_snapshot_str(&content).map_err(|source| SimlabelError::SnapshotParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Fuzz-only entrypoint: parses a snapshot and labels it against a clear
/// depth buffer.
#[cfg(feature = "fuzzing")]
pub fn fuzz_label_snapshot(input: &str) -> Result<(), SimlabelError> {
    use crate::config::LabelConfig;
    use crate::label::FrameContext;

    let snapshot = from_snapshot_str(input).map_err(|source| SimlabelError::SnapshotParse {
        path: Path::new("<fuzz>").to_path_buf(),
        source,
    })?;
    if u64::from(snapshot.camera.width) * u64::from(snapshot.camera.height) > 1 << 20 {
        return Err(SimlabelError::InvalidInput("image too large".to_string()));
    }
    let camera = snapshot.camera();
    let depth = DepthImage::uniform(camera.width, camera.height, 1000.0);
    let context = FrameContext::new(&camera, &depth, &snapshot.reference)?;
    let _ = context.evaluate_all(&snapshot.agents, &LabelConfig::default());
    Ok(())
}
