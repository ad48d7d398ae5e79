//! Per-pixel scene depth aligned with the camera image.

use std::fs;
use std::path::Path;

use crate::error::SimlabelError;

/// Far plane of the simulator's depth camera, in metres.
///
/// The packed 24-bit depth encoding maps `[0, 1]` onto `[0, CARLA_MAX_DEPTH]`.
pub const CARLA_MAX_DEPTH: f64 = 1000.0;

const CARLA_DEPTH_SCALE: f64 = 16_777_215.0; // 256^3 - 1

/// Read access to a depth buffer.
///
/// Implementations must have the same resolution as the camera image.
/// `depth_at` is only called with `row < height()` and `col < width()`.
pub trait DepthMap {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Scene depth at the given pixel, in the same units as the camera pose.
    fn depth_at(&self, row: usize, col: usize) -> f64;
}

/// An owned, row-major depth buffer.
#[derive(Clone, PartialEq)]
pub struct DepthImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthImage {
    /// Wraps row-major depth values. The length must equal `width * height`.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, SimlabelError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SimlabelError::DepthDecode(format!(
                "expected {} values for a {}x{} buffer, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer where every pixel has the same depth.
    pub fn uniform(width: u32, height: u32, depth: f32) -> Self {
        Self {
            width,
            height,
            data: vec![depth; width as usize * height as usize],
        }
    }

    /// Decodes little-endian `f32` values, row by row.
    pub fn from_raw_f32_le(width: u32, height: u32, bytes: &[u8]) -> Result<Self, SimlabelError> {
        if bytes.len() % 4 != 0 {
            return Err(SimlabelError::DepthDecode(format!(
                "raw f32 buffer length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let data = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Self::new(width, height, data)
    }

    /// Decodes the simulator's packed depth image (BGRA, 8 bits per channel).
    ///
    /// Depth is spread over the three colour channels as a 24-bit fraction
    /// of [`CARLA_MAX_DEPTH`]: `(R + G * 256 + B * 256^2) / (256^3 - 1)`.
    pub fn from_carla_bgra(width: u32, height: u32, bytes: &[u8]) -> Result<Self, SimlabelError> {
        if bytes.len() % 4 != 0 {
            return Err(SimlabelError::DepthDecode(format!(
                "BGRA buffer length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let data = bytes
            .chunks_exact(4)
            .map(|px| {
                let (b, g, r) = (f64::from(px[0]), f64::from(px[1]), f64::from(px[2]));
                let normalized = (r + g * 256.0 + b * 65_536.0) / CARLA_DEPTH_SCALE;
                (normalized * CARLA_MAX_DEPTH) as f32
            })
            .collect();
        Self::new(width, height, data)
    }

    /// Reads a raw little-endian `f32` depth file.
    pub fn read_raw_f32(path: &Path, width: u32, height: u32) -> Result<Self, SimlabelError> {
        let bytes = read_bytes(path)?;
        Self::from_raw_f32_le(width, height, &bytes)
    }

    /// Reads a raw BGRA depth capture.
    pub fn read_carla_bgra(path: &Path, width: u32, height: u32) -> Result<Self, SimlabelError> {
        let bytes = read_bytes(path)?;
        Self::from_carla_bgra(width, height, &bytes)
    }

    /// Overwrites the depth of a single pixel.
    ///
    /// Returns false if the pixel is outside the buffer.
    pub fn set(&mut self, row: usize, col: usize, depth: f32) -> bool {
        if row >= self.height as usize || col >= self.width as usize {
            return false;
        }
        self.data[row * self.width as usize + col] = depth;
        true
    }

    /// Returns the row-major depth values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, SimlabelError> {
    fs::read(path).map_err(|source| SimlabelError::DepthRead {
        path: path.to_path_buf(),
        source,
    })
}

impl DepthMap for DepthImage {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn depth_at(&self, row: usize, col: usize) -> f64 {
        f64::from(self.data[row * self.width as usize + col])
    }
}

impl std::fmt::Debug for DepthImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
