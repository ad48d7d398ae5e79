//! Acceptance thresholds for label emission.
//!
//! A [`LabelConfig`] is passed explicitly into every evaluation call, so
//! different scenarios (or tests) can use different thresholds side by side.
//! Config files may be YAML or JSON; missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimlabelError;
use crate::occlusion::{OcclusionStats, OcclusionTest};

/// Vertices at or beyond this depth are treated as outside the camera.
pub const DEFAULT_MAX_RENDER_DEPTH: f64 = 70.0;

/// Minimum number of visible corners for a label.
pub const DEFAULT_MIN_VISIBLE_VERTICES: usize = 4;

/// A label needs strictly fewer outside corners than this.
pub const DEFAULT_MAX_OUTSIDE_VERTICES: usize = 4;

/// Minimum projected 2D box area in square pixels.
pub const DEFAULT_MIN_BBOX_AREA: f64 = 100.0;

/// Thresholds and policies for turning an agent into a label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    /// Far cutoff for vertex depth, in simulator distance units.
    pub max_render_depth: f64,

    /// A label needs at least this many visible corners.
    pub min_visible_vertices: usize,

    /// A label needs strictly fewer than this many outside corners.
    pub max_outside_vertices: usize,

    /// Boxes with a smaller area are dropped. Equal area is kept.
    pub min_bbox_area: f64,

    /// How the depth buffer is sampled for occlusion.
    pub occlusion_test: OcclusionTest,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            max_render_depth: DEFAULT_MAX_RENDER_DEPTH,
            min_visible_vertices: DEFAULT_MIN_VISIBLE_VERTICES,
            max_outside_vertices: DEFAULT_MAX_OUTSIDE_VERTICES,
            min_bbox_area: DEFAULT_MIN_BBOX_AREA,
            occlusion_test: OcclusionTest::default(),
        }
    }
}

impl LabelConfig {
    pub fn with_max_render_depth(mut self, depth: f64) -> Self {
        self.max_render_depth = depth;
        self
    }

    pub fn with_min_visible_vertices(mut self, count: usize) -> Self {
        self.min_visible_vertices = count;
        self
    }

    pub fn with_max_outside_vertices(mut self, count: usize) -> Self {
        self.max_outside_vertices = count;
        self
    }

    pub fn with_min_bbox_area(mut self, area: f64) -> Self {
        self.min_bbox_area = area;
        self
    }

    pub fn with_occlusion_test(mut self, test: OcclusionTest) -> Self {
        self.occlusion_test = test;
        self
    }

    /// Returns true if a vertex at this depth is in front of the camera and
    /// closer than the render cutoff.
    #[inline]
    pub fn in_render_range(&self, depth: f64) -> bool {
        depth > 0.0 && depth < self.max_render_depth
    }

    /// The visibility gate.
    #[inline]
    pub fn accepts_visibility(&self, stats: &OcclusionStats) -> bool {
        stats.num_visible >= self.min_visible_vertices
            && stats.num_outside < self.max_outside_vertices
    }

    /// The area gate. NaN areas are rejected.
    #[inline]
    pub fn accepts_area(&self, area: f64) -> bool {
        area >= self.min_bbox_area
    }
}

/// Loads a config file, choosing the parser from the file extension
/// (`.yaml`/`.yml` or `.json`).
pub fn load_config(path: &Path) -> Result<LabelConfig, SimlabelError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let parse_error = |message: String| SimlabelError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };

    match extension.as_deref() {
        Some("yaml") | Some("yml") => {
            let content = fs::read_to_string(path)?;
            serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
        Some("json") => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
        _ => Err(SimlabelError::UnsupportedFormat(format!(
            "config file '{}' (expected .yaml, .yml or .json)",
            path.display()
        ))),
    }
}
