//! Label assembly: acceptance policy and record construction.
//!
//! Every agent goes through the same short state machine, terminal at the
//! first failing gate:
//!
//! 1. classify the type tag (unknown tags stop here, before any geometry)
//! 2. project the box and classify its corners against the depth buffer
//! 3. visibility gate
//! 4. 2D box over all eight corner projections
//! 5. area gate
//! 6. relative heading, then emit the [`Label`]
//!
//! Camera checks happen once per frame in [`FrameContext::new`]; everything
//! after that is infallible and pure.
//!
//! # Example
//!
//! ```
//! use simlabel::agent::{Agent, BoundingBox};
//! use simlabel::geom::{Transform, Vector3D};
//! use simlabel::label::evaluate;
//! use simlabel::sensor::{Camera, DepthImage};
//! use simlabel::LabelConfig;
//!
//! let camera = Camera::from_fov(Transform::default(), 800, 600, 90.0);
//! let depth = DepthImage::uniform(800, 600, 1000.0);
//! let agent = Agent::new(
//!     "vehicle.audi.a2",
//!     Transform::from_location(Vector3D::new(10.0, 0.0, 0.0)),
//!     BoundingBox::centered(Vector3D::new(2.0, 1.0, 0.8)),
//! );
//!
//! let label = evaluate(&agent, &camera, &depth, &Transform::default(), &LabelConfig::default())
//!     .unwrap()
//!     .expect("car straight ahead is labeled");
//! assert_eq!(label.class.as_str(), "Car");
//! ```

mod report;

pub use report::{write_report_csv, FrameReport, LabelingReport};

use nalgebra::Matrix4;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, ObjectClass};
use crate::config::LabelConfig;
use crate::error::SimlabelError;
use crate::geom::{BBoxXYXY, Pixel, Transform, Vector3D};
use crate::occlusion::{classify_vertices, OcclusionStats, VertexVisibility};
use crate::overlay::{draw_vertices, VertexOverlay};
use crate::projection::{project_box, ProjectedPoint, NUM_CORNERS};
use crate::sensor::{Camera, DepthMap};

/// A training label for one agent in one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub class: ObjectClass,

    /// Projected 2D box in pixels, not clipped to the image.
    pub bbox: BBoxXYXY<Pixel>,

    /// Half-sizes of the 3D box along the agent's local axes, as given.
    pub extent: Vector3D,

    /// Box centre in the camera's sensor frame (x forward, y right, z up).
    pub location: Vector3D,

    /// Heading relative to the reference pose, in `[0, π)` radians.
    pub rotation_y: f64,
}

/// Why an agent did or did not get a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Labeled,
    /// The type tag maps to no label class.
    Unclassified,
    /// Too few visible corners, or too many outside the image.
    InsufficientVisibility,
    /// The projected box is below the area threshold.
    AreaTooSmall,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Labeled => "labeled",
            Self::Unclassified => "unclassified",
            Self::InsufficientVisibility => "insufficient_visibility",
            Self::AreaTooSmall => "area_too_small",
        }
    }
}

/// Everything computed for one agent, whatever the outcome.
///
/// Geometry fields are `None` for unclassified agents, which never reach
/// projection; `bbox` and `area` are also `None` when the visibility gate
/// fails.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostics {
    pub agent_id: Option<u64>,
    pub outcome: Outcome,
    pub label: Option<Label>,
    pub stats: OcclusionStats,
    pub corners: Option<[ProjectedPoint; NUM_CORNERS]>,
    pub verdicts: Option<[VertexVisibility; NUM_CORNERS]>,
    pub bbox: Option<BBoxXYXY<Pixel>>,
    pub area: Option<f64>,
}

impl Diagnostics {
    fn unclassified(agent_id: Option<u64>) -> Self {
        Self {
            agent_id,
            outcome: Outcome::Unclassified,
            label: None,
            stats: OcclusionStats::default(),
            corners: None,
            verdicts: None,
            bbox: None,
            area: None,
        }
    }

    #[inline]
    pub fn num_visible(&self) -> usize {
        self.stats.num_visible
    }

    #[inline]
    pub fn num_outside(&self) -> usize {
        self.stats.num_outside
    }

    /// Consumes the diagnostics, keeping only the label.
    pub fn into_label(self) -> Option<Label> {
        self.label
    }
}

/// Read-only state shared by all agents of a frame.
///
/// Construction validates the camera, the depth buffer and the reference
/// pose, and inverts the camera pose once. The context can then be shared across threads.
pub struct FrameContext<'a, D: DepthMap + ?Sized> {
    camera: &'a Camera,
    depth: &'a D,
    reference: &'a Transform,
    world_to_sensor: Matrix4<f64>,
}

impl<'a, D: DepthMap + ?Sized> FrameContext<'a, D> {
    pub fn new(
        camera: &'a Camera,
        depth: &'a D,
        reference: &'a Transform,
    ) -> Result<Self, SimlabelError> {
        camera.validate()?;
        if depth.width() != camera.width || depth.height() != camera.height {
            return Err(SimlabelError::DepthSizeMismatch {
                depth_width: depth.width(),
                depth_height: depth.height(),
                image_width: camera.width,
                image_height: camera.height,
            });
        }
        if !reference.is_finite() {
            return Err(SimlabelError::InvalidInput(
                "reference pose contains non-finite values".to_string(),
            ));
        }
        let world_to_sensor = camera.transform.matrix().try_inverse().ok_or_else(|| {
            SimlabelError::InvalidCamera("camera pose is not invertible".to_string())
        })?;

        Ok(Self {
            camera,
            depth,
            reference,
            world_to_sensor,
        })
    }

    pub fn camera(&self) -> &Camera {
        self.camera
    }

    /// Returns the label for one agent, or `None` if it is filtered out.
    pub fn evaluate(&self, agent: &Agent, config: &LabelConfig) -> Option<Label> {
        self.evaluate_with_diagnostics(agent, config).into_label()
    }

    /// Runs the pipeline for one agent and keeps every intermediate result.
    pub fn evaluate_with_diagnostics(&self, agent: &Agent, config: &LabelConfig) -> Diagnostics {
        let Some(class) = agent.class() else {
            log::warn!(
                "Could not label agent {:?}: unknown object type '{}'",
                agent.id,
                agent.type_id
            );
            return Diagnostics::unclassified(agent.id);
        };

        let projection = project_box(agent, &self.world_to_sensor, &self.camera.calibration);
        let verdicts = classify_vertices(
            &projection.corners,
            self.depth,
            self.camera.canvas(),
            config,
        );
        let stats = OcclusionStats::from_verdicts(&verdicts);

        let mut diagnostics = Diagnostics {
            agent_id: agent.id,
            outcome: Outcome::InsufficientVisibility,
            label: None,
            stats,
            corners: Some(projection.corners),
            verdicts: Some(verdicts),
            bbox: None,
            area: None,
        };

        if !config.accepts_visibility(&stats) {
            return diagnostics;
        }

        // Occluded and outside corners still contribute to the extent.
        let Some(bbox) = BBoxXYXY::enclosing(projection.corners.iter().map(|c| c.pixel())) else {
            return diagnostics;
        };
        let area = bbox.area();
        diagnostics.bbox = Some(bbox);
        diagnostics.area = Some(area);

        if !config.accepts_area(area) {
            log::info!("Filtered out bbox with too low area {}", area);
            diagnostics.outcome = Outcome::AreaTooSmall;
            return diagnostics;
        }

        diagnostics.outcome = Outcome::Labeled;
        diagnostics.label = Some(Label {
            class,
            bbox,
            extent: agent.bounding_box.extent,
            location: projection.sensor_reference.into(),
            rotation_y: relative_heading(&agent.transform, self.reference),
        });
        diagnostics
    }

    /// Like [`evaluate_with_diagnostics`](Self::evaluate_with_diagnostics),
    /// and also marks the classified corners on `overlay`.
    pub fn evaluate_with_overlay(
        &self,
        agent: &Agent,
        config: &LabelConfig,
        overlay: &mut dyn VertexOverlay,
    ) -> Diagnostics {
        let diagnostics = self.evaluate_with_diagnostics(agent, config);
        if let (Some(corners), Some(verdicts)) = (&diagnostics.corners, &diagnostics.verdicts) {
            draw_vertices(overlay, corners, verdicts);
        }
        diagnostics
    }
}

impl<D: DepthMap + Sync + ?Sized> FrameContext<'_, D> {
    /// Evaluates all agents of the frame in parallel.
    ///
    /// The output is in the same order as `agents`.
    pub fn evaluate_all(&self, agents: &[Agent], config: &LabelConfig) -> Vec<Diagnostics> {
        agents
            .par_iter()
            .map(|agent| self.evaluate_with_diagnostics(agent, config))
            .collect()
    }
}

/// Computes the label for a single agent.
///
/// Returns an error if the camera or depth buffer is unusable, and
/// `Ok(None)` if the agent is filtered out.
pub fn evaluate<D: DepthMap + ?Sized>(
    agent: &Agent,
    camera: &Camera,
    depth: &D,
    reference: &Transform,
    config: &LabelConfig,
) -> Result<Option<Label>, SimlabelError> {
    Ok(FrameContext::new(camera, depth, reference)?.evaluate(agent, config))
}

/// Computes the label for a single agent along with visibility counts,
/// projected corners and the 2D box.
pub fn evaluate_with_diagnostics<D: DepthMap + ?Sized>(
    agent: &Agent,
    camera: &Camera,
    depth: &D,
    reference: &Transform,
    config: &LabelConfig,
) -> Result<Diagnostics, SimlabelError> {
    Ok(FrameContext::new(camera, depth, reference)?.evaluate_with_diagnostics(agent, config))
}

/// Yaw of `agent` relative to `reference`, in `[0, π)` radians.
pub fn relative_heading(agent: &Transform, reference: &Transform) -> f64 {
    normalize_heading((agent.rotation.yaw - reference.rotation.yaw).to_radians())
}

/// Reduces an angle modulo π into `[0, π)`.
///
/// Uses floored division, so negative angles wrap to positive values
/// rather than keeping their sign.
pub fn normalize_heading(radians: f64) -> f64 {
    let pi = std::f64::consts::PI;
    let wrapped = radians.rem_euclid(pi);
    // rem_euclid can return -0.0, or round up to exactly π for tiny negatives
    if wrapped == 0.0 || wrapped >= pi {
        0.0
    } else {
        wrapped
    }
}
