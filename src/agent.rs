//! Agent snapshots and their mapping to label classes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{Location, Transform, Vector3D};

/// Object classes a label can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectClass {
    Car,
    Pedestrian,
}

impl ObjectClass {
    /// Maps a simulator type tag (e.g. `vehicle.audi.a2`) to a label class.
    ///
    /// Matching is by substring and `pedestrian` wins over `vehicle`.
    /// Returns `None` for anything else.
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        if type_id.contains("pedestrian") {
            Some(Self::Pedestrian)
        } else if type_id.contains("vehicle") {
            Some(Self::Car)
        } else {
            None
        }
    }

    /// The KITTI name of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Pedestrian => "Pedestrian",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An oriented box in the agent's local frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Offset of the box centre from the agent's origin.
    #[serde(default)]
    pub location: Location,

    /// Half-sizes along the agent's local x, y and z axes.
    pub extent: Vector3D,
}

impl BoundingBox {
    pub fn new(location: Location, extent: Vector3D) -> Self {
        Self { location, extent }
    }

    /// A box centred on the agent's origin.
    pub fn centered(extent: Vector3D) -> Self {
        Self::new(Location::default(), extent)
    }
}

/// A snapshot of one simulated actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Optional simulator id, only used to correlate diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Simulator blueprint tag, e.g. `walker.pedestrian.0001`.
    pub type_id: String,

    /// Pose of the agent in the world frame.
    pub transform: Transform,

    pub bounding_box: BoundingBox,
}

impl Agent {
    pub fn new(type_id: impl Into<String>, transform: Transform, bounding_box: BoundingBox) -> Self {
        Self {
            id: None,
            type_id: type_id.into(),
            transform,
            bounding_box,
        }
    }

    /// Sets the simulator id for this agent.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// The label class of this agent, if it has one.
    pub fn class(&self) -> Option<ObjectClass> {
        ObjectClass::from_type_id(&self.type_id)
    }
}
