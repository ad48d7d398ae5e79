#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use simlabel::agent::{Agent, BoundingBox};
use simlabel::geom::{Rotation, Transform, Vector3D};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_type_id() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("vehicle.audi.a2".to_string()),
        Just("vehicle.carlamotors.firetruck".to_string()),
        Just("walker.pedestrian.0004".to_string()),
        Just("static.prop.box".to_string()),
    ]
}

pub fn arb_extent() -> impl Strategy<Value = Vector3D> {
    (0.2f64..3.0, 0.2f64..1.5, 0.2f64..1.5).prop_map(|(x, y, z)| Vector3D::new(x, y, z))
}

/// Agents somewhere in front of a camera at the origin looking down +x,
/// far enough that no corner reaches the camera plane.
pub fn arb_agent_in_front() -> impl Strategy<Value = Agent> {
    (
        arb_type_id(),
        5.0f64..80.0,
        -20.0f64..20.0,
        -3.0f64..3.0,
        -360.0f64..360.0,
        arb_extent(),
    )
        .prop_map(|(type_id, x, y, z, yaw, extent)| {
            Agent::new(
                type_id,
                Transform::new(Vector3D::new(x, y, z), Rotation::from_yaw(yaw)),
                BoundingBox::centered(extent),
            )
        })
}

pub fn arb_reference() -> impl Strategy<Value = Transform> {
    (-720.0f64..720.0).prop_map(|yaw| Transform::new(Vector3D::default(), Rotation::from_yaw(yaw)))
}
