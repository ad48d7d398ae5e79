//! KITTI object label writer.
//!
//! Each label becomes one whitespace-separated line:
//!
//! ```text
//! type truncated occluded alpha xmin ymin xmax ymax height width length x y z rotation_y
//! ```
//!
//! Truncation and occlusion levels are not estimated and are written as
//! `0`; the observation angle `alpha` is written as KITTI's "unknown"
//! value `-10`. Dimensions are full sizes. Locations are converted from
//! the simulator's sensor frame (x forward, y right, z up) to the KITTI
//! camera frame (x right, y down, z forward) and moved from the box centre
//! to the centre of its bottom face.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::SimlabelError;
use crate::label::Label;

const TRUNCATED: f64 = 0.0;
const OCCLUDED: u8 = 0;
const ALPHA_UNKNOWN: f64 = -10.0;

/// Formats a single label as a KITTI line, without a trailing newline.
pub fn to_kitti_line(label: &Label) -> String {
    let [xmin, ymin, xmax, ymax] = label.bbox.to_array();
    let extent = label.extent;
    let (height, width, length) = (2.0 * extent.z, 2.0 * extent.y, 2.0 * extent.x);

    let loc = label.location;
    // bottom face sits half a height below the centre
    let (x, y, z) = (loc.y, extent.z - loc.z, loc.x);

    format!(
        "{} {:.2} {} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        label.class,
        TRUNCATED,
        OCCLUDED,
        ALPHA_UNKNOWN,
        xmin,
        ymin,
        xmax,
        ymax,
        height,
        width,
        length,
        x,
        y,
        z,
        label.rotation_y
    )
}

/// Formats a frame's labels, one line each.
pub fn to_kitti_string(labels: &[Label]) -> String {
    let mut out = String::new();
    for label in labels {
        out.push_str(&to_kitti_line(label));
        out.push('\n');
    }
    out
}

/// Writes a frame's labels to `path`, creating parent directories.
///
/// A frame without labels produces an empty file, as KITTI expects one
/// label file per image.
pub fn write_kitti_file(path: &Path, labels: &[Label]) -> Result<(), SimlabelError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(to_kitti_string(labels).as_bytes())?;
    Ok(())
}

/// The conventional label file name for a frame number, e.g. `000042.txt`.
pub fn label_file_name(frame: u64) -> String {
    format!("{:06}.txt", frame)
}
