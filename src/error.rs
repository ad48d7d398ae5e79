use std::path::PathBuf;
use thiserror::Error;

/// The main error type for simlabel operations.
///
/// Agents that end up without a label are not errors; they are reported
/// through [`Outcome`](crate::label::Outcome). Errors here are problems
/// with a whole frame or with the files around it.
#[derive(Debug, Error)]
pub enum SimlabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error(
        "Depth buffer is {depth_width}x{depth_height} but the camera image is {image_width}x{image_height}"
    )]
    DepthSizeMismatch {
        depth_width: u32,
        depth_height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Failed to decode depth buffer: {0}")]
    DepthDecode(String),

    #[error("Failed to read depth buffer from {path}: {source}")]
    DepthRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse frame snapshot from {path}: {source}")]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse config from {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Failed to write CSV report to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to serialize {what}: {message}")]
    Serialize { what: &'static str, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
