//! Coordinate space marker types.
//!
//! Zero-sized types used as type parameters to tag which coordinate
//! system a value lives in.

use std::fmt;

/// Marker type for image pixel coordinates.
///
/// The origin is the top-left corner of the image, x grows to the right
/// and y grows downwards. Values are continuous: a projected vertex at
/// `(12.7, 3.2)` falls inside the pixel at column 12, row 3.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // Pixel has no variants
    }
}
