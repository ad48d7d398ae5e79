//! Optional debug drawing of classified vertices.
//!
//! Drawing is kept apart from classification: the pipeline first computes
//! verdicts, and only then, if an overlay was supplied, marks them on it.

use crate::geom::{Coord, Pixel};
use crate::occlusion::VertexVisibility;
use crate::projection::{ProjectedPoint, NUM_CORNERS};

pub const VISIBLE_VERTEX_COLOR: [u8; 3] = [0, 255, 0];
pub const OCCLUDED_VERTEX_COLOR: [u8; 3] = [255, 0, 0];

/// Side length of a vertex marker, in pixels.
pub const VERTEX_MARKER_SIZE: u32 = 4;

/// Something vertex verdicts can be drawn on.
pub trait VertexOverlay {
    fn mark_vertex(&mut self, pixel: Coord<Pixel>, visibility: VertexVisibility);
}

/// Draws every on-screen vertex onto the overlay. Outside vertices are
/// skipped.
pub fn draw_vertices(
    overlay: &mut dyn VertexOverlay,
    corners: &[ProjectedPoint; NUM_CORNERS],
    verdicts: &[VertexVisibility; NUM_CORNERS],
) {
    for (corner, verdict) in corners.iter().zip(verdicts) {
        if *verdict != VertexVisibility::Outside {
            overlay.mark_vertex(corner.pixel(), *verdict);
        }
    }
}

/// A plain RGB8 image buffer, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct RgbCanvas {
    width: u32,
    height: u32,
    data: Vec<[u8; 3]>,
}

impl RgbCanvas {
    /// A black canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![[0, 0, 0]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the colour at (x, y), or `None` off the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Fills a `size` x `size` square centred on `center`, clipped to the
    /// canvas.
    pub fn draw_rect(&mut self, center: Coord<Pixel>, size: u32, color: [u8; 3]) {
        if !center.is_finite() {
            return;
        }
        let half = f64::from(size) / 2.0;
        let left = (center.x - half).floor();
        let top = (center.y - half).floor();
        // clamp in f64 before casting to i64
        let x0 = left.max(0.0) as i64;
        let y0 = top.max(0.0) as i64;
        let x1 = (left + f64::from(size)).min(f64::from(self.width)) as i64;
        let y1 = (top + f64::from(size)).min(f64::from(self.height)) as i64;

        for y in y0..y1 {
            for x in x0..x1 {
                self.data[y as usize * self.width as usize + x as usize] = color;
            }
        }
    }

    /// Returns the raw interleaved RGB bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.data.iter().flatten().copied().collect()
    }
}

impl VertexOverlay for RgbCanvas {
    fn mark_vertex(&mut self, pixel: Coord<Pixel>, visibility: VertexVisibility) {
        let color = match visibility {
            VertexVisibility::Visible => VISIBLE_VERTEX_COLOR,
            VertexVisibility::Occluded => OCCLUDED_VERTEX_COLOR,
            VertexVisibility::Outside => return,
        };
        self.draw_rect(pixel, VERTEX_MARKER_SIZE, color);
    }
}

impl std::fmt::Debug for RgbCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_rect_fills_square() {
        let mut canvas = RgbCanvas::new(10, 10);
        canvas.draw_rect(Coord::new(5.0, 5.0), 4, [1, 2, 3]);
        assert_eq!(canvas.pixel(3, 3), Some([1, 2, 3]));
        assert_eq!(canvas.pixel(6, 6), Some([1, 2, 3]));
        assert_eq!(canvas.pixel(7, 7), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(2, 5), Some([0, 0, 0]));
    }

    #[test]
    fn draw_rect_clips_at_border() {
        let mut canvas = RgbCanvas::new(10, 10);
        canvas.draw_rect(Coord::new(0.5, 9.5), 4, [9, 9, 9]);
        assert_eq!(canvas.pixel(0, 9), Some([9, 9, 9]));
        assert_eq!(canvas.pixel(1, 7), Some([9, 9, 9]));
        assert_eq!(canvas.pixel(2, 9), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(0, 6), Some([0, 0, 0]));

        canvas.draw_rect(Coord::new(f64::NAN, 1.0), 4, [7, 7, 7]);
        canvas.draw_rect(Coord::new(-50.0, -50.0), 4, [7, 7, 7]);
        assert!(!canvas.to_rgb_bytes().contains(&7));
    }

    #[test]
    fn draw_rect_ignores_far_off_canvas_centers() {
        let mut canvas = RgbCanvas::new(10, 10);
        canvas.draw_rect(Coord::new(1.0e19, 1.0), 4, [7, 7, 7]);
        canvas.draw_rect(Coord::new(1.0, 1.0e19), 4, [7, 7, 7]);
        canvas.draw_rect(Coord::new(-1.0e19, 1.0), 4, [7, 7, 7]);
        canvas.draw_rect(Coord::new(1.0, -1.0e300), u32::MAX, [7, 7, 7]);
        assert!(!canvas.to_rgb_bytes().contains(&7));

        canvas.draw_rect(Coord::new(5.0, 5.0), u32::MAX, [3, 3, 3]);
        assert!(canvas.to_rgb_bytes().iter().all(|b| *b == 3));
    }

    #[test]
    fn outside_vertices_are_not_drawn() {
        let mut canvas = RgbCanvas::new(10, 10);
        let corners = [ProjectedPoint::new(5.0, 5.0, 1.0); NUM_CORNERS];
        let mut verdicts = [VertexVisibility::Outside; NUM_CORNERS];
        draw_vertices(&mut canvas, &corners, &verdicts);
        assert!(canvas.to_rgb_bytes().iter().all(|b| *b == 0));

        verdicts[3] = VertexVisibility::Occluded;
        draw_vertices(&mut canvas, &corners, &verdicts);
        assert_eq!(canvas.pixel(5, 5), Some(OCCLUDED_VERTEX_COLOR));
    }
}
