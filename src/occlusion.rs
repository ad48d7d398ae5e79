//! Per-vertex visibility against the depth buffer.
//!
//! Each projected corner is tested on its own: first against the render
//! range and the image rectangle, then against the scene depth stored at
//! its pixel. The eight tests share nothing, so classification is a plain
//! `map` over the corner array.

use serde::{Deserialize, Serialize};

use crate::config::LabelConfig;
use crate::projection::{ProjectedPoint, NUM_CORNERS};
use crate::sensor::{Canvas, DepthMap};

// Diagonal neighbours sampled by `OcclusionTest::Neighbourhood`.
const NEIGHBOUR_OFFSETS: [(i64, i64); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// How the depth buffer is sampled for an on-screen vertex.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OcclusionTest {
    /// Compare against the depth at the vertex's own pixel.
    #[default]
    Pixel,

    /// Compare against the four diagonal neighbours that lie on the image.
    /// The vertex is occluded only if all of them are closer.
    Neighbourhood,
}

/// Verdict for one projected vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexVisibility {
    Visible,
    /// On the image and in range, but something closer was rendered there.
    Occluded,
    /// Behind the camera, beyond the render range or off the image.
    Outside,
}

/// Per-object tally of vertex verdicts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OcclusionStats {
    pub num_visible: usize,
    pub num_occluded: usize,
    pub num_outside: usize,
}

impl OcclusionStats {
    pub fn from_verdicts(verdicts: &[VertexVisibility]) -> Self {
        verdicts
            .iter()
            .fold(Self::default(), |mut stats, verdict| {
                match verdict {
                    VertexVisibility::Visible => stats.num_visible += 1,
                    VertexVisibility::Occluded => stats.num_occluded += 1,
                    VertexVisibility::Outside => stats.num_outside += 1,
                }
                stats
            })
    }
}

/// Classifies one projected vertex.
pub fn classify_vertex<D>(
    point: &ProjectedPoint,
    depth: &D,
    canvas: Canvas,
    config: &LabelConfig,
) -> VertexVisibility
where
    D: DepthMap + ?Sized,
{
    if !config.in_render_range(point.depth) || !canvas.contains(point.x, point.y) {
        return VertexVisibility::Outside;
    }

    let occluded = match config.occlusion_test {
        OcclusionTest::Pixel => {
            let (row, col) = point.pixel().cell();
            depth.depth_at(row, col) < point.depth
        }
        OcclusionTest::Neighbourhood => occluded_by_neighbours(point, depth, canvas),
    };

    if occluded {
        VertexVisibility::Occluded
    } else {
        VertexVisibility::Visible
    }
}

/// Classifies all corners of a box.
pub fn classify_vertices<D>(
    corners: &[ProjectedPoint; NUM_CORNERS],
    depth: &D,
    canvas: Canvas,
    config: &LabelConfig,
) -> [VertexVisibility; NUM_CORNERS]
where
    D: DepthMap + ?Sized,
{
    corners.map(|corner| classify_vertex(&corner, depth, canvas, config))
}

// An empty neighbourhood (1x1 image) counts as occluded.
fn occluded_by_neighbours<D>(point: &ProjectedPoint, depth: &D, canvas: Canvas) -> bool
where
    D: DepthMap + ?Sized,
{
    let (row, col) = point.pixel().cell();
    let (row, col) = (row as i64, col as i64);
    NEIGHBOUR_OFFSETS
        .iter()
        .map(|(dr, dc)| (row + dr, col + dc))
        .filter(|&(r, c)| canvas.contains_cell(r, c))
        .all(|(r, c)| depth.depth_at(r as usize, c as usize) < point.depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::DepthImage;

    fn canvas() -> Canvas {
        Canvas::new(20, 10)
    }

    fn classify(point: ProjectedPoint, depth: &DepthImage) -> VertexVisibility {
        classify_vertex(&point, depth, canvas(), &LabelConfig::default())
    }

    #[test]
    fn closer_scene_occludes_vertex() {
        let depth = DepthImage::uniform(20, 10, 5.0);
        assert_eq!(
            classify(ProjectedPoint::new(7.5, 3.5, 6.0), &depth),
            VertexVisibility::Occluded
        );
        assert_eq!(
            classify(ProjectedPoint::new(7.5, 3.5, 4.0), &depth),
            VertexVisibility::Visible
        );
    }

    #[test]
    fn equal_depth_is_visible() {
        let depth = DepthImage::uniform(20, 10, 5.0);
        assert_eq!(
            classify(ProjectedPoint::new(1.0, 1.0, 5.0), &depth),
            VertexVisibility::Visible
        );
    }

    #[test]
    fn depth_lookup_truncates_to_pixel() {
        let mut depth = DepthImage::uniform(20, 10, 100.0);
        depth.set(3, 7, 1.0);
        assert_eq!(
            classify(ProjectedPoint::new(7.99, 3.99, 6.0), &depth),
            VertexVisibility::Occluded
        );
        assert_eq!(
            classify(ProjectedPoint::new(8.0, 3.99, 6.0), &depth),
            VertexVisibility::Visible
        );
    }

    #[test]
    fn out_of_range_depth_is_outside() {
        let depth = DepthImage::uniform(20, 10, 1000.0);
        for d in [0.0, -3.0, 70.0, 500.0, f64::NAN] {
            assert_eq!(
                classify(ProjectedPoint::new(5.0, 5.0, d), &depth),
                VertexVisibility::Outside,
                "depth {d}"
            );
        }
    }

    #[test]
    fn off_canvas_is_outside() {
        let depth = DepthImage::uniform(20, 10, 1000.0);
        for (x, y) in [(-0.5, 5.0), (20.0, 5.0), (5.0, 10.0), (5.0, -1.0)] {
            assert_eq!(
                classify(ProjectedPoint::new(x, y, 10.0), &depth),
                VertexVisibility::Outside
            );
        }
    }

    #[test]
    fn neighbourhood_requires_all_neighbours_closer() {
        let config = LabelConfig::default().with_occlusion_test(OcclusionTest::Neighbourhood);
        let mut depth = DepthImage::uniform(20, 10, 2.0);
        let point = ProjectedPoint::new(5.5, 5.5, 6.0);

        assert_eq!(
            classify_vertex(&point, &depth, canvas(), &config),
            VertexVisibility::Occluded
        );

        depth.set(4, 6, 50.0);
        assert_eq!(
            classify_vertex(&point, &depth, canvas(), &config),
            VertexVisibility::Visible
        );
    }

    #[test]
    fn neighbourhood_ignores_off_canvas_neighbours() {
        let config = LabelConfig::default().with_occlusion_test(OcclusionTest::Neighbourhood);
        let mut depth = DepthImage::uniform(20, 10, 2.0);
        // the vertex's own pixel is far, but it is not sampled
        depth.set(0, 0, 50.0);
        let point = ProjectedPoint::new(0.2, 0.2, 6.0);
        assert_eq!(
            classify_vertex(&point, &depth, canvas(), &config),
            VertexVisibility::Occluded
        );
    }

    #[test]
    fn stats_count_each_verdict() {
        let depth = DepthImage::uniform(20, 10, 5.0);
        let corners = [
            ProjectedPoint::new(1.0, 1.0, 4.0),
            ProjectedPoint::new(2.0, 1.0, 4.0),
            ProjectedPoint::new(3.0, 1.0, 6.0),
            ProjectedPoint::new(4.0, 1.0, -1.0),
            ProjectedPoint::new(40.0, 1.0, 4.0),
            ProjectedPoint::new(5.0, 1.0, 4.0),
            ProjectedPoint::new(6.0, 1.0, 80.0),
            ProjectedPoint::new(7.0, 1.0, 4.0),
        ];
        let verdicts = classify_vertices(&corners, &depth, canvas(), &LabelConfig::default());
        let stats = OcclusionStats::from_verdicts(&verdicts);
        assert_eq!(
            stats,
            OcclusionStats {
                num_visible: 4,
                num_occluded: 1,
                num_outside: 3,
            }
        );
    }
}
