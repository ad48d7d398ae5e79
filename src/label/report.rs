//! Per-frame outcome reports.
//!
//! A [`LabelingReport`] collects one [`FrameReport`] per processed frame and
//! can be printed as text, serialized to JSON, or, at agent granularity,
//! written as CSV with [`write_report_csv`].

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::{Diagnostics, Outcome};
use crate::error::SimlabelError;

/// Outcome tallies for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub agents: usize,
    pub labeled: usize,
    pub unclassified: usize,
    pub insufficient_visibility: usize,
    pub area_too_small: usize,
}

impl FrameReport {
    pub fn from_diagnostics(frame: u64, diagnostics: &[Diagnostics]) -> Self {
        let mut report = Self {
            frame,
            agents: diagnostics.len(),
            ..Default::default()
        };
        for diag in diagnostics {
            match diag.outcome {
                Outcome::Labeled => report.labeled += 1,
                Outcome::Unclassified => report.unclassified += 1,
                Outcome::InsufficientVisibility => report.insufficient_visibility += 1,
                Outcome::AreaTooSmall => report.area_too_small += 1,
            }
        }
        report
    }

    fn add(&mut self, other: &FrameReport) {
        self.agents += other.agents;
        self.labeled += other.labeled;
        self.unclassified += other.unclassified;
        self.insufficient_visibility += other.insufficient_visibility;
        self.area_too_small += other.area_too_small;
    }
}

/// Report over a whole labeling run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LabelingReport {
    pub frames: Vec<FrameReport>,
}

impl LabelingReport {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn add(&mut self, frame: FrameReport) {
        self.frames.push(frame);
    }

    /// Sums all frames. The `frame` field of the result is the frame count.
    pub fn totals(&self) -> FrameReport {
        let mut totals = FrameReport {
            frame: self.frames.len() as u64,
            ..Default::default()
        };
        for frame in &self.frames {
            totals.add(frame);
        }
        totals
    }
}

impl fmt::Display for LabelingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.totals();
        writeln!(
            f,
            "Labeled {} of {} agent(s) across {} frame(s)",
            totals.labeled,
            totals.agents,
            self.frames.len()
        )?;

        for frame in &self.frames {
            writeln!(
                f,
                "  frame {:06}: {} labeled, {} unclassified, {} not visible, {} too small",
                frame.frame,
                frame.labeled,
                frame.unclassified,
                frame.insufficient_visibility,
                frame.area_too_small
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    frame: u64,
    agent_id: Option<u64>,
    outcome: &'a str,
    class: Option<&'static str>,
    num_visible: usize,
    num_occluded: usize,
    num_outside: usize,
    area: Option<f64>,
}

/// Writes one CSV row per evaluated agent.
pub fn write_report_csv<'a, I>(path: &Path, rows: I) -> Result<(), SimlabelError>
where
    I: IntoIterator<Item = (u64, &'a Diagnostics)>,
{
    let csv_error = |source: csv::Error| SimlabelError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for (frame, diag) in rows {
        writer
            .serialize(CsvRow {
                frame,
                agent_id: diag.agent_id,
                outcome: diag.outcome.as_str(),
                class: diag.label.as_ref().map(|l| l.class.as_str()),
                num_visible: diag.stats.num_visible,
                num_occluded: diag.stats.num_occluded,
                num_outside: diag.stats.num_outside,
                area: diag.area,
            })
            .map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}
