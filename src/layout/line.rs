//! Grouping glyph runs into lines.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::order::{cmp_f32, stable_sort_by};
use super::thresholds::{
    TEXT_LINE_TOLERANCE, TEXT_SORT_Y_TOLERANCE, WORD_LINE_TOLERANCE, WORD_SORT_Y_TOLERANCE,
};
use crate::extract::GlyphRun;

/// How close two runs must be vertically to be ordered by X instead of Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortTolerance {
    /// A fixed distance in page units.
    Fixed(f32),
    /// A factor of the smaller of the two font sizes.
    SmallerFontSize(f32),
}

impl SortTolerance {
    fn between(&self, a: &GlyphRun, b: &GlyphRun) -> f32 {
        match *self {
            SortTolerance::Fixed(units) => units,
            SortTolerance::SmallerFontSize(factor) => a.font_size.min(b.font_size) * factor,
        }
    }
}

/// Parameters of the line grouping pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGrouping {
    /// Row tolerance used when ordering runs
    pub sort_tolerance: SortTolerance,
    /// A run further than `line_tolerance × font_size` from the line's
    /// anchor starts a new line
    pub line_tolerance: f32,
}

impl LineGrouping {
    /// Grouping used for plain-text output.
    pub const TEXT: LineGrouping = LineGrouping {
        sort_tolerance: SortTolerance::Fixed(TEXT_SORT_Y_TOLERANCE),
        line_tolerance: TEXT_LINE_TOLERANCE,
    };

    /// Grouping used for word output.
    pub const WORD: LineGrouping = LineGrouping {
        sort_tolerance: SortTolerance::SmallerFontSize(WORD_SORT_Y_TOLERANCE),
        line_tolerance: WORD_LINE_TOLERANCE,
    };

    /// Reading-order comparator: Y first, X within the row tolerance.
    pub fn compare(&self, a: &GlyphRun, b: &GlyphRun) -> Ordering {
        let y_diff = a.y - b.y;
        if y_diff.abs() > self.sort_tolerance.between(a, b) {
            cmp_f32(a.y, b.y)
        } else {
            cmp_f32(a.x, b.x)
        }
    }
}

/// A line of runs sharing a vertical band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Runs sorted left to right
    pub runs: Vec<GlyphRun>,
    /// Y of the run that opened the line
    pub y: f32,
    /// Leftmost run start
    pub min_x: f32,
    /// Rightmost run end
    pub max_x: f32,
    /// Mean font size of the runs
    pub average_font_size: f32,
    /// True if any run is bold
    pub is_bold: bool,
    /// True if any run is italic
    pub is_italic: bool,
}

impl Line {
    /// Finalize a line: re-sort by X and derive its attributes.
    ///
    /// Returns `None` for an empty run list.
    pub fn from_runs(runs: Vec<GlyphRun>, anchor_y: f32) -> Option<Self> {
        if runs.is_empty() {
            return None;
        }

        let runs = stable_sort_by(runs, &|a: &GlyphRun, b: &GlyphRun| cmp_f32(a.x, b.x));

        let min_x = runs.iter().map(|r| r.x).fold(f32::INFINITY, f32::min);
        let max_x = runs.iter().map(GlyphRun::end_x).fold(f32::NEG_INFINITY, f32::max);
        let average_font_size = runs.iter().map(|r| r.font_size).sum::<f32>() / runs.len() as f32;
        let is_bold = runs.iter().any(|r| r.is_bold);
        let is_italic = runs.iter().any(|r| r.is_italic);

        Some(Self {
            runs,
            y: anchor_y,
            min_x,
            max_x,
            average_font_size,
            is_bold,
            is_italic,
        })
    }

    /// Y of the leftmost run.
    pub fn leftmost_y(&self) -> f32 {
        self.runs.first().map(|r| r.y).unwrap_or(self.y)
    }

    /// Horizontal midpoint of the line.
    pub fn center_x(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }

    /// Concatenated run text without any inferred spacing.
    pub fn raw_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Running state of the grouping fold.
struct LineAccumulator {
    lines: Vec<Line>,
    current: Vec<GlyphRun>,
    anchor_y: Option<f32>,
}

impl LineAccumulator {
    fn flush(&mut self) {
        let runs = std::mem::take(&mut self.current);
        if let Some(line) = self.anchor_y.and_then(|y| Line::from_runs(runs, y)) {
            self.lines.push(line);
        }
    }
}

/// Group runs into lines ordered top to bottom.
///
/// Runs are put in reading order first, then walked once: a run whose
/// distance to the current line's anchor exceeds
/// `line_tolerance × run.font_size` opens a new line and becomes its
/// anchor.
pub fn group_lines(runs: Vec<GlyphRun>, grouping: &LineGrouping) -> Vec<Line> {
    let sorted = stable_sort_by(runs, &|a: &GlyphRun, b: &GlyphRun| grouping.compare(a, b));

    let initial = LineAccumulator {
        lines: Vec::new(),
        current: Vec::new(),
        anchor_y: None,
    };

    let mut acc = sorted.into_iter().fold(initial, |mut acc, run| {
        let threshold = run.font_size * grouping.line_tolerance;
        let starts_line = match acc.anchor_y {
            Some(anchor) => (run.y - anchor).abs() > threshold,
            None => true,
        };

        if starts_line {
            acc.flush();
            acc.anchor_y = Some(run.y);
        }
        acc.current.push(run);
        acc
    });
    acc.flush();

    log::debug!("Grouped runs into {} lines", acc.lines.len());
    acc.lines
}
