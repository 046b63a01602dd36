//! Plain-text serialization of reconstructed lines.

use super::line::Line;
use super::thresholds::{COLUMN_GAP_FACTOR, PARAGRAPH_GAP_FACTOR, WORD_GAP_FACTOR};

/// Separator inferred from the horizontal gap between two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Runs are adjacent (e.g. kerned letters split across runs).
    None,
    /// A word space.
    Space,
    /// A column or field break.
    Tab,
}

impl Separator {
    /// Classify a gap against the line's average font size.
    pub fn for_gap(gap: f32, average_font_size: f32) -> Self {
        if gap > average_font_size * COLUMN_GAP_FACTOR {
            Separator::Tab
        } else if gap > average_font_size * WORD_GAP_FACTOR {
            Separator::Space
        } else {
            Separator::None
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Separator::None => "",
            Separator::Space => " ",
            Separator::Tab => "\t",
        }
    }
}

/// Rebuild a line's text, inserting spaces and tabs from X gaps.
///
/// The returned text has its trailing whitespace trimmed.
pub fn line_text(line: &Line) -> String {
    let (text, _) = line
        .runs
        .iter()
        .fold((String::new(), 0.0_f32), |(mut text, last_end_x), run| {
            if last_end_x > 0.0 {
                let gap = run.x - last_end_x;
                text.push_str(Separator::for_gap(gap, line.average_font_size).as_str());
            }
            text.push_str(&run.text);
            (text, run.end_x())
        });

    text.trim_end().to_string()
}

/// Whether a line sits far enough below the previous one to open a paragraph.
pub fn is_paragraph_break(previous_y: f32, line: &Line) -> bool {
    previous_y > 0.0 && line.leftmost_y() - previous_y > line.average_font_size * PARAGRAPH_GAP_FACTOR
}

/// Serialize the lines of one page.
///
/// Each line ends with a newline; a blank line is inserted before a line
/// whose vertical gap from its predecessor exceeds the paragraph threshold.
pub fn page_text(lines: &[Line]) -> String {
    let (text, _) = lines
        .iter()
        .fold((String::new(), 0.0_f32), |(mut text, previous_y), line| {
            if is_paragraph_break(previous_y, line) {
                text.push('\n');
            }
            text.push_str(&line_text(line));
            text.push('\n');
            (text, line.leftmost_y())
        });

    text
}
