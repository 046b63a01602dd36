//! Structural classification of lines for word output.
//!
//! Each line becomes one paragraph. Heading levels are decided against
//! document-wide font statistics, which must be complete before the first
//! page is classified so every page uses the same thresholds.

use serde::{Deserialize, Serialize};

use super::line::Line;
use super::thresholds::{
    CENTER_TOLERANCE, HEADING_MAX_FACTOR, HEADING_SIZE_FACTOR, INDENT_THRESHOLD,
    LARGE_GAP_FACTOR, RIGHT_ALIGN_THRESHOLD, WORD_GAP_FACTOR,
};
use crate::extract::{GlyphRun, DEFAULT_FONT_SIZE};

/// Twips per inch (1 twip = 1/20 point).
pub const TWIPS_PER_INCH: f32 = 1440.0;

/// Page units (points) per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Spacing before a paragraph that follows a large vertical gap, in twips.
pub const SPACING_LARGE: u32 = 240;

/// Spacing before every other paragraph except a page's first, in twips.
pub const SPACING_NORMAL: u32 = 120;

/// Spacing after every paragraph, in twips.
pub const SPACING_AFTER: u32 = 60;

/// Line pitch in 240ths of a line (276 = 1.15 lines).
pub const LINE_PITCH: u32 = 276;

/// Document-wide font statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Largest font size seen
    pub max_font_size: f32,
    /// Mean font size over all non-blank runs
    pub average_font_size: f32,
}

/// Accumulator for [`DocumentStats`], fed one run at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontStatsAccumulator {
    max: f32,
    sum: f64,
    count: u64,
}

impl FontStatsAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one run. Whitespace-only runs are ignored.
    pub fn add_run(&mut self, run: &GlyphRun) {
        if run.text.trim().is_empty() {
            return;
        }
        self.max = self.max.max(run.font_size);
        self.sum += run.font_size as f64;
        self.count += 1;
    }

    /// Number of runs recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Finish the pass. An empty document averages to the default size.
    pub fn finish(&self) -> DocumentStats {
        let average_font_size = if self.count > 0 {
            (self.sum / self.count as f64) as f32
        } else {
            DEFAULT_FONT_SIZE
        };

        DocumentStats {
            max_font_size: self.max,
            average_font_size,
        }
    }
}

/// Heading level of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Title-sized heading
    H1,
    /// Subheading
    H2,
}

impl HeadingLevel {
    /// Paragraph style id in the word document.
    pub fn style_id(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "Heading1",
            HeadingLevel::H2 => "Heading2",
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    /// Left aligned
    #[default]
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParagraphRun {
    /// Styled text
    Text {
        /// The text content
        text: String,
        /// Bold face
        bold: bool,
        /// Italic face
        italic: bool,
        /// Size in half-points
        half_points: usize,
    },
    /// An inferred word space
    Space,
}

impl ParagraphRun {
    /// Build a styled text run from a glyph run.
    pub fn from_glyph_run(run: &GlyphRun) -> Self {
        ParagraphRun::Text {
            text: run.text.clone(),
            bold: run.is_bold,
            italic: run.is_italic,
            half_points: (run.font_size * 2.0).round() as usize,
        }
    }
}

/// A classified output paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline runs
    pub runs: Vec<ParagraphRun>,
    /// Heading level, if any
    pub heading: Option<HeadingLevel>,
    /// Alignment
    pub alignment: Alignment,
    /// Left indent in twips
    pub indent_left: Option<i32>,
    /// Spacing before in twips
    pub spacing_before: u32,
}

impl Paragraph {
    /// Plain text of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|run| match run {
                ParagraphRun::Text { text, .. } => text.as_str(),
                ParagraphRun::Space => " ",
            })
            .collect()
    }
}

/// Horizontal extent of a page's content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBounds {
    /// Smallest line start
    pub left: f32,
    /// Largest line end
    pub right: f32,
    /// Full page width
    pub page_width: f32,
}

impl ContentBounds {
    /// Measure the content bounds of a page's lines.
    pub fn measure(lines: &[Line], page_width: f32) -> Self {
        if lines.is_empty() {
            return Self {
                left: 0.0,
                right: page_width,
                page_width,
            };
        }

        Self {
            left: lines.iter().map(|l| l.min_x).fold(f32::INFINITY, f32::min),
            right: lines.iter().map(|l| l.max_x).fold(f32::NEG_INFINITY, f32::max),
            page_width,
        }
    }

    /// Midpoint of the content.
    pub fn center(&self) -> f32 {
        (self.left + self.right) / 2.0
    }
}

/// Decide the heading level of a line.
pub fn classify_heading(line: &Line, stats: &DocumentStats) -> Option<HeadingLevel> {
    let size = line.average_font_size;
    let oversized = size > stats.average_font_size * HEADING_SIZE_FACTOR;
    let bold_body = line.is_bold && size >= stats.average_font_size;

    if !(oversized || bold_body) {
        return None;
    }

    if size >= stats.max_font_size * HEADING_MAX_FACTOR {
        Some(HeadingLevel::H1)
    } else {
        Some(HeadingLevel::H2)
    }
}

/// Decide the alignment of a line within its page.
pub fn classify_alignment(line: &Line, bounds: &ContentBounds) -> Alignment {
    let centered = (line.center_x() - bounds.center()).abs() < bounds.page_width * CENTER_TOLERANCE;

    if centered {
        Alignment::Center
    } else if line.min_x > bounds.page_width * RIGHT_ALIGN_THRESHOLD {
        Alignment::Right
    } else {
        Alignment::Left
    }
}

/// Left indent of a line in twips, if it sits past the indent threshold.
pub fn indent_twips(line: &Line, bounds: &ContentBounds) -> Option<i32> {
    let offset = line.min_x - bounds.left;
    if offset > INDENT_THRESHOLD {
        Some((offset / POINTS_PER_INCH * TWIPS_PER_INCH).floor() as i32)
    } else {
        None
    }
}

/// Spacing before a line given the previous line's Y (0 for none).
pub fn spacing_before(index: usize, previous_y: f32, line: &Line) -> u32 {
    let gap = if previous_y > 0.0 { line.y - previous_y } else { 0.0 };

    if gap > line.average_font_size * LARGE_GAP_FACTOR {
        SPACING_LARGE
    } else if index == 0 {
        0
    } else {
        SPACING_NORMAL
    }
}

/// Inline runs of a line, with spaces inferred from X gaps.
pub fn paragraph_runs(line: &Line) -> Vec<ParagraphRun> {
    let (runs, _) = line
        .runs
        .iter()
        .fold((Vec::new(), 0.0_f32), |(mut runs, last_end_x), run| {
            if last_end_x > 0.0 && run.x - last_end_x > run.font_size * WORD_GAP_FACTOR {
                runs.push(ParagraphRun::Space);
            }
            runs.push(ParagraphRun::from_glyph_run(run));
            (runs, run.end_x())
        });
    runs
}

/// Classify the lines of one page into paragraphs.
pub fn build_paragraphs(lines: &[Line], page_width: f32, stats: &DocumentStats) -> Vec<Paragraph> {
    let bounds = ContentBounds::measure(lines, page_width);

    let (paragraphs, _) = lines.iter().enumerate().fold(
        (Vec::with_capacity(lines.len()), 0.0_f32),
        |(mut paragraphs, previous_y), (index, line)| {
            paragraphs.push(Paragraph {
                runs: paragraph_runs(line),
                heading: classify_heading(line, stats),
                alignment: classify_alignment(line, &bounds),
                indent_left: indent_twips(line, &bounds),
                spacing_before: spacing_before(index, previous_y, line),
            });
            (paragraphs, line.y)
        },
    );

    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_at(x: f32, width: f32, y: f32, size: f32, font: &str) -> Line {
        let run = GlyphRun::new("text", x, y, width, size).with_font(font);
        Line::from_runs(vec![run], y).unwrap()
    }

    const STATS: DocumentStats = DocumentStats {
        max_font_size: 24.0,
        average_font_size: 12.0,
    };

    #[test]
    fn test_stats_accumulator() {
        let mut acc = FontStatsAccumulator::new();
        acc.add_run(&GlyphRun::new("a", 0.0, 0.0, 1.0, 10.0));
        acc.add_run(&GlyphRun::new("b", 0.0, 0.0, 1.0, 20.0));
        acc.add_run(&GlyphRun::new("   ", 0.0, 0.0, 1.0, 90.0));
        let stats = acc.finish();
        assert_eq!(acc.count(), 2);
        assert_eq!(stats.max_font_size, 20.0);
        assert_eq!(stats.average_font_size, 15.0);
    }

    #[test]
    fn test_empty_stats_default_average() {
        let stats = FontStatsAccumulator::new().finish();
        assert_eq!(stats.average_font_size, DEFAULT_FONT_SIZE);
        assert_eq!(stats.max_font_size, 0.0);
    }

    #[test]
    fn test_large_line_is_h1() {
        let line = line_at(72.0, 100.0, 100.0, 24.0, "Helvetica");
        assert_eq!(classify_heading(&line, &STATS), Some(HeadingLevel::H1));
    }

    #[test]
    fn test_bold_line_below_max_is_h2() {
        // 21 >= 12 * 1.3 and bold, but 21 < 24 * 0.9 = 21.6.
        let line = line_at(72.0, 100.0, 100.0, 21.0, "Helvetica-Bold");
        assert_eq!(classify_heading(&line, &STATS), Some(HeadingLevel::H2));
    }

    #[test]
    fn test_bold_body_line_is_h2() {
        let line = line_at(72.0, 100.0, 100.0, 12.0, "Helvetica-Bold");
        assert_eq!(classify_heading(&line, &STATS), Some(HeadingLevel::H2));
    }

    #[test]
    fn test_body_line_is_not_heading() {
        let line = line_at(72.0, 100.0, 100.0, 12.0, "Helvetica");
        assert_eq!(classify_heading(&line, &STATS), None);

        let small_bold = line_at(72.0, 100.0, 100.0, 10.0, "Helvetica-Bold");
        assert_eq!(classify_heading(&small_bold, &STATS), None);
    }

    #[test]
    fn test_alignment() {
        let body = line_at(72.0, 468.0, 100.0, 12.0, "");
        let title = line_at(256.0, 100.0, 80.0, 24.0, "");
        let signature = line_at(400.0, 140.0, 700.0, 12.0, "");
        let lines = vec![title.clone(), body.clone(), signature.clone()];
        let bounds = ContentBounds::measure(&lines, 612.0);

        assert_eq!(bounds.left, 72.0);
        assert_eq!(bounds.right, 540.0);
        assert_eq!(classify_alignment(&title, &bounds), Alignment::Center);
        assert_eq!(classify_alignment(&body, &bounds), Alignment::Center);
        assert_eq!(classify_alignment(&signature, &bounds), Alignment::Right);

        let short = line_at(72.0, 100.0, 120.0, 12.0, "");
        assert_eq!(classify_alignment(&short, &bounds), Alignment::Left);
    }

    #[test]
    fn test_indent() {
        let bounds = ContentBounds {
            left: 72.0,
            right: 540.0,
            page_width: 612.0,
        };
        assert_eq!(indent_twips(&line_at(90.0, 10.0, 0.0, 12.0, ""), &bounds), None);
        assert_eq!(indent_twips(&line_at(92.0, 10.0, 0.0, 12.0, ""), &bounds), None);
        assert_eq!(
            indent_twips(&line_at(108.0, 10.0, 0.0, 12.0, ""), &bounds),
            Some(720)
        );
    }

    #[test]
    fn test_spacing_before() {
        let line = line_at(72.0, 10.0, 150.0, 10.0, "");
        assert_eq!(spacing_before(0, 0.0, &line), 0);
        assert_eq!(spacing_before(3, 140.0, &line), SPACING_NORMAL);
        assert_eq!(spacing_before(3, 132.0, &line), SPACING_NORMAL);
        assert_eq!(spacing_before(3, 131.0, &line), SPACING_LARGE);
        assert_eq!(spacing_before(0, 100.0, &line), SPACING_LARGE);
    }

    #[test]
    fn test_paragraph_runs_insert_spaces() {
        let runs = vec![
            GlyphRun::new("Hello", 10.0, 50.0, 25.0, 10.0).with_font("Arial-Bold"),
            GlyphRun::new("world", 40.0, 50.0, 25.0, 10.0),
            GlyphRun::new("!", 66.0, 50.0, 3.0, 10.0),
        ];
        let line = Line::from_runs(runs, 50.0).unwrap();
        let built = paragraph_runs(&line);

        assert_eq!(built.len(), 4);
        assert_eq!(built[1], ParagraphRun::Space);
        assert_eq!(
            built[0],
            ParagraphRun::Text {
                text: "Hello".into(),
                bold: true,
                italic: false,
                half_points: 20,
            }
        );
    }

    #[test]
    fn test_build_paragraphs() {
        let lines = vec![
            line_at(256.0, 100.0, 80.0, 24.0, "Arial-Bold"),
            line_at(72.0, 468.0, 130.0, 12.0, ""),
            line_at(72.0, 300.0, 145.0, 12.0, ""),
        ];
        let paragraphs = build_paragraphs(&lines, 612.0, &STATS);

        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].heading, Some(HeadingLevel::H1));
        assert_eq!(paragraphs[0].alignment, Alignment::Center);
        assert_eq!(paragraphs[0].spacing_before, 0);
        assert_eq!(paragraphs[1].spacing_before, SPACING_LARGE);
        assert_eq!(paragraphs[2].spacing_before, SPACING_NORMAL);
        assert_eq!(paragraphs[2].alignment, Alignment::Left);
        assert_eq!(paragraphs[1].plain_text(), "text");
    }
}
