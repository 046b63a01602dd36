//! Layout reconstruction.
//!
//! Groups positioned glyph runs into reading-order lines, then serializes
//! them as plain text or classifies them into structured paragraphs.

mod line;
mod order;
mod paragraph;
mod text;
pub mod thresholds;

pub use line::{group_lines, Line, LineGrouping, SortTolerance};
pub use order::{cmp_f32, stable_sort_by};
pub use paragraph::{
    build_paragraphs, classify_alignment, classify_heading, indent_twips, paragraph_runs,
    spacing_before, Alignment, ContentBounds, DocumentStats, FontStatsAccumulator, HeadingLevel,
    Paragraph, ParagraphRun, LINE_PITCH, POINTS_PER_INCH, SPACING_AFTER, SPACING_LARGE,
    SPACING_NORMAL, TWIPS_PER_INCH,
};
pub use text::{is_paragraph_break, line_text, page_text, Separator};
