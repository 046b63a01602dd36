//! Heuristic thresholds for line, paragraph and heading recovery.
//!
//! These values encode accepted output, not a layout model. Factors are
//! multiples of a font size unless noted otherwise.

/// Line break tolerance for plain-text output.
pub const TEXT_LINE_TOLERANCE: f32 = 0.7;

/// Line break tolerance for word output.
pub const WORD_LINE_TOLERANCE: f32 = 0.6;

/// Y distance (page units) under which plain-text runs are ordered by X.
pub const TEXT_SORT_Y_TOLERANCE: f32 = 3.0;

/// Y distance (× smaller font size) under which word runs are ordered by X.
pub const WORD_SORT_Y_TOLERANCE: f32 = 0.5;

/// Horizontal gap that reads as a word space.
pub const WORD_GAP_FACTOR: f32 = 0.3;

/// Horizontal gap that reads as a column or field separator (tab).
pub const COLUMN_GAP_FACTOR: f32 = 2.0;

/// Vertical gap that starts a new paragraph in plain-text output.
pub const PARAGRAPH_GAP_FACTOR: f32 = 2.0;

/// Size over the document average that marks a heading.
pub const HEADING_SIZE_FACTOR: f32 = 1.3;

/// Share of the document maximum a level-1 heading must reach.
pub const HEADING_MAX_FACTOR: f32 = 0.9;

/// Vertical gap that earns a paragraph double spacing before it.
pub const LARGE_GAP_FACTOR: f32 = 1.8;

/// Distance from the content center (× page width) still read as centered.
pub const CENTER_TOLERANCE: f32 = 0.1;

/// Left edge (× page width) past which a line reads as right-aligned.
pub const RIGHT_ALIGN_THRESHOLD: f32 = 0.5;

/// Offset from the left margin (page units) that counts as an indent.
pub const INDENT_THRESHOLD: f32 = 20.0;
