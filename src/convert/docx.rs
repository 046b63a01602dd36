//! Word-processing package assembly.

use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, LineSpacing, PageMargin, PageOrientationType, PageSize as DocxPageSize,
    Paragraph as DocxParagraph, Pic, Run, RunFonts, SectionProperty, Style, StyleType,
};

use crate::error::{Error, Result};
use crate::layout::{
    Alignment, HeadingLevel, Paragraph, ParagraphRun, LINE_PITCH, SPACING_AFTER, TWIPS_PER_INCH,
};
use crate::source::PageSize;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f32 = 914_400.0;

/// Letter page width in inches.
pub const PAGE_WIDTH_IN: f32 = 8.5;

/// Letter page height in inches.
pub const PAGE_HEIGHT_IN: f32 = 11.0;

/// Margin of the visual document in inches.
pub const VISUAL_MARGIN_IN: f32 = 0.5;

/// Margin of the editable document in inches.
pub const EDITABLE_MARGIN_IN: f32 = 0.75;

const BODY_FONT: &str = "Calibri";
const BODY_HALF_POINTS: usize = 24;
const HEADING_COLOR: &str = "2E74B5";

fn inches_to_twips(inches: f32) -> i32 {
    (inches * TWIPS_PER_INCH).floor() as i32
}

fn inches_to_emu(inches: f32) -> u32 {
    (inches * EMU_PER_INCH).round() as u32
}

fn margins(inches: f32) -> PageMargin {
    let twips = inches_to_twips(inches);
    PageMargin::new()
        .top(twips)
        .right(twips)
        .bottom(twips)
        .left(twips)
}

/// A rendered page ready to be placed in the visual document.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualPage {
    /// PNG bytes
    pub png: Vec<u8>,
    /// Bitmap width in pixels
    pub pixel_width: u32,
    /// Bitmap height in pixels
    pub pixel_height: u32,
    /// Picture width in inches
    pub width_in: f32,
    /// Picture height in inches
    pub height_in: f32,
    /// Whether the source page is wider than tall
    pub landscape: bool,
}

impl VisualPage {
    /// Fit a page picture into the letter content box, keeping its aspect.
    pub fn fit(png: Vec<u8>, pixel_width: u32, pixel_height: u32, size: PageSize) -> Self {
        let content_w = PAGE_WIDTH_IN - VISUAL_MARGIN_IN * 2.0;
        let content_h = PAGE_HEIGHT_IN - VISUAL_MARGIN_IN * 2.0;
        let aspect = size.aspect_ratio();

        let (mut width_in, mut height_in) = (content_w, content_w / aspect);
        if height_in > content_h {
            height_in = content_h;
            width_in = content_h * aspect;
        }

        Self {
            png,
            pixel_width,
            pixel_height,
            width_in,
            height_in,
            landscape: size.is_landscape(),
        }
    }

    /// Picture size in EMU.
    pub fn size_emu(&self) -> (u32, u32) {
        (inches_to_emu(self.width_in), inches_to_emu(self.height_in))
    }
}

fn pack(docx: Docx) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| Error::Encode(format!("failed to pack document: {}", e)))?;
    Ok(cursor.into_inner())
}

/// Page size in twips and orientation of a visual page's section.
fn visual_page_setup(page: &VisualPage) -> (u32, u32, PageOrientationType) {
    let page_w = inches_to_twips(PAGE_WIDTH_IN) as u32;
    let page_h = inches_to_twips(PAGE_HEIGHT_IN) as u32;

    if page.landscape {
        (page_h, page_w, PageOrientationType::Landscape)
    } else {
        (page_w, page_h, PageOrientationType::Portrait)
    }
}

/// Build the visual document: one centered page picture per page, each in
/// its own section oriented after the source page.
///
/// Every page but the last closes its section on the picture paragraph;
/// the last page uses the document's final section.
pub fn build_visual(pages: &[VisualPage]) -> Result<Vec<u8>> {
    let mut docx = Docx::new();

    for (index, page) in pages.iter().enumerate() {
        let (w, h) = page.size_emu();
        let pic = Pic::new_with_dimensions(page.png.clone(), page.pixel_width, page.pixel_height)
            .size(w, h);
        let mut paragraph = DocxParagraph::new()
            .add_run(Run::new().add_image(pic))
            .align(AlignmentType::Center);

        let (width, height, orient) = visual_page_setup(page);
        if index + 1 < pages.len() {
            paragraph = paragraph.section_property(
                SectionProperty::new()
                    .page_size(DocxPageSize::new().size(width, height))
                    .page_margin(margins(VISUAL_MARGIN_IN))
                    .page_orient(orient),
            );
        } else {
            docx = docx
                .page_size(width, height)
                .page_margin(margins(VISUAL_MARGIN_IN))
                .page_orient(orient);
        }
        docx = docx.add_paragraph(paragraph);
    }

    pack(docx)
}

fn heading_style(level: HeadingLevel) -> Style {
    let (name, half_points, before, after) = match level {
        HeadingLevel::H1 => ("Heading 1", 32, 240, 120),
        HeadingLevel::H2 => ("Heading 2", 26, 200, 100),
    };

    Style::new(level.style_id(), StyleType::Paragraph)
        .name(name)
        .size(half_points)
        .bold()
        .color(HEADING_COLOR)
        .line_spacing(LineSpacing::new().before(before).after(after))
}

fn docx_alignment(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
    }
}

fn docx_run(run: &ParagraphRun) -> Run {
    match run {
        ParagraphRun::Space => Run::new().add_text(" "),
        ParagraphRun::Text {
            text,
            bold,
            italic,
            half_points,
        } => {
            let mut out = Run::new().add_text(text.as_str()).size(*half_points);
            if *bold {
                out = out.bold();
            }
            if *italic {
                out = out.italic();
            }
            out
        }
    }
}

fn docx_paragraph(paragraph: &Paragraph) -> DocxParagraph {
    let spacing = LineSpacing::new()
        .before(paragraph.spacing_before)
        .after(SPACING_AFTER)
        .line(LINE_PITCH as i32);

    let mut out = paragraph
        .runs
        .iter()
        .fold(DocxParagraph::new(), |p, run| p.add_run(docx_run(run)))
        .align(docx_alignment(paragraph.alignment))
        .line_spacing(spacing);

    if let Some(level) = paragraph.heading {
        out = out.style(level.style_id());
    }
    if let Some(indent) = paragraph.indent_left {
        out = out.indent(Some(indent), None, None, None);
    }
    out
}

/// Paragraphs of one page in the editable document.
#[derive(Debug, Clone, Default)]
pub struct EditablePage {
    /// Classified paragraphs
    pub paragraphs: Vec<Paragraph>,
}

/// Build the editable document. Each non-empty page after the first is
/// preceded by an empty page-break paragraph.
pub fn build_editable(pages: &[EditablePage]) -> Result<Vec<u8>> {
    let mut docx = Docx::new()
        .default_fonts(RunFonts::new().ascii(BODY_FONT).hi_ansi(BODY_FONT))
        .default_size(BODY_HALF_POINTS)
        .add_style(heading_style(HeadingLevel::H1))
        .add_style(heading_style(HeadingLevel::H2))
        .page_margin(margins(EDITABLE_MARGIN_IN));

    for (index, page) in pages.iter().enumerate() {
        if index > 0 && !page.paragraphs.is_empty() {
            docx = docx.add_paragraph(DocxParagraph::new().page_break_before(true));
        }
        for paragraph in &page.paragraphs {
            docx = docx.add_paragraph(docx_paragraph(paragraph));
        }
    }

    pack(docx)
}
