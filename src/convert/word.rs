//! Word conversion: a visual document of page pictures and an editable
//! document of classified paragraphs.
//!
//! The two documents are built by independent passes over the pages, after a
//! statistics pass that fixes the heading thresholds for the whole
//! document.

use super::docx::{build_editable, build_visual, EditablePage, VisualPage};
use super::{Artifact, ConvertOptions, Progress, DOCX_MIME_TYPE};
use crate::error::{Error, Result};
use crate::extract::{extract_runs, ExtractProfile};
use crate::layout::{build_paragraphs, group_lines, DocumentStats, FontStatsAccumulator, LineGrouping};
use crate::package::base_name;
use crate::raster::{encode_png, render_page, RenderSettings};
use crate::source::{Background, PdfSource};

/// Collect font statistics over every page.
pub fn document_stats(source: &dyn PdfSource, options: &ConvertOptions) -> Result<DocumentStats> {
    let mut acc = FontStatsAccumulator::new();

    for index in 0..source.page_count() {
        options.check_cancelled()?;
        let page = source.page(index)?;
        for run in extract_runs(page.as_ref(), ExtractProfile::Word)? {
            acc.add_run(&run);
        }
    }

    let stats = acc.finish();
    log::debug!(
        "Font statistics over {} runs: max {:.1}, average {:.2}",
        acc.count(),
        stats.max_font_size,
        stats.average_font_size
    );
    Ok(stats)
}

fn visual_pass<F>(source: &dyn PdfSource, options: &ConvertOptions, on_progress: &mut F) -> Result<Vec<u8>>
where
    F: FnMut(Progress),
{
    let total = source.page_count();
    let settings = RenderSettings::new(options.word_scale)
        .with_device_pixel_ratio(options.device_pixel_ratio)
        .with_background(Background::White);
    let mut pages = Vec::with_capacity(total as usize);

    for index in 0..total {
        options.check_cancelled()?;

        let visual = {
            let page = source.page(index)?;
            let bitmap = render_page(page.as_ref(), &settings)?;
            let png = encode_png(&bitmap)?;
            VisualPage::fit(png, bitmap.width, bitmap.height, page.size())
        };
        pages.push(visual);

        on_progress(Progress::within(index + 1, total, 0, 50));
    }

    build_visual(&pages)
}

fn editable_pass<F>(
    source: &dyn PdfSource,
    stats: &DocumentStats,
    options: &ConvertOptions,
    on_progress: &mut F,
) -> Result<Vec<u8>>
where
    F: FnMut(Progress),
{
    let total = source.page_count();
    let mut pages = Vec::with_capacity(total as usize);
    let mut paragraph_count = 0;
    let mut found_text = false;

    for index in 0..total {
        options.check_cancelled()?;

        let paragraphs = {
            let page = source.page(index)?;
            let runs = extract_runs(page.as_ref(), ExtractProfile::Word)?;
            let lines = group_lines(runs, &LineGrouping::WORD);
            build_paragraphs(&lines, page.size().width, stats)
        };
        paragraph_count += paragraphs.len();
        found_text |= paragraphs.iter().any(|p| !p.plain_text().trim().is_empty());
        pages.push(EditablePage { paragraphs });

        on_progress(Progress::within(index + 1, total, 50, 50));
    }

    if !found_text {
        return Err(Error::EmptyExtraction);
    }

    log::debug!("Classified {} paragraphs", paragraph_count);
    build_editable(&pages)
}

/// Build only the visual document.
///
/// Does not depend on the text layer, so it succeeds on scanned documents.
pub fn convert_to_word_visual<F>(
    source: &dyn PdfSource,
    file_name: &str,
    options: &ConvertOptions,
    mut on_progress: F,
) -> Result<Artifact>
where
    F: FnMut(Progress),
{
    let content = visual_pass(source, options, &mut on_progress)?;
    Ok(Artifact::new(
        format!("{}_VISUAL.docx", base_name(file_name)),
        content,
        DOCX_MIME_TYPE,
    ))
}

/// Build the visual and editable documents, in that order.
///
/// Progress runs 0-50 through the visual pass and 50-100 through the
/// editable pass. Fails with [`Error::EmptyExtraction`] when the editable
/// pass finds no text.
pub fn convert_to_word<F>(
    source: &dyn PdfSource,
    file_name: &str,
    options: &ConvertOptions,
    mut on_progress: F,
) -> Result<Vec<Artifact>>
where
    F: FnMut(Progress),
{
    let stats = document_stats(source, options)?;

    let visual = convert_to_word_visual(source, file_name, options, &mut on_progress)?;
    let editable = editable_pass(source, &stats, options, &mut on_progress)?;

    log::info!(
        "Built word documents for {} pages ({} + {} bytes)",
        source.page_count(),
        visual.len(),
        editable.len()
    );

    Ok(vec![
        visual,
        Artifact::new(
            format!("{}_EDITABLE.docx", base_name(file_name)),
            editable,
            DOCX_MIME_TYPE,
        ),
    ])
}
