//! Plain-text conversion.

use super::{Artifact, ConvertOptions, Progress};
use crate::error::{Error, Result};
use crate::extract::{extract_runs, ExtractProfile};
use crate::layout::{group_lines, page_text, LineGrouping};
use crate::package::download_name;
use crate::source::PdfSource;

/// Width of the rule drawn above and below a page banner.
pub const PAGE_BANNER_WIDTH: usize = 60;

const PAGE_RULE: char = '─';

fn page_banner(page_number: u32, total_pages: u32) -> String {
    let rule: String = std::iter::repeat(PAGE_RULE).take(PAGE_BANNER_WIDTH).collect();
    format!(
        "\n{rule}\n  PAGE {} of {}\n{rule}\n\n",
        page_number,
        total_pages,
        rule = rule
    )
}

/// Extract the text of every page into a single `.txt` artifact.
///
/// Multi-page documents get a banner above each page. Fails with
/// [`Error::EmptyExtraction`] when no page yields any text.
pub fn convert_to_text<F>(
    source: &dyn PdfSource,
    file_name: &str,
    options: &ConvertOptions,
    mut on_progress: F,
) -> Result<Vec<Artifact>>
where
    F: FnMut(Progress),
{
    let total = source.page_count();
    let mut pages = Vec::with_capacity(total as usize);
    let mut found_text = false;

    for index in 0..total {
        options.check_cancelled()?;
        let page_number = index + 1;

        let text = {
            let page = source.page(index)?;
            let runs = extract_runs(page.as_ref(), ExtractProfile::Text)?;
            let lines = group_lines(runs, &LineGrouping::TEXT);
            page_text(&lines).trim().to_string()
        };

        log::debug!("Page {}/{}: {} chars of text", page_number, total, text.len());
        found_text |= !text.is_empty();

        if total > 1 {
            pages.push(format!("{}{}", page_banner(page_number, total), text));
        } else {
            pages.push(text);
        }

        on_progress(Progress::of(page_number, total));
    }

    if !found_text {
        return Err(Error::EmptyExtraction);
    }

    let content = pages.join("\n\n");
    log::info!("Extracted {} bytes of text from {} pages", content.len(), total);

    Ok(vec![Artifact::new(
        download_name(file_name, "txt", None),
        content.into_bytes(),
        "text/plain",
    )])
}
