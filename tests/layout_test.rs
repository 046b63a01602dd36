//! Integration tests for layout reconstruction over extracted pages.

use pdfquick::convert::{document_stats, ConvertOptions};
use pdfquick::extract::{extract_runs, ExtractProfile};
use pdfquick::layout::{
    build_paragraphs, group_lines, page_text, Alignment, HeadingLevel, LineGrouping,
    ParagraphRun, SPACING_LARGE, SPACING_NORMAL,
};
use pdfquick::source::{MemoryPage, MemorySource, PdfSource, RawTextItem};

fn item(s: &str, x: f32, y: f32, size: f32, font: &str) -> RawTextItem {
    RawTextItem::new(s, x, y, size)
        .with_width(s.len() as f32 * size * 0.5)
        .with_font(font)
}

/// Three letter pages of 12pt body text with a 24pt bold title and a
/// 14pt bold subheading on page 1.
fn three_page_report() -> MemorySource {
    let first = MemoryPage::letter()
        .with_item(item("Quarterly Summary", 138.0, 740.0, 24.0, "Arial-BoldMT"))
        .with_item(item("Sales rose in every region", 72.0, 700.0, 12.0, "ArialMT"))
        .with_item(item("while costs held steady.", 72.0, 686.0, 12.0, "ArialMT"))
        .with_item(item("Outlook", 72.0, 650.0, 14.0, "Arial-BoldMT"))
        .with_item(item("Growth should continue.", 108.0, 636.0, 12.0, "Arial-ItalicMT"));
    let second = MemoryPage::letter()
        .with_item(item("Second page body text.", 72.0, 700.0, 12.0, "ArialMT"));
    let third = MemoryPage::letter()
        .with_item(item("Third page body text.", 72.0, 700.0, 12.0, "ArialMT"));

    MemorySource::new(vec![first, second, third])
}

#[test]
fn test_document_statistics() {
    let source = three_page_report();
    let stats = document_stats(&source, &ConvertOptions::default()).unwrap();

    assert_eq!(stats.max_font_size, 24.0);
    // (24 + 14 + 12 * 5) / 7
    assert!((stats.average_font_size - 14.0).abs() < 1e-4);
    assert_eq!(source.released_pages(), 3);
}

#[test]
fn test_title_is_centered_h1() {
    let source = three_page_report();
    let stats = document_stats(&source, &ConvertOptions::default()).unwrap();

    let page = source.page(0).unwrap();
    let runs = extract_runs(page.as_ref(), ExtractProfile::Word).unwrap();
    let lines = group_lines(runs, &LineGrouping::WORD);
    let paragraphs = build_paragraphs(&lines, page.size().width, &stats);

    assert_eq!(paragraphs.len(), 5);

    let title = &paragraphs[0];
    assert_eq!(title.plain_text(), "Quarterly Summary");
    assert_eq!(title.heading, Some(HeadingLevel::H1));
    assert_eq!(title.alignment, Alignment::Center);
    assert_eq!(title.spacing_before, 0);
    assert!(matches!(
        title.runs[0],
        ParagraphRun::Text { bold: true, half_points: 48, .. }
    ));

    // Body text is not a heading.
    assert_eq!(paragraphs[1].heading, None);
    assert_eq!(paragraphs[1].spacing_before, SPACING_LARGE);
    assert_eq!(paragraphs[2].spacing_before, SPACING_NORMAL);

    // A bold line at the average size is a subheading.
    assert_eq!(paragraphs[3].plain_text(), "Outlook");
    assert_eq!(paragraphs[3].heading, Some(HeadingLevel::H2));
    assert_eq!(paragraphs[3].alignment, Alignment::Left);

    // Half an inch past the left content edge.
    assert_eq!(paragraphs[4].indent_left, Some(720));
    assert!(matches!(
        paragraphs[4].runs[0],
        ParagraphRun::Text { italic: true, .. }
    ));
}

#[test]
fn test_text_profile_reading_order() {
    let page = MemoryPage::letter()
        .with_item(item("right", 300.0, 700.0, 12.0, ""))
        .with_item(item("second line", 72.0, 680.0, 12.0, ""))
        .with_item(item("left", 72.0, 701.0, 12.0, ""));
    let source = MemorySource::new(vec![page]);

    let loaded = source.page(0).unwrap();
    let runs = extract_runs(loaded.as_ref(), ExtractProfile::Text).unwrap();
    let lines = group_lines(runs, &LineGrouping::TEXT);

    assert_eq!(lines.len(), 2);
    let xs: Vec<f32> = lines[0].runs.iter().map(|r| r.x).collect();
    assert_eq!(xs, vec![72.0, 300.0]);
    assert_eq!(page_text(&lines), "left\tright\nsecond line\n");
}
