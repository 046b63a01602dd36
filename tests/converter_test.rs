//! Integration tests for the converters, driven by the in-memory source.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pdfquick::convert::{
    convert, convert_to_images, convert_to_text, convert_to_word, convert_to_word_visual,
    ConvertOptions, ImageFormat, OutputFormat, Progress, DOCX_MIME_TYPE,
};
use pdfquick::error::Error;
use pdfquick::source::{MemoryPage, MemorySource, PageSize, RawTextItem};

/// Small scale keeps rendered fixtures tiny (61 x 79 for a letter page).
fn fast_options() -> ConvertOptions {
    ConvertOptions::new().with_image_scale(0.1).with_word_scale(0.1)
}

fn text(s: &str, x: f32, y: f32, size: f32) -> RawTextItem {
    RawTextItem::new(s, x, y, size).with_width(s.len() as f32 * size * 0.5)
}

fn body_page(lines: &[&str]) -> MemoryPage {
    let items = lines
        .iter()
        .enumerate()
        .map(|(i, line)| text(line, 72.0, 700.0 - i as f32 * 14.0, 12.0));
    MemoryPage::letter().with_items(items)
}

fn report_document() -> MemorySource {
    let title = text("Annual Report", 231.0, 740.0, 24.0).with_font("Helvetica-Bold");
    let first = MemoryPage::letter()
        .with_item(title)
        .with_items(body_page(&["Revenue grew this year.", "Costs stayed flat."]).items);

    MemorySource::new(vec![
        first,
        body_page(&["Second page text."]),
        body_page(&["Third page text."]),
    ])
}

fn zip_entry(archive: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).unwrap();
    let mut file = zip.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

// ==================== Images ====================

#[test]
fn test_png_one_artifact_per_page() {
    let source = report_document();
    let mut progress = Vec::new();

    let artifacts = convert_to_images(&source, "report.pdf", ImageFormat::Png, &fast_options(), |p| {
        progress.push(p)
    })
    .unwrap();

    let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["report_page1.png", "report_page2.png", "report_page3.png"]);
    assert!(artifacts.iter().all(|a| a.mime_type == "image/png"));
    assert!(artifacts.iter().all(|a| a.content.starts_with(b"\x89PNG")));

    let percents: Vec<_> = progress.iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![33, 67, 100]);
    assert_eq!(progress[2].current_page, 3);
    assert_eq!(progress[2].total_pages, 3);
}

#[test]
fn test_png_keeps_transparency() {
    let source = MemorySource::new(vec![MemoryPage::letter().with_ink([200, 0, 0, 128])]);
    let artifacts =
        convert_to_images(&source, "ink.pdf", ImageFormat::Png, &fast_options(), |_| {}).unwrap();

    let decoded = image::load_from_memory(&artifacts[0].content).unwrap().to_rgba8();
    assert_eq!(decoded.width(), 61);
    assert_eq!(decoded.height(), 79);
    assert_eq!(decoded.get_pixel(0, 0).0[3], 128);
}

#[test]
fn test_jpg_is_flattened_onto_white() {
    let source = MemorySource::new(vec![MemoryPage::letter().with_ink([200, 0, 0, 128])]);
    let artifacts =
        convert_to_images(&source, "ink.pdf", ImageFormat::Jpg, &fast_options(), |_| {}).unwrap();

    assert_eq!(artifacts[0].name, "ink_page1.jpg");
    assert_eq!(artifacts[0].mime_type, "image/jpeg");

    let decoded = image::load_from_memory(&artifacts[0].content).unwrap().to_rgba8();
    let [r, g, b, a] = decoded.get_pixel(30, 40).0;
    assert_eq!(a, 255);
    // 200 * 128/255 + 255 * 127/255 = 227; 0 channels become 127.
    assert!((r as i32 - 227).abs() <= 8, "r = {}", r);
    assert!((g as i32 - 127).abs() <= 8, "g = {}", g);
    assert!((b as i32 - 127).abs() <= 8, "b = {}", b);
}

#[test]
fn test_render_failure_aborts_images() {
    let source = MemorySource::new(vec![MemoryPage::letter(), MemoryPage::letter().unrenderable()]);
    let mut calls = 0;
    let result = convert_to_images(&source, "x.pdf", ImageFormat::Png, &fast_options(), |_| {
        calls += 1
    });

    assert!(matches!(result, Err(Error::Render(_))));
    assert_eq!(calls, 1);
}

#[test]
fn test_device_pixel_ratio_scales_backing_store() {
    let source = MemorySource::new(vec![MemoryPage::new(PageSize::new(100.0, 50.0))]);
    let options = ConvertOptions::new()
        .with_image_scale(1.0)
        .with_device_pixel_ratio(2.0);
    let artifacts = convert_to_images(&source, "x.pdf", ImageFormat::Png, &options, |_| {}).unwrap();

    let decoded = image::load_from_memory(&artifacts[0].content).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (200, 100));
}

// ==================== Text ====================

#[test]
fn test_single_page_text_has_no_banner() {
    let source = MemorySource::new(vec![body_page(&["Hello world", "Second line"])]);
    let artifacts = convert_to_text(&source, "memo.PDF", &fast_options(), |_| {}).unwrap();

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "memo.txt");
    assert_eq!(artifacts[0].mime_type, "text/plain");

    let content = String::from_utf8(artifacts[0].content.clone()).unwrap();
    assert_eq!(content, "Hello world\nSecond line");
    assert!(!content.contains("PAGE"));
}

#[test]
fn test_multi_page_text_has_numbered_banners() {
    let source = report_document();
    let artifacts = convert_to_text(&source, "report.pdf", &fast_options(), |_| {}).unwrap();
    let content = String::from_utf8(artifacts[0].content.clone()).unwrap();

    assert_eq!(content.matches("  PAGE ").count(), 3);
    let first = content.find("PAGE 1 of 3").unwrap();
    let second = content.find("PAGE 2 of 3").unwrap();
    let third = content.find("PAGE 3 of 3").unwrap();
    assert!(first < second && second < third);

    let rule = "─".repeat(60);
    assert!(content.starts_with(&format!("\n{}\n  PAGE 1 of 3\n{}\n\n", rule, rule)));
    assert!(content.contains(&format!("Second page text.\n\n\n{}", rule)));
}

#[test]
fn test_title_is_its_own_line_without_tabs() {
    let source = report_document();
    let artifacts = convert_to_text(&source, "report.pdf", &fast_options(), |_| {}).unwrap();
    let content = String::from_utf8(artifacts[0].content.clone()).unwrap();

    assert!(content.contains("\nAnnual Report\n\nRevenue grew this year.\nCosts stayed flat."));
    let title_line = content.lines().find(|l| l.contains("Annual Report")).unwrap();
    assert_eq!(title_line, "Annual Report");
}

#[test]
fn test_text_inline_separators() {
    let page = MemoryPage::letter()
        .with_item(RawTextItem::new("Name:", 72.0, 700.0, 12.0).with_width(30.0))
        .with_item(RawTextItem::new("Jane", 106.0, 700.0, 12.0).with_width(24.0))
        .with_item(RawTextItem::new("42", 300.0, 700.0, 12.0).with_width(12.0));
    let source = MemorySource::new(vec![page]);

    let artifacts = convert_to_text(&source, "form.pdf", &fast_options(), |_| {}).unwrap();
    assert_eq!(artifacts[0].content, b"Name: Jane\t42".to_vec());
}

#[test]
fn test_paragraph_gap_threshold() {
    // 12pt lines: a 24-unit drop stays in the paragraph, 25 opens a new one.
    let page = MemoryPage::letter()
        .with_item(text("one", 72.0, 700.0, 12.0))
        .with_item(text("two", 72.0, 676.0, 12.0))
        .with_item(text("three", 72.0, 651.0, 12.0));
    let source = MemorySource::new(vec![page]);

    let artifacts = convert_to_text(&source, "gap.pdf", &fast_options(), |_| {}).unwrap();
    assert_eq!(artifacts[0].content, b"one\ntwo\n\nthree".to_vec());
}

#[test]
fn test_empty_document_text_fails() {
    let source = MemorySource::new(vec![MemoryPage::letter(), MemoryPage::letter()]);
    let result = convert_to_text(&source, "scan.pdf", &fast_options(), |_| {});
    assert!(matches!(result, Err(Error::EmptyExtraction)));

    let whitespace = MemorySource::new(vec![MemoryPage::letter().with_item(text("   ", 72.0, 700.0, 12.0))]);
    let result = convert_to_text(&whitespace, "scan.pdf", &fast_options(), |_| {});
    assert!(matches!(result, Err(Error::EmptyExtraction)));
}

#[test]
fn test_text_pages_are_released() {
    let source = report_document();
    convert_to_text(&source, "report.pdf", &fast_options(), |_| {}).unwrap();
    assert_eq!(source.released_pages(), 3);
}

#[test]
fn test_text_does_not_render() {
    let source = MemorySource::new(vec![body_page(&["still readable"]).unrenderable()]);
    let artifacts = convert_to_text(&source, "x.pdf", &fast_options(), |_| {}).unwrap();
    assert_eq!(artifacts[0].content, b"still readable".to_vec());
}

// ==================== Word ====================

#[test]
fn test_word_produces_visual_then_editable() {
    let source = report_document();
    let mut progress = Vec::new();

    let artifacts = convert_to_word(&source, "report.pdf", &fast_options(), |p| progress.push(p)).unwrap();

    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].name, "report_VISUAL.docx");
    assert_eq!(artifacts[1].name, "report_EDITABLE.docx");
    for artifact in &artifacts {
        assert_eq!(artifact.mime_type, DOCX_MIME_TYPE);
        assert!(artifact.content.starts_with(b"PK\x03\x04"));
    }

    let percents: Vec<_> = progress.iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![17, 33, 50, 67, 83, 100]);
    let pages: Vec<_> = progress.iter().map(|p| p.current_page).collect();
    assert_eq!(pages, vec![1, 2, 3, 1, 2, 3]);
}

#[test]
fn test_editable_document_marks_title_heading() {
    let source = report_document();
    let artifacts = convert_to_word(&source, "report.pdf", &fast_options(), |_| {}).unwrap();

    let xml = zip_entry(&artifacts[1].content, "word/document.xml");
    assert!(xml.contains("Heading1"));
    assert!(xml.contains("Annual Report"));
    assert!(xml.contains("Third page text."));
}

#[test]
fn test_visual_document_has_a_section_per_page() {
    let source = MemorySource::new(vec![
        MemoryPage::letter(),
        MemoryPage::new(PageSize::new(792.0, 612.0)),
        MemoryPage::letter(),
    ]);
    let visual = convert_to_word_visual(&source, "mixed.pdf", &fast_options(), |_| {}).unwrap();

    let xml = zip_entry(&visual.content, "word/document.xml");
    assert_eq!(xml.matches("<pic:pic").count(), 3);
    assert_eq!(xml.matches("<w:sectPr").count(), 3);
    assert_eq!(xml.matches("w:orient=\"landscape\"").count(), 1);
    assert_eq!(xml.matches("w:orient=\"portrait\"").count(), 2);
    assert!(!xml.contains("w:pageBreakBefore"));
}

#[test]
fn test_visual_landscape_section_is_swapped() {
    let source = MemorySource::new(vec![MemoryPage::new(PageSize::new(792.0, 612.0))]);
    let visual = convert_to_word_visual(&source, "wide.pdf", &fast_options(), |_| {}).unwrap();

    let xml = zip_entry(&visual.content, "word/document.xml");
    assert!(xml.contains("w:w=\"15840\" w:h=\"12240\" w:orient=\"landscape\""));
}

#[test]
fn test_editable_page_breaks_skip_empty_pages() {
    let source = MemorySource::new(vec![
        body_page(&["First page text."]),
        MemoryPage::letter(),
        body_page(&["Third page text."]),
    ]);
    let artifacts = convert_to_word(&source, "gaps.pdf", &fast_options(), |_| {}).unwrap();

    let xml = zip_entry(&artifacts[1].content, "word/document.xml");
    assert_eq!(xml.matches("<w:pageBreakBefore").count(), 1);
    assert!(xml.find("First page text.") < xml.find("<w:pageBreakBefore"));
    assert!(xml.find("<w:pageBreakBefore") < xml.find("Third page text."));
}

#[test]
fn test_editable_heading_styles_carry_spacing() {
    let source = report_document();
    let artifacts = convert_to_word(&source, "report.pdf", &fast_options(), |_| {}).unwrap();

    let styles = zip_entry(&artifacts[1].content, "word/styles.xml");
    assert!(styles.contains("w:styleId=\"Heading1\""));
    assert!(styles.contains("w:before=\"240\" w:after=\"120\""));
    assert!(styles.contains("w:before=\"200\" w:after=\"100\""));
}

#[test]
fn test_empty_document_word_fails_but_visual_succeeds() {
    let source = MemorySource::new(vec![MemoryPage::letter(), MemoryPage::letter()]);

    let result = convert_to_word(&source, "scan.pdf", &fast_options(), |_| {});
    assert!(matches!(result, Err(Error::EmptyExtraction)));

    let mut calls = 0;
    let visual = convert_to_word_visual(&source, "scan.pdf", &fast_options(), |_| calls += 1).unwrap();
    assert_eq!(visual.name, "scan_VISUAL.docx");
    assert!(visual.content.starts_with(b"PK"));
    assert_eq!(calls, 2);
}

// ==================== Dispatch and cancellation ====================

#[test]
fn test_dispatch_by_format() {
    let source = report_document();
    let options = fast_options();

    let png = convert(&source, "r.pdf", OutputFormat::Png, &options, |_| {}).unwrap();
    let txt = convert(&source, "r.pdf", OutputFormat::Txt, &options, |_| {}).unwrap();
    let docx = convert(&source, "r.pdf", OutputFormat::Docx, &options, |_| {}).unwrap();

    assert_eq!(png.len(), 3);
    assert_eq!(txt.len(), 1);
    assert_eq!(docx.len(), 2);
}

#[test]
fn test_dispatch_rejects_invalid_options() {
    let source = report_document();
    let options = ConvertOptions::new().with_image_scale(-1.0);
    let result = convert(&source, "r.pdf", OutputFormat::Png, &options, |_| {});
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_cancel_before_start() {
    let flag = Arc::new(AtomicBool::new(true));
    let options = fast_options().with_cancel_flag(flag);
    let source = report_document();

    let mut seen: Vec<Progress> = Vec::new();
    let result = convert_to_images(&source, "r.pdf", ImageFormat::Png, &options, |p| seen.push(p));
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(seen.is_empty());
}

#[test]
fn test_cancel_between_pages() {
    let flag = Arc::new(AtomicBool::new(false));
    let options = fast_options().with_cancel_flag(flag.clone());
    let source = report_document();

    let mut calls = 0;
    let result = convert_to_text(&source, "r.pdf", &options, |_| {
        calls += 1;
        flag.store(true, Ordering::Relaxed);
    });

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(calls, 1);
    assert_eq!(source.released_pages(), 1);
}
