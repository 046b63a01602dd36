//! pdfium-backed page source.

use std::path::Path;

use pdfium_render::prelude::*;

use super::{Background, PageSize, PdfSource, RasterRequest, RawTextItem, SourcePage, Surface};
use crate::error::{Error, Result};

/// Environment variable naming a directory that contains the pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to the pdfium shared library.
///
/// Searches `$PDFIUM_LIB_PATH`, then the working directory, then the
/// system library path.
pub fn bind_pdfium() -> Result<Pdfium> {
    if let Ok(dir) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        let path = Pdfium::pdfium_platform_library_name_at_path(Path::new(&dir));
        log::debug!("Binding pdfium from {}", path.display());
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            Error::PdfLibrary(format!(
                "failed to load pdfium from {}={}: {:?}",
                PDFIUM_LIB_PATH_ENV, dir, e
            ))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| {
            Error::PdfLibrary(format!(
                "pdfium library not found ({:?}); install {} system-wide or set {}",
                e,
                Pdfium::pdfium_platform_library_name().to_string_lossy(),
                PDFIUM_LIB_PATH_ENV
            ))
        })?;

    Ok(Pdfium::new(bindings))
}

/// Concrete [`PdfSource`] backed by a pdfium document.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumSource<'a> {
    /// Open a document from an in-memory byte slice.
    ///
    /// Library failures are classified into [`Error::PasswordProtected`],
    /// [`Error::InvalidPdf`] or [`Error::PdfLibrary`].
    pub fn from_bytes(pdfium: &'a Pdfium, data: &'a [u8], password: Option<&'a str>) -> Result<Self> {
        let document = pdfium.load_pdf_from_byte_slice(data, password)?;
        log::debug!("Opened PDF with {} pages", document.pages().len());
        Ok(Self { document })
    }
}

impl PdfSource for PdfiumSource<'_> {
    fn page_count(&self) -> u32 {
        self.document.pages().len() as u32
    }

    fn page(&self, index: u32) -> Result<Box<dyn SourcePage + '_>> {
        let total = self.page_count();
        let page_index =
            u16::try_from(index).map_err(|_| Error::PageOutOfRange(index.saturating_add(1), total))?;
        let page = self.document.pages().get(page_index)?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

/// A loaded pdfium page. Dropping it closes the page inside pdfium.
pub struct PdfiumPage<'a> {
    page: PdfPage<'a>,
}

impl SourcePage for PdfiumPage<'_> {
    fn size(&self) -> PageSize {
        PageSize::new(self.page.width().value, self.page.height().value)
    }

    fn text_items(&self) -> Result<Vec<RawTextItem>> {
        let mut items = Vec::new();
        for object in self.page.objects().iter() {
            collect_text(&object, IDENTITY, &mut items);
        }
        Ok(items)
    }

    fn render(&self, request: &RasterRequest) -> Result<Surface> {
        let clear = match request.background {
            Background::Transparent => PdfColor::new(255, 255, 255, 0),
            Background::White => PdfColor::new(255, 255, 255, 255),
        };

        let config = PdfRenderConfig::new()
            .set_target_size(request.width as i32, request.height as i32)
            .set_clear_color(clear)
            .set_text_smoothing(true)
            .set_image_smoothing(true)
            .set_path_smoothing(true)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = self
            .page
            .render_with_config(&config)
            .map_err(|e| Error::Render(format!("failed to get a drawing context: {:?}", e)))?;

        Ok(Surface {
            width: bitmap.width().max(0) as u32,
            height: bitmap.height().max(0) as u32,
            pixels: bitmap.as_rgba_bytes(),
        })
    }
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Concatenate two PDF matrices: `inner` is applied first, then `outer`.
fn concat(inner: [f32; 6], outer: [f32; 6]) -> [f32; 6] {
    let [a, b, c, d, e, f] = inner;
    let [oa, ob, oc, od, oe, of] = outer;
    [
        a * oa + b * oc,
        a * ob + b * od,
        c * oa + d * oc,
        c * ob + d * od,
        e * oa + f * oc + oe,
        e * ob + f * od + of,
    ]
}

fn matrix_values(matrix: &PdfMatrix) -> [f32; 6] {
    [matrix.a(), matrix.b(), matrix.c(), matrix.d(), matrix.e(), matrix.f()]
}

/// Collect the text of one page object into `items`, descending into form
/// XObjects. `parent` maps the object's space to page space.
fn collect_text(object: &PdfPageObject, parent: [f32; 6], items: &mut Vec<RawTextItem>) {
    let matrix = match object.matrix() {
        Ok(matrix) => concat(matrix_values(&matrix), parent),
        Err(e) => {
            log::warn!("Skipping page object without a transform: {:?}", e);
            return;
        }
    };

    if let Some(form) = object.as_x_object_form_object() {
        for index in 0..form.len() {
            match form.get(index) {
                Ok(child) => collect_text(&child, matrix, items),
                Err(e) => log::warn!("Skipping unreadable form object {}: {:?}", index, e),
            }
        }
        return;
    }

    let Some(text_object) = object.as_text_object() else {
        return;
    };

    // pdfium keeps the font size outside the object matrix; fold it into the
    // scale components so the item carries a text rendering matrix.
    let size = text_object.unscaled_font_size().value;
    let [a, b, c, d, e, f] = matrix;
    let horizontal_scale = parent[0].hypot(parent[1]);

    items.push(RawTextItem {
        text: text_object.text(),
        transform: [a * size, b * size, c * size, d * size, e, f],
        width: object.width().ok().map(|width| width.value * horizontal_scale),
        font_name: text_object.font().name(),
    });
}
