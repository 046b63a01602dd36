//! Per-page raster conversion.

use super::{Artifact, ConvertOptions, ImageFormat, Progress};
use crate::error::Result;
use crate::package::download_name;
use crate::raster::{encode_jpeg, encode_png, flatten_onto_white, render_page, RenderSettings};
use crate::source::{Background, PdfSource};

/// Render every page to one image artifact.
///
/// Pages are rendered onto a transparent surface; JPEG output flattens the
/// alpha channel onto white before encoding.
pub fn convert_to_images<F>(
    source: &dyn PdfSource,
    file_name: &str,
    format: ImageFormat,
    options: &ConvertOptions,
    mut on_progress: F,
) -> Result<Vec<Artifact>>
where
    F: FnMut(Progress),
{
    let total = source.page_count();
    let settings = RenderSettings::new(options.image_scale)
        .with_device_pixel_ratio(options.device_pixel_ratio)
        .with_background(Background::Transparent);
    let mut artifacts = Vec::with_capacity(total as usize);

    for index in 0..total {
        options.check_cancelled()?;

        let content = {
            let page = source.page(index)?;
            let mut bitmap = render_page(page.as_ref(), &settings)?;
            match format {
                ImageFormat::Png => encode_png(&bitmap)?,
                ImageFormat::Jpg => {
                    flatten_onto_white(&mut bitmap.pixels);
                    encode_jpeg(&bitmap, options.jpeg_quality)?
                }
            }
        };

        log::debug!(
            "Page {}/{} encoded as {} ({} bytes)",
            index + 1,
            total,
            format.extension(),
            content.len()
        );

        artifacts.push(Artifact::new(
            download_name(file_name, format.extension(), Some(index)),
            content,
            format.mime_type(),
        ));
        on_progress(Progress::of(index + 1, total));
    }

    log::info!("Converted {} pages to {}", total, format.extension());
    Ok(artifacts)
}
