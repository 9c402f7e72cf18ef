//! Image re-encoding for the binary asset route.

use std::io::Cursor;

use image::DynamicImage;

use crate::error::Result;
use crate::routing::classifier::ImageExtension;

/// Decodes `raw` (any supported format) and encodes it as `target`.
pub fn transcode(raw: &[u8], target: ImageExtension) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(raw)?;

    // JPEG has no alpha channel
    let decoded = match target {
        ImageExtension::Jpg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        _ => decoded,
    };

    let mut out = Cursor::new(Vec::new());
    decoded.write_to(&mut out, target.image_format())?;

    tracing::debug!(
        format = %target,
        width = decoded.width(),
        height = decoded.height(),
        bytes = out.get_ref().len(),
        "Image transcoded"
    );

    Ok(out.into_inner())
}
