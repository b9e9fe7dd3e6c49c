use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Luma};
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

/// Smallest edge, in pixels, of the rendered code. Large enough to survive
/// printing on an A4 invoice.
const MIN_DIMENSION: u32 = 300;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Render `text` as a black-on-white PNG QR code with medium (~15%) error
/// correction. Output is byte-identical for identical input.
pub fn render_png(text: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image).write_to(&mut buffer, ImageOutputFormat::Png)?;
    Ok(buffer.into_inner())
}
