use std::io::Cursor;

use bytes::Bytes;
use image::{ImageFormat, ImageReader};

/// Upper bound on the stored image payload.
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;
/// Inclusive bounds on the (square) side length in pixels.
pub const MIN_SIDE_PX: u32 = 500;
pub const MAX_SIDE_PX: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ImageRejection {
    #[error("payload is not a decodable image")]
    MalformedEncoding,
    #[error("image exceeds the 1 MiB limit")]
    TooLarge,
    #[error("only jpeg and png images are accepted")]
    UnsupportedFormat,
    #[error("image must be square")]
    NotSquare,
    #[error("image side must be between 500 and 1000 pixels")]
    ResolutionOutOfRange,
}

/// Validates an uploaded profile image. The checks run in a fixed order and
/// the first failure wins: size, container format, squareness, resolution.
/// Dimension checks only run once the container decoded, and any decode
/// error surfaces as `MalformedEncoding`. On success the bytes are returned
/// untouched; nothing is re-encoded.
pub fn validate_profile_image(bytes: Bytes) -> Result<Bytes, ImageRejection> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageRejection::TooLarge);
    }

    let format = image::guess_format(&bytes).map_err(|_| ImageRejection::MalformedEncoding)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(ImageRejection::UnsupportedFormat);
    }

    let reader = ImageReader::with_format(Cursor::new(bytes.as_ref()), format);
    let (width, height) = reader
        .into_dimensions()
        .map_err(|_| ImageRejection::MalformedEncoding)?;

    if width != height {
        return Err(ImageRejection::NotSquare);
    }
    if width < MIN_SIDE_PX || width > MAX_SIDE_PX {
        return Err(ImageRejection::ResolutionOutOfRange);
    }

    Ok(bytes)
}

/// Content type for stored bytes (png or jpeg after validation).
pub fn content_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        _ => "image/jpeg",
    }
}
