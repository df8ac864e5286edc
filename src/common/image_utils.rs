use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::api::oracle_structs::BoundingBox;

/// Context margin added around a detected box, as a fraction of the box
/// width/height on each side.
pub const CROP_MARGIN: f32 = 0.2;
pub const CROP_JPEG_QUALITY: u8 = 85;

const BOX_SCALE: f32 = 1000.0;

#[derive(Debug, Error)]
pub enum CropError {
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("degenerate crop box")]
    EmptyBox,
}

/// A pixel-space crop rectangle. Invariant once built from a non-degenerate
/// box: `0 <= left < right <= width` and `0 <= top < bottom <= height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Converts a normalized box to pixel coordinates, pads it by
/// [`CROP_MARGIN`] on each axis and clamps every edge to the image.
#[must_use]
pub fn crop_rect(bounding_box: &BoundingBox, width: u32, height: u32) -> CropRect {
    let w = width as f32;
    let h = height as f32;

    let left = bounding_box.xmin as f32 / BOX_SCALE * w;
    let top = bounding_box.ymin as f32 / BOX_SCALE * h;
    let right = bounding_box.xmax as f32 / BOX_SCALE * w;
    let bottom = bounding_box.ymax as f32 / BOX_SCALE * h;

    let margin_x = (right - left) * CROP_MARGIN;
    let margin_y = (bottom - top) * CROP_MARGIN;

    let left = (left - margin_x).max(0.0);
    let top = (top - margin_y).max(0.0);
    let right = (right + margin_x).min(w);
    let bottom = (bottom + margin_y).min(h);

    CropRect {
        left: left.floor() as u32,
        top: top.floor() as u32,
        right: (right.ceil() as u32).min(width),
        bottom: (bottom.ceil() as u32).min(height),
    }
}

/// Cuts the padded face region out of the encoded image and re-encodes it
/// as JPEG.
///
/// # Errors
/// When the image cannot be decoded, the box is degenerate, or encoding
/// fails.
pub fn crop_face(image_bytes: &[u8], bounding_box: &BoundingBox) -> Result<Vec<u8>, CropError> {
    let img = image::load_from_memory(image_bytes)?;
    let rect = crop_rect(bounding_box, img.width(), img.height());
    if rect.right <= rect.left || rect.bottom <= rect.top {
        return Err(CropError::EmptyBox);
    }

    // JPEG has no alpha channel, so flatten to RGB before encoding.
    let cropped = img
        .crop_imm(
            rect.left,
            rect.top,
            rect.right - rect.left,
            rect.bottom - rect.top,
        )
        .to_rgb8();

    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, CROP_JPEG_QUALITY);
    encoder.encode_image(&cropped)?;
    Ok(out.into_inner())
}

/// Storage key for one face crop, unique per photo and detection index so
/// repeated partial runs never collide.
#[must_use]
pub fn crop_blob_key(trip_id: i32, photo_id: i32, detection_index: usize) -> String {
    let suffix: String = (0..8).map(|_| fastrand::alphanumeric()).collect();
    format!("faces/{trip_id}/{photo_id}_{detection_index}_{suffix}.jpg")
}

#[must_use]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext_lower = ext.to_ascii_lowercase();
            matches!(ext_lower.as_str(), "jpg" | "jpeg" | "png" | "gif" | "webp")
        })
}

/// Keeps only characters that are safe inside a blob key.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches('.').to_string()
}
