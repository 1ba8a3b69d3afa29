//! Image encoding at both ends of the pipeline.
//!
//! * Inbound: upload bytes are decoded once to prove they are an image, then
//!   re-encoded as base64 PNG for the model. PNG is lossless and accepted by
//!   every vision provider regardless of the upload format (WebP, GIF, …).
//! * Storage: the *original* upload bytes are base64-encoded unchanged, so the
//!   record keeps exactly what the client sent.
//! * Export: stored base64 is decoded back to an image for the PDF.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

use crate::error::ItemError;

/// Decode upload bytes, failing the item when they are not an image.
pub fn decode_upload(filename: &str, bytes: &[u8]) -> Result<DynamicImage, ItemError> {
    image::load_from_memory(bytes).map_err(|e| ItemError::ImageDecode {
        filename: filename.to_string(),
        detail: e.to_string(),
    })
}

/// Encode a decoded upload as a base64 PNG ready for the vision API.
///
/// `detail: "high"` lets GPT-4-class models tile the image instead of
/// reading a single 512 px overview, which matters for spec labels and
/// small print on packaging.
pub fn encode_for_model(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}

/// Base64 of the original upload bytes, as stored in the record.
pub fn encode_for_storage(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a stored base64 image. The error is a human-readable reason.
pub fn decode_stored(image_data: &str) -> Result<DynamicImage, String> {
    let bytes = STANDARD
        .decode(image_data.trim())
        .map_err(|e| format!("invalid base64: {e}"))?;
    image::load_from_memory(&bytes).map_err(|e| format!("invalid image: {e}"))
}
