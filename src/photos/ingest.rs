use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageFormat;

use crate::error::DecodeError;
use crate::models::{PhotoAsset, PhotoFormat, PhotoSlot};

/// Longest preview edge in pixels. Previews exist only for the wizard's slot
/// thumbnails; the original bytes are what gets embedded.
const PREVIEW_MAX_PX: u32 = 320;

/// Decode an uploaded file into a `PhotoAsset`. Decoding and thumbnailing
/// run on a blocking worker so the wizard stays responsive while large
/// uploads are processed; only the affected slot waits on the result.
pub async fn ingest_photo(
    slot: PhotoSlot,
    bytes: Vec<u8>,
    extension: &str,
) -> Result<PhotoAsset, DecodeError> {
    let format = PhotoFormat::from_extension(extension)
        .ok_or_else(|| DecodeError::UnsupportedFormat(extension.to_string()))?;

    tokio::task::spawn_blocking(move || decode_asset(slot, bytes, format))
        .await
        .map_err(|err| DecodeError::Worker(err.to_string()))?
}

fn decode_asset(
    slot: PhotoSlot,
    bytes: Vec<u8>,
    format: PhotoFormat,
) -> Result<PhotoAsset, DecodeError> {
    let img = image::load_from_memory(&bytes)?;

    let preview_img = img.thumbnail(PREVIEW_MAX_PX, PREVIEW_MAX_PX);
    let mut preview_png = Vec::new();
    preview_img.write_to(&mut Cursor::new(&mut preview_png), ImageFormat::Png)?;

    let preview = format!("data:image/png;base64,{}", BASE64.encode(&preview_png));

    log::debug!(
        "decoded photo for slot {} ({} bytes, preview {} bytes)",
        slot.as_str(),
        bytes.len(),
        preview_png.len()
    );

    Ok(PhotoAsset {
        slot,
        bytes,
        preview,
        format,
    })
}
