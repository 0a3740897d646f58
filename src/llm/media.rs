use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, RgbImage};
use tracing::debug;

const JPEG_QUALITY: u8 = 85;

/// Sniff a MIME type from magic bytes. Used when an upload arrives without a
/// usable content type header.
pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    infer::get(data).map(|kind| kind.mime_type().to_string())
}

/// Shrink an image to fit a byte budget before it is inlined into an LLM
/// request as base64.
///
/// Inputs already at or under `max_size_bytes` pass through untouched, bytes
/// and MIME type both. Oversized inputs are decoded, downscaled so the longer
/// side is at most `max_dimension`, flattened opaque if they carry alpha, and
/// re-encoded according to the declared MIME type (JPEG for anything that is
/// not PNG or WebP). If the re-encode fails to actually shrink the payload
/// the original bytes and MIME type come back unchanged.
pub fn compress_image(
    bytes: Vec<u8>,
    declared_mime: &str,
    max_size_bytes: usize,
    max_dimension: u32,
) -> Result<(Vec<u8>, String), ImageError> {
    if bytes.len() <= max_size_bytes {
        return Ok((bytes, declared_mime.to_string()));
    }

    let mut img = image::load_from_memory(&bytes)?;

    if img.width().max(img.height()) > max_dimension {
        img = img.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    }

    // The JPEG path cannot represent transparency, so any alpha-carrying
    // image is flattened onto white before encoding.
    let rgb: RgbImage = if img.color().has_alpha() {
        flatten_onto_white(&img)
    } else {
        img.to_rgb8()
    };

    let (width, height) = rgb.dimensions();
    let mut encoded: Vec<u8> = Vec::new();

    let mime = declared_mime.trim().to_ascii_lowercase();
    let encoded_mime = match mime.as_str() {
        "image/png" => {
            PngEncoder::new_with_quality(
                &mut encoded,
                CompressionType::Best,
                PngFilterType::Adaptive,
            )
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            "image/png"
        }
        "image/webp" => {
            WebPEncoder::new_lossless(&mut encoded).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
            "image/webp"
        }
        // image/jpeg, image/jpg, and any unrecognized image/* type
        _ => {
            JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
            "image/jpeg"
        }
    };

    if encoded.len() >= bytes.len() {
        debug!(
            "Re-encode did not shrink image ({} -> {} bytes), keeping original",
            bytes.len(),
            encoded.len()
        );
        return Ok((bytes, declared_mime.to_string()));
    }

    debug!(
        "Compressed {} image from {} to {} bytes ({}x{})",
        encoded_mime,
        bytes.len(),
        encoded.len(),
        width,
        height
    );
    Ok((encoded, encoded_mime.to_string()))
}

fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let alpha = src[3] as u16;
        for channel in 0..3 {
            let value = src[channel] as u16;
            dst[channel] = ((value * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
    }
    out
}
