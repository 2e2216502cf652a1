// ============================================================================
// IMAGE FILE I/O: codecs for the formats the `load` / `save` commands accept
// ============================================================================
//
// The plain-text PPM (`P3`) codec is implemented here directly: its header
// rules are strict (the declared maximum must be 255). Binary containers
// (PNG, JPEG, BMP) go through the `image` crate encoders and decoders.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageResult};

use crate::canvas::{Image, Pixel};
use crate::error::{EditError, Result};
use crate::log_info;

/// Default JPEG encoder quality (1–100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Magic token of the plain-text PPM format.
const PPM_MAGIC: &str = "P3";
/// The only maximum channel value accepted in a PPM header.
const PPM_MAX_VALUE: u32 = 255;

/// Image file format, chosen from a file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Ppm,
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ppm" => Some(ImageFormat::Ppm),
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Infer the format from `path`'s extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| {
            EditError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                ext.to_string()
            })
        })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Ppm => "ppm",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
        }
    }

    fn to_image_format(self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Ppm => None,
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
        }
    }
}

/// Encoder settings applied when saving.
#[derive(Clone, Copy, Debug)]
pub struct CodecOptions {
    pub jpeg_quality: u8,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

// ============================================================================
// FILE LEVEL
// ============================================================================

/// Read and decode an image file; the format comes from the extension.
pub fn load_image(path: &Path) -> Result<Image> {
    let format = ImageFormat::from_path(path)?;
    let bytes = fs::read(path).map_err(|source| EditError::Source {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes, format, path)
}

/// Encode and write an image file; the format comes from the extension.
pub fn save_image(path: &Path, img: &Image, options: &CodecOptions) -> Result<()> {
    let format = ImageFormat::from_path(path)?;
    let bytes = encode(img, format, options).map_err(|source| EditError::Codec {
        path: path.to_path_buf(),
        source,
    })?;
    log_info!("encoded {}x{} as {} ({} bytes)", img.width(), img.height(), format.extension(), bytes.len());
    fs::write(path, bytes).map_err(|source| EditError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// BYTE LEVEL
// ============================================================================

/// Decode bytes in `format`. `origin` is only used in error messages.
pub fn decode(bytes: &[u8], format: ImageFormat, origin: &Path) -> Result<Image> {
    match format.to_image_format() {
        None => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| EditError::format(origin, "PPM text is not valid UTF-8"))?;
            decode_ppm(text, origin)
        }
        Some(fmt) => {
            let dyn_img = image::load_from_memory_with_format(bytes, fmt).map_err(|source| {
                EditError::Codec {
                    path: origin.to_path_buf(),
                    source,
                }
            })?;
            Ok(Image::from_rgb_image(&dyn_img.to_rgb8()))
        }
    }
}

/// Encode to bytes in `format`.
pub fn encode(img: &Image, format: ImageFormat, options: &CodecOptions) -> ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        ImageFormat::Ppm => out = encode_ppm(img).into_bytes(),
        ImageFormat::Png => {
            let rgb = img.to_rgb_image();
            let (w, h) = rgb.dimensions();
            PngEncoder::new(&mut out).write_image(rgb.as_raw(), w, h, ColorType::Rgb8)?;
        }
        ImageFormat::Jpeg => {
            let rgb = img.to_rgb_image();
            let (w, h) = rgb.dimensions();
            let mut encoder = JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
            encoder.encode(rgb.as_raw(), w, h, ColorType::Rgb8)?;
        }
        ImageFormat::Bmp => {
            let rgb = img.to_rgb_image();
            let (w, h) = rgb.dimensions();
            let mut encoder = BmpEncoder::new(&mut out);
            encoder.encode(rgb.as_raw(), w, h, ColorType::Rgb8)?;
        }
    }
    Ok(out)
}

// ============================================================================
// PLAIN-TEXT PPM
// ============================================================================

/// Parse a `P3` document: magic, width, height, max value (255), then
/// width × height × 3 channel values. `#` starts a comment to end of line.
pub fn decode_ppm(text: &str, origin: &Path) -> Result<Image> {
    let mut tokens = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace);

    match tokens.next() {
        Some(PPM_MAGIC) => {}
        Some(other) => {
            return Err(EditError::format(
                origin,
                format!("expected '{PPM_MAGIC}' header, found '{other}'"),
            ));
        }
        None => return Err(EditError::format(origin, "empty file")),
    }

    let mut header = |what: &str| -> Result<u32> {
        let token = tokens
            .next()
            .ok_or_else(|| EditError::format(origin, format!("missing {what}")))?;
        token
            .parse::<u32>()
            .map_err(|_| EditError::format(origin, format!("{what} '{token}' is not a number")))
    };
    let width = header("width")? as usize;
    let height = header("height")? as usize;
    let max = header("maximum value")?;
    if max != PPM_MAX_VALUE {
        return Err(EditError::format(
            origin,
            format!("maximum value must be {PPM_MAX_VALUE}, found {max}"),
        ));
    }

    let (expected, values) = width
        .checked_mul(height)
        .and_then(|n| Some((n, n.checked_mul(3)?)))
        .ok_or_else(|| EditError::format(origin, format!("{width}x{height} image is too large")))?;
    // The header is untrusted; reserve only what the text could possibly hold.
    let mut pixels: Vec<Pixel> = Vec::with_capacity(expected.min(text.len() / 6));
    for i in 0..expected {
        let mut px = [0u8; 3];
        for (c, slot) in px.iter_mut().enumerate() {
            let token = tokens.next().ok_or_else(|| {
                EditError::format(
                    origin,
                    format!("pixel data ends after {} of {} values", i * 3 + c, values),
                )
            })?;
            *slot = token
                .parse::<u8>()
                .map_err(|_| EditError::format(origin, format!("channel value '{token}' is not in 0..=255")))?;
        }
        pixels.push(px);
    }
    if let Some(extra) = tokens.next() {
        return Err(EditError::format(
            origin,
            format!("unexpected data '{extra}' after {expected} pixels"),
        ));
    }

    Image::from_pixels(width, height, pixels)
        .ok_or_else(|| EditError::format(origin, "pixel count does not match header"))
}

/// Serialise as a `P3` document, one image row per line.
pub fn encode_ppm(img: &Image) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{PPM_MAGIC}");
    let _ = writeln!(out, "{} {}", img.width(), img.height());
    let _ = writeln!(out, "{PPM_MAX_VALUE}");
    for row in img.rows() {
        let line: Vec<String> = row
            .iter()
            .flat_map(|px| px.iter().map(u8::to_string))
            .collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}
