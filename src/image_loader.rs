//! # Image Loading and Decoding
//!
//! Loads template backgrounds and the signature stamp and prepares them for
//! PDF embedding. JPEG images pass through without re-encoding (DCTDecode).
//! Every other format the `image` crate reads is decoded to RGB pixels with a
//! separate alpha channel for SMask transparency. Barcode rasters arrive
//! already decoded and are kept as single-channel gray.
//!
//! An asset path may also be a `data:image/...;base64,` URI, so a config file
//! can carry its images inline.

use std::io::Cursor;
use std::path::Path;

use crate::error::{read_asset, NotaError};

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
    /// width * height bytes of luminance.
    Gray(Vec<u8>),
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl LoadedImage {
    /// Wrap a raster produced in memory.
    pub fn from_gray_image(img: &image::GrayImage) -> Self {
        LoadedImage {
            pixel_data: ImagePixelData::Gray(img.as_raw().clone()),
            width_px: img.width(),
            height_px: img.height(),
        }
    }
}

/// Load an image asset from disk, or from a data URI stored in its path.
pub fn load_image_file(path: &Path) -> Result<LoadedImage, NotaError> {
    let raw_bytes = match path.to_str() {
        Some(src) if src.starts_with("data:image/") => decode_data_uri(src)?,
        _ => read_asset(path)?,
    };
    decode_image_bytes(&raw_bytes).map_err(|e| {
        NotaError::Image(format!("'{}': {}", display_source(path), e))
    })
}

fn display_source(path: &Path) -> String {
    let shown = path.display().to_string();
    if shown.starts_with("data:") {
        // Inline data would swamp the message.
        shown.chars().take(32).chain("...".chars()).collect()
    } else {
        shown
    }
}

fn decode_data_uri(src: &str) -> Result<Vec<u8>, NotaError> {
    use base64::Engine;
    let comma_pos = src
        .find(',')
        .ok_or_else(|| NotaError::Image("Invalid data URI: missing comma".to_string()))?;
    base64::engine::general_purpose::STANDARD
        .decode(&src[comma_pos + 1..])
        .map_err(|e| NotaError::Image(format!("Base64 decode error: {}", e)))
}

/// Detect image format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else {
        decode_raster(data)
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {}", e))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("Failed to read JPEG dimensions: {}", e))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // skip SOI
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            // length(2) + precision(1) + height(2) + width(2) + components(1)
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG, WebP and friends: decode to RGBA, split into RGB + alpha.
fn decode_raster(data: &[u8]) -> Result<LoadedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Format detection error: {}", e))?;

    if reader.format().is_none() {
        return Err("Unsupported image format".to_string());
    }

    let img = reader
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        has_transparency |= pixel[3] != 255;
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}
