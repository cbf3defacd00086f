//! # Barcode Embedding
//!
//! Turns a receipt payload into the raster printed on both stubs of a
//! receipt. This module owns the policy around the symbol encoder:
//!
//! 1. Normalize the payload length. Long payloads are cut to the maximum;
//!    short ones get the end marker plus random lowercase filler up to the
//!    minimum, so every symbol comes out at a similar density.
//! 2. Encode it to a [`ModuleMatrix`] through a [`SymbolEncoder`].
//! 3. Rasterize the matrix, resize it to the fixed raster size and rotate it
//!    a quarter turn clockwise for the portrait stub.
//!
//! The encoder is a trait so callers can plug in another symbology. The
//! stock one draws QR codes.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use qrcode::{Color as ModuleColor, EcLevel, QrCode};
use rand::Rng;

use crate::config::BarcodeConfig;
use crate::error::NotaError;

/// A grid of dark and light modules, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    width: usize,
    height: usize,
    dark: Vec<bool>,
}

impl ModuleMatrix {
    /// Build a matrix from row-major module values.
    pub fn new(width: usize, height: usize, dark: Vec<bool>) -> Result<Self, NotaError> {
        if width == 0 || height == 0 || dark.len() != width * height {
            return Err(NotaError::Barcode(format!(
                "module matrix of {}x{} cannot hold {} modules",
                width,
                height,
                dark.len()
            )));
        }
        Ok(Self { width, height, dark })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }
}

/// Turns payload bytes into a module matrix.
pub trait SymbolEncoder: Send + Sync {
    fn encode(&self, payload: &[u8]) -> Result<ModuleMatrix, NotaError>;
}

/// QR codes at the lowest error correction level, which fits the most data.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrSymbolEncoder;

impl SymbolEncoder for QrSymbolEncoder {
    fn encode(&self, payload: &[u8]) -> Result<ModuleMatrix, NotaError> {
        let code = QrCode::with_error_correction_level(payload, EcLevel::L)
            .map_err(|e| NotaError::Barcode(e.to_string()))?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == ModuleColor::Dark)
            .collect();
        ModuleMatrix::new(width, width, dark)
    }
}

/// Applies the payload and raster policy around a [`SymbolEncoder`].
pub struct BarcodeEmbedder<'a> {
    config: &'a BarcodeConfig,
    encoder: &'a dyn SymbolEncoder,
}

impl<'a> BarcodeEmbedder<'a> {
    pub fn new(config: &'a BarcodeConfig, encoder: &'a dyn SymbolEncoder) -> Self {
        Self { config, encoder }
    }

    /// Cut or pad `text` to the configured length window.
    ///
    /// Lengths are counted in characters. A padded payload is exactly the
    /// minimum length unless the end marker alone overshoots it, in which
    /// case the marker is still appended whole and no filler follows.
    pub fn normalize_payload<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let len = text.chars().count();

        if len > self.config.max_length {
            tracing::debug!(from = len, to = self.config.max_length, "truncating barcode payload");
            return text.chars().take(self.config.max_length).collect();
        }

        if len < self.config.min_length {
            let marker_len = self.config.end_marker.chars().count();
            let filler = self.config.min_length.saturating_sub(len + marker_len);
            let mut padded = String::with_capacity(text.len() + self.config.end_marker.len() + filler);
            padded.push_str(text);
            padded.push_str(&self.config.end_marker);
            padded.extend((0..filler).map(|_| rng.gen_range(b'a'..=b'z') as char));
            tracing::debug!(from = len, filler, "padding barcode payload");
            return padded;
        }

        text.to_string()
    }

    /// Normalize, encode and rasterize `text` using the thread RNG for filler.
    pub fn encode_payload(&self, text: &str) -> Result<GrayImage, NotaError> {
        self.encode_payload_with(text, &mut rand::thread_rng())
    }

    /// Like [`encode_payload`](Self::encode_payload) with a caller-supplied
    /// filler source.
    pub fn encode_payload_with<R: Rng>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> Result<GrayImage, NotaError> {
        let cfg = self.config;
        if cfg.raster_width == 0 || cfg.raster_height == 0 {
            return Err(NotaError::Barcode("raster size must be non-zero".to_string()));
        }

        let payload = self.normalize_payload(text, rng);
        let matrix = self.encoder.encode(payload.as_bytes())?;
        let native = rasterize(&matrix, cfg.module_scale.max(1), cfg.quiet_zone);
        let resized = imageops::resize(&native, cfg.raster_width, cfg.raster_height, FilterType::Nearest);
        Ok(imageops::rotate90(&resized))
    }
}

/// Draw `matrix` black on white, `scale` pixels per module, with a light
/// margin of `quiet_zone` modules.
pub fn rasterize(matrix: &ModuleMatrix, scale: u32, quiet_zone: u32) -> GrayImage {
    let width_px = (matrix.width() as u32 + 2 * quiet_zone) * scale;
    let height_px = (matrix.height() as u32 + 2 * quiet_zone) * scale;

    GrayImage::from_fn(width_px, height_px, |x, y| {
        let mx = (x / scale).checked_sub(quiet_zone).map(|m| m as usize);
        let my = (y / scale).checked_sub(quiet_zone).map(|m| m as usize);
        match (mx, my) {
            (Some(mx), Some(my))
                if mx < matrix.width() && my < matrix.height() && matrix.is_dark(mx, my) =>
            {
                Luma([0])
            }
            _ => Luma([255]),
        }
    })
}
