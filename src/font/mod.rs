//! # Font Management
//!
//! Each template draws with three weights: regular, bold and italic. A
//! [`FontSet`] holds them, either as TrueType files to embed or as one of
//! the standard PDF font families when no file is configured.
//!
//! Typefaces are loaded once per process. [`library`] parses each distinct
//! typeface configuration on first use and hands out the same
//! [`FontLibrary`] for it afterwards.

pub mod metrics;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::config::{AssetConfig, TypefaceConfig};
use crate::error::{read_asset, NotaError};
pub use metrics::StandardFontMetrics;

/// The weight a piece of text is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontRole {
    Regular,
    Bold,
    Italic,
}

impl FontRole {
    pub const ALL: [FontRole; 3] = [FontRole::Regular, FontRole::Bold, FontRole::Italic];
}

/// Standard PDF fonts used as fallbacks. No embedding needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
    CourierBold,
    CourierOblique,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => StandardFontMetrics::HELVETICA,
            Self::HelveticaBold => StandardFontMetrics::HELVETICA_BOLD,
            Self::Courier | Self::CourierBold | Self::CourierOblique => StandardFontMetrics::COURIER,
        }
    }
}

/// Which standard family a [`FontSet`] falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFamily {
    Helvetica,
    Courier,
}

impl StandardFamily {
    fn font(&self, role: FontRole) -> StandardFont {
        match (self, role) {
            (StandardFamily::Helvetica, FontRole::Regular) => StandardFont::Helvetica,
            (StandardFamily::Helvetica, FontRole::Bold) => StandardFont::HelveticaBold,
            (StandardFamily::Helvetica, FontRole::Italic) => StandardFont::HelveticaOblique,
            (StandardFamily::Courier, FontRole::Regular) => StandardFont::Courier,
            (StandardFamily::Courier, FontRole::Bold) => StandardFont::CourierBold,
            (StandardFamily::Courier, FontRole::Italic) => StandardFont::CourierOblique,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType font that gets embedded.
    Custom {
        /// Name used for the PDF /BaseFont, taken from the file stem.
        name: String,
        data: Arc<Vec<u8>>,
        metrics: CustomFontMetrics,
    },
}

impl FontData {
    /// Width of `text` in points at `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        match self {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom { metrics, .. } => {
                text.chars().map(|ch| metrics.char_width(ch, font_size)).sum()
            }
        }
    }
}

/// Parsed metrics from a TrueType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    ///
    /// Only the Basic Multilingual Plane is sampled; records are Indonesian
    /// text and never need more.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            glyph_ids,
        })
    }
}

/// The regular, bold and italic faces of one template.
#[derive(Debug, Clone)]
pub struct FontSet {
    faces: [FontData; 3],
}

impl FontSet {
    /// A set made only of standard fonts.
    pub fn standard(family: StandardFamily) -> Self {
        Self {
            faces: FontRole::ALL.map(|role| FontData::Standard(family.font(role))),
        }
    }

    /// Load the configured TrueType files, using `fallback` for any weight
    /// without a file.
    pub fn load(config: &TypefaceConfig, fallback: StandardFamily) -> Result<Self, NotaError> {
        let mut set = Self::standard(fallback);
        for (role, path) in [
            (FontRole::Regular, &config.regular),
            (FontRole::Bold, &config.bold),
            (FontRole::Italic, &config.italic),
        ] {
            match path {
                Some(path) => set.faces[role as usize] = load_truetype(path)?,
                None if config.regular.is_some() => {
                    tracing::warn!(?role, fallback = ?fallback, "typeface weight not configured, using standard font");
                }
                None => {}
            }
        }
        Ok(set)
    }

    pub fn get(&self, role: FontRole) -> &FontData {
        &self.faces[role as usize]
    }

    /// Width of `text` in points when drawn with `role` at `font_size`.
    pub fn measure(&self, role: FontRole, text: &str, font_size: f64) -> f64 {
        self.get(role).measure_string(text, font_size)
    }
}

fn load_truetype(path: &Path) -> Result<FontData, NotaError> {
    let data = read_asset(path)?;
    let metrics = CustomFontMetrics::from_font_data(&data).ok_or_else(|| {
        NotaError::Font(format!("'{}' is not a parseable TrueType font", path.display()))
    })?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("CustomFont")
        .to_string();
    tracing::debug!(font = %name, glyphs = metrics.glyph_ids.len(), "loaded typeface");
    Ok(FontData::Custom {
        name,
        data: Arc::new(data),
        metrics,
    })
}

/// Font sets for both templates.
#[derive(Debug, Clone)]
pub struct FontLibrary {
    pub invoice: FontSet,
    pub receipt: FontSet,
}

impl FontLibrary {
    /// Standard fonts only: Helvetica for invoices, Courier for receipts.
    /// Receipt columns are sized in characters, so they want a fixed pitch.
    pub fn standard() -> Self {
        Self {
            invoice: FontSet::standard(StandardFamily::Helvetica),
            receipt: FontSet::standard(StandardFamily::Courier),
        }
    }

    pub fn load(assets: &AssetConfig) -> Result<Self, NotaError> {
        Ok(Self {
            invoice: FontSet::load(&assets.invoice_fonts, StandardFamily::Helvetica)?,
            receipt: FontSet::load(&assets.receipt_fonts, StandardFamily::Courier)?,
        })
    }
}

/// Invoice and receipt typefaces a library was loaded from.
type LibraryKey = (TypefaceConfig, TypefaceConfig);

static LIBRARIES: OnceLock<Mutex<HashMap<LibraryKey, Arc<FontLibrary>>>> = OnceLock::new();

/// The process-wide font library for the typefaces named in `assets`.
///
/// Each distinct pair of invoice and receipt typeface configs is loaded once;
/// later calls with the same pair share it. A failed load is not cached, so
/// a fixed asset path can be retried.
pub fn library(assets: &AssetConfig) -> Result<Arc<FontLibrary>, NotaError> {
    let key = (assets.invoice_fonts.clone(), assets.receipt_fonts.clone());
    let cache = LIBRARIES.get_or_init(Default::default);

    if let Some(lib) = cache.lock().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return Ok(Arc::clone(lib));
    }

    // Loading happens outside the lock; a racing loader of the same key loses.
    let loaded = Arc::new(FontLibrary::load(assets)?);
    tracing::info!(invoice = ?key.0, receipt = ?key.1, "registered typefaces");
    let mut libraries = cache.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(libraries.entry(key).or_insert(loaded)))
}
