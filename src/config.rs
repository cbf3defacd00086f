//! # Render Configuration
//!
//! Everything the templates need that is not part of a record: organization
//! details, asset locations, and the layout constants of the receipt grid
//! and barcode stubs. Deserialized from JSON with every field defaulted, so
//! an empty object `{}` is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{read_asset, NotaError};
use crate::model::PageSize;

/// Top-level renderer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub page_size: PageSize,
    pub organization: OrganizationConfig,
    pub assets: AssetConfig,
    pub invoice: InvoiceLayoutConfig,
    pub receipt: ReceiptLayoutConfig,
    pub barcode: BarcodeConfig,
}

impl RenderConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, NotaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file. Relative asset paths inside the
    /// file are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, NotaError> {
        let raw = read_asset(path)?;
        let mut config: RenderConfig = serde_json::from_slice(&raw)?;
        if let Some(dir) = path.parent() {
            config.assets.resolve_relative_to(dir);
        }
        Ok(config)
    }
}

/// Who is issuing the documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationConfig {
    /// First segment of generated document numbers.
    pub prefix: String,
    /// Printed above the signature line.
    pub name: String,
    /// Lines printed under the payment information heading.
    pub payment_info: Vec<String>,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            prefix: "HCX".to_string(),
            name: "HERCULEX INDONESIA".to_string(),
            payment_info: vec!["BCA a.n. Ivan Leonardo - 0845248007".to_string()],
        }
    }
}

/// Paths to template images and typefaces. Every entry is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetConfig {
    pub quotation_background: Option<PathBuf>,
    pub invoice_background: Option<PathBuf>,
    pub signature_stamp: Option<PathBuf>,
    pub invoice_fonts: TypefaceConfig,
    pub receipt_fonts: TypefaceConfig,
}

impl AssetConfig {
    fn resolve_relative_to(&mut self, dir: &Path) {
        for path in [
            &mut self.quotation_background,
            &mut self.invoice_background,
            &mut self.signature_stamp,
            &mut self.invoice_fonts.regular,
            &mut self.invoice_fonts.bold,
            &mut self.invoice_fonts.italic,
            &mut self.receipt_fonts.regular,
            &mut self.receipt_fonts.bold,
            &mut self.receipt_fonts.italic,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

/// TrueType files for the three weights a template uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypefaceConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
}

/// Invoice template knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceLayoutConfig {
    /// Item names are title-cased and cut to this many characters.
    pub item_name_width: usize,
    /// Characters per spelled-out amount line.
    pub terbilang_width: usize,
}

impl Default for InvoiceLayoutConfig {
    fn default() -> Self {
        Self {
            item_name_width: 60,
            terbilang_width: crate::numeral::TERBILANG_LINE_WIDTH,
        }
    }
}

/// How a receipt column's row count is padded once it reaches the floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaddingPolicy {
    /// Columns count exactly the rows they occupy.
    #[default]
    None,
    /// A column that already reaches the floor gets one extra row.
    PadAtFloor,
}

/// Receipt grid knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptLayoutConfig {
    /// Height of one grid row in points.
    pub row_unit: f64,
    /// Fewest rows a receipt block may have.
    pub min_rows: usize,
    /// Rows added to the planned count for the top gap, subheader and
    /// bottom border.
    pub padding_rows: usize,
    /// Characters per line in the left (recipient/sender) column.
    pub left_width: usize,
    /// Characters per line in the right (order detail) column.
    pub right_width: usize,
    /// Literal marker forcing a line break inside a field.
    pub break_token: String,
    pub padding_policy: PaddingPolicy,
    /// Draw numbered helper rules on every row.
    pub debug_grid: bool,
}

impl Default for ReceiptLayoutConfig {
    fn default() -> Self {
        Self {
            row_unit: 12.0,
            min_rows: 13,
            padding_rows: 3,
            left_width: 37,
            right_width: 46,
            break_token: "~!~".to_string(),
            padding_policy: PaddingPolicy::None,
            debug_grid: false,
        }
    }
}

/// Barcode payload and raster knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarcodeConfig {
    /// Payloads shorter than this are padded up to it.
    pub min_length: usize,
    /// Payloads longer than this are truncated to it.
    pub max_length: usize,
    /// Appended before the random filler of a padded payload.
    pub end_marker: String,
    /// Pixels per symbol module before resizing.
    pub module_scale: u32,
    /// Light modules around the symbol.
    pub quiet_zone: u32,
    /// Raster size before rotation.
    pub raster_width: u32,
    pub raster_height: u32,
    /// Printed size on the page, after rotation.
    pub print_width: f64,
    pub print_height: f64,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            min_length: 300,
            max_length: 790,
            end_marker: "~EOF~".to_string(),
            module_scale: 10,
            quiet_zone: 2,
            raster_width: 350,
            raster_height: 100,
            print_width: 50.0,
            print_height: 175.0,
        }
    }
}
