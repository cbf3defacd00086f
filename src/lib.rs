//! # Nota
//!
//! A fixed-layout renderer for the two documents a print-fulfillment shop
//! sends out: quotations/invoices and batches of shipping receipt stubs.
//!
//! Records go in, a paginated PDF comes out. Layout is positional: every
//! string, rule and image lands at a known coordinate on a known page, and
//! pagination is decided up front from measured block heights rather than
//! by reflowing content.
//!
//! ## Architecture
//!
//! ```text
//! Records (JSON/API) + RenderConfig
//!       ↓
//!   [layout]   : Receipt row plans and page-break decisions
//!       ↓
//!   [compose]  : Paint invoices and receipt blocks on a page canvas
//!       ↓
//!   [canvas]   : Recorded pages: text, rules, images
//!       ↓
//!   [pdf]      : Serialize to PDF bytes
//! ```
//!
//! The leaf modules ([`text`], [`numeral`], [`identifier`], [`barcode`])
//! are usable on their own.

pub mod barcode;
pub mod canvas;
pub mod compose;
pub mod config;
pub mod error;
pub mod font;
pub mod identifier;
pub mod image_loader;
pub mod layout;
pub mod logging;
pub mod model;
pub mod numeral;
pub mod pdf;
pub mod text;

use std::io::Cursor;
use std::sync::Arc;

use barcode::{QrSymbolEncoder, SymbolEncoder};
use compose::{InvoiceComposer, ReceiptComposer};
use config::RenderConfig;
use error::NotaError;
use font::FontLibrary;
use model::{InvoiceRecord, Metadata, ReceiptRecord};
use pdf::PdfWriter;

/// A finished PDF.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// The invoice's document number, or the receipt batch id.
    pub document_id: String,
    pub page_count: usize,
}

impl RenderedDocument {
    /// The bytes as a readable buffer positioned at its start.
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}

/// Holds what rendering needs across many documents.
pub struct Renderer {
    config: RenderConfig,
    fonts: Arc<FontLibrary>,
    encoder: Box<dyn SymbolEncoder>,
}

impl Renderer {
    /// A renderer using the process-wide font library, loaded from
    /// `config.assets` the first time any renderer is built.
    pub fn new(config: RenderConfig) -> Result<Self, NotaError> {
        let fonts = font::library(&config.assets)?;
        Ok(Self::with_fonts(config, fonts))
    }

    /// A renderer with its own fonts.
    pub fn with_fonts(config: RenderConfig, fonts: Arc<FontLibrary>) -> Self {
        Self {
            config,
            fonts,
            encoder: Box::new(QrSymbolEncoder),
        }
    }

    /// Replace the symbol encoder used for receipt barcodes.
    pub fn with_encoder(mut self, encoder: Box<dyn SymbolEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Render one quotation or invoice.
    pub fn render_invoice(&self, record: &InvoiceRecord) -> Result<RenderedDocument, NotaError> {
        let fonts = &self.fonts.invoice;
        let composed = InvoiceComposer::new(&self.config, fonts).compose(record)?;

        let metadata = Metadata {
            title: Some(composed.doc_number.clone()),
            author: Some(self.config.organization.name.clone()),
            subject: Some(record.customer_name.clone()),
        };
        let bytes = PdfWriter::new().write(&composed.document, &metadata, fonts)?;

        let rendered = RenderedDocument {
            bytes,
            document_id: composed.doc_number,
            page_count: composed.document.pages.len(),
        };
        tracing::info!(
            kind = "invoice",
            id = %rendered.document_id,
            pages = rendered.page_count,
            bytes = rendered.bytes.len(),
            "rendered document"
        );
        Ok(rendered)
    }

    /// Render a batch of receipts into one document, in order.
    pub fn render_receipts(&self, records: &[ReceiptRecord]) -> Result<RenderedDocument, NotaError> {
        let fonts = &self.fonts.receipt;
        let document = ReceiptComposer::new(&self.config, fonts, &*self.encoder).compose(records)?;

        let document_id = match records {
            [single] => single.order_id.clone(),
            _ => format!(
                "{}-{}",
                self.config.organization.prefix,
                chrono::Local::now().format("%Y%m%d%H%M%S")
            ),
        };
        let metadata = Metadata {
            title: Some(document_id.clone()),
            author: Some(self.config.organization.name.clone()),
            subject: Some(format!("{} receipts", records.len())),
        };
        let bytes = PdfWriter::new().write(&document, &metadata, fonts)?;

        let rendered = RenderedDocument {
            bytes,
            document_id,
            page_count: document.pages.len(),
        };
        tracing::info!(
            kind = "receipts",
            id = %rendered.document_id,
            records = records.len(),
            pages = rendered.page_count,
            bytes = rendered.bytes.len(),
            "rendered document"
        );
        Ok(rendered)
    }
}

/// Render one quotation or invoice to PDF.
///
/// This is the primary entry point for invoices. Fonts come from the
/// process-wide library.
pub fn render_invoice(record: &InvoiceRecord, config: &RenderConfig) -> Result<RenderedDocument, NotaError> {
    Renderer::new(config.clone())?.render_invoice(record)
}

/// Render a batch of shipping receipts to one PDF.
pub fn render_receipts(records: &[ReceiptRecord], config: &RenderConfig) -> Result<RenderedDocument, NotaError> {
    Renderer::new(config.clone())?.render_receipts(records)
}

/// Render an invoice record described as JSON.
pub fn render_invoice_json(json: &str, config: &RenderConfig) -> Result<RenderedDocument, NotaError> {
    let record: InvoiceRecord = serde_json::from_str(json)?;
    render_invoice(&record, config)
}

/// Render a JSON array of receipt records.
pub fn render_receipts_json(json: &str, config: &RenderConfig) -> Result<RenderedDocument, NotaError> {
    let records: Vec<ReceiptRecord> = serde_json::from_str(json)?;
    render_receipts(&records, config)
}
