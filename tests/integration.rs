//! Integration tests for the Nota rendering pipeline.
//!
//! These tests exercise the full path from records (or JSON) to PDF bytes.
//! They verify:
//! - JSON records and configs deserialize with both naming styles
//! - Invoices and receipt batches paginate as expected
//! - PDF output is structurally valid
//! - Document ids and metadata follow the record

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nota::barcode::{ModuleMatrix, SymbolEncoder};
use nota::config::{AssetConfig, RenderConfig};
use nota::error::NotaError;
use nota::font::FontLibrary;
use nota::model::*;
use nota::Renderer;

// ─── Helpers ────────────────────────────────────────────────────

fn renderer() -> Renderer {
    Renderer::with_fonts(RenderConfig::default(), Arc::new(FontLibrary::standard()))
}

fn invoice(items: usize) -> InvoiceRecord {
    InvoiceRecord {
        doc_type: DocType::Invoice,
        doc_number: String::new(),
        order_id: Some("17".to_string()),
        due_date: "2024-06-30".to_string(),
        customer_name: "PT Sinar Jaya Abadi".to_string(),
        customer_address: vec!["Jl. Babakan Madang No. 8".to_string(), "Bogor".to_string()],
        customer_phone: "021-8790123".to_string(),
        customer_fax: String::new(),
        items: (0..items)
            .map(|i| LineItem::new(format!("kaos polo {}", i), 10_000, 2))
            .collect(),
        discount: 0,
        down_payment: 0,
    }
}

fn receipt(order_id: &str) -> ReceiptRecord {
    ReceiptRecord {
        order_id: order_id.to_string(),
        recipient_name: "Rudi".to_string(),
        recipient_phone: "0815912034".to_string(),
        recipient_address: "Jl. Babakan Madang No. 8".to_string(),
        sender_name: "Herculex Indonesia".to_string(),
        sender_phone: "0000100002".to_string(),
        total_amount: 2_525_000,
        bank_name: Some("BCA".to_string()),
        order_detail: "Kemeja polos warna merah 1".to_string(),
        paid: false,
        invoice_date: "2023-01-25 11:20:00".to_string(),
    }
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn count(bytes: &[u8], needle: &str) -> usize {
    String::from_utf8_lossy(bytes).matches(needle).count()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Every flate stream in the file, inflated and joined.
fn inflated_streams(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut rest = bytes;
    while let Some(start) = find(rest, b"stream\n") {
        let body = &rest[start + 7..];
        let Some(end) = find(body, b"\nendstream") else {
            break;
        };
        if let Ok(raw) = miniz_oxide::inflate::decompress_to_vec_zlib(&body[..end]) {
            out.push_str(&String::from_utf8_lossy(&raw));
            out.push('\n');
        }
        rest = &body[end + 10..];
    }
    out
}

/// A TrueType file from the host, if one is installed.
fn system_font_path() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Andale Mono.ttf",
        "/System/Library/Fonts/Supplemental/Verdana.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|path| {
        std::fs::read(path)
            .map(|data| ttf_parser::Face::parse(&data, 0).is_ok())
            .unwrap_or(false)
    })
}

/// Counts calls and returns a tiny fixed symbol.
struct CountingEncoder(Arc<AtomicUsize>);

impl SymbolEncoder for CountingEncoder {
    fn encode(&self, _payload: &[u8]) -> Result<ModuleMatrix, NotaError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        ModuleMatrix::new(2, 2, vec![true, false, false, true])
    }
}

// ─── Invoices ───────────────────────────────────────────────────

#[test]
fn test_invoice_single_page() {
    let rendered = renderer().render_invoice(&invoice(3)).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(rendered.page_count, 1);
    assert_eq!(count(&rendered.bytes, "/Type /Page "), 1);
    assert!(rendered.document_id.starts_with("HCX/INV/"));
    assert!(rendered.document_id.ends_with("/17"));
    let title = format!("/Title ({})", rendered.document_id);
    assert_eq!(count(&rendered.bytes, &title), 1);
}

#[test]
fn test_long_invoice_flows_to_second_page() {
    let rendered = renderer().render_invoice(&invoice(40)).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(rendered.page_count, 2);
    assert_eq!(count(&rendered.bytes, "/Type /Page "), 2);
    assert!(count(&rendered.bytes, "/Count 2") >= 1);
}

#[test]
fn test_invoice_keeps_given_number() {
    let mut record = invoice(1);
    record.doc_number = "INV-2024-0001".to_string();
    let rendered = renderer().render_invoice(&record).unwrap();
    assert_eq!(rendered.document_id, "INV-2024-0001");
}

#[test]
fn test_overpaid_invoice_is_rejected() {
    let mut record = invoice(1);
    record.down_payment = 50_000;
    let err = renderer().render_invoice(&record).unwrap_err();
    assert!(matches!(err, NotaError::NegativeAmount(-30_000)));
}

#[test]
fn test_missing_background_is_an_error() {
    let mut config = RenderConfig::default();
    config.assets.invoice_background = Some("/nonexistent/background.png".into());
    let renderer = Renderer::with_fonts(config, Arc::new(FontLibrary::standard()));
    let err = renderer.render_invoice(&invoice(1)).unwrap_err();
    assert!(matches!(err, NotaError::Io { .. }));
}

// ─── Receipts ───────────────────────────────────────────────────

#[test]
fn test_receipt_batch_paginates() {
    let records: Vec<_> = (0..9).map(|i| receipt(&format!("073-0006833{}", i))).collect();
    let rendered = renderer().render_receipts(&records).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(rendered.page_count, 3);
    assert_eq!(count(&rendered.bytes, "/Type /Page "), 3);
    // One embedded raster per receipt, drawn on both halves.
    assert_eq!(count(&rendered.bytes, "/Subtype /Image"), 9);
    assert!(rendered.document_id.starts_with("HCX-"));
}

#[test]
fn test_single_receipt_takes_order_id() {
    let rendered = renderer().render_receipts(&[receipt("073-00068330")]).unwrap();
    assert_eq!(rendered.document_id, "073-00068330");
    assert_eq!(rendered.page_count, 1);
}

#[test]
fn test_custom_encoder_called_once_per_receipt() {
    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = renderer().with_encoder(Box::new(CountingEncoder(Arc::clone(&calls))));
    let records = vec![receipt("1"), receipt("2"), receipt("3")];
    renderer.render_receipts(&records).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_empty_batch_renders_blank_page() {
    let rendered = renderer().render_receipts(&[]).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(rendered.page_count, 1);
}

#[test]
fn test_receipts_use_courier() {
    let rendered = renderer().render_receipts(&[receipt("1")]).unwrap();
    assert!(count(&rendered.bytes, "/BaseFont /Courier") >= 1);
    assert_eq!(count(&rendered.bytes, "/BaseFont /Helvetica"), 0);
}

// ─── JSON entry points ──────────────────────────────────────────

#[test]
fn test_invoice_json_accepts_backend_payload() {
    // The order service's shape: numeric id, flat address keys, nulls.
    let json = r#"{
        "order_id": 88,
        "doc_type": "Q",
        "doc_number": "",
        "customer_name": "John Doe",
        "customer_addr_1": "Jl. Babakan Madang No. 8",
        "customer_addr_2": "Sentul",
        "customer_addr_3": null,
        "customer_addr_4": "",
        "cust_phone": "021-8790123",
        "cust_fax": null,
        "due_date": "2024-06-30",
        "items": [{ "item_name": "banner", "price": 75000, "quantity": 2 }],
        "diskon": null,
        "down_payment": 50000
    }"#;

    let record: InvoiceRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.order_id.as_deref(), Some("88"));
    assert_eq!(record.customer_address, vec!["Jl. Babakan Madang No. 8", "Sentul"]);
    assert_eq!(record.customer_phone, "021-8790123");
    assert_eq!(record.customer_fax, "");
    assert_eq!(record.discount, 0);
    assert_eq!(record.down_payment, 50_000);

    let rendered = nota::render_invoice_json(json, &RenderConfig::default()).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert!(rendered.document_id.starts_with("HCX/QUO/"));
    assert!(rendered.document_id.ends_with("/88"));
    let content = inflated_streams(&rendered.bytes);
    assert!(content.contains("(Jl. Babakan Madang No. 8) Tj"));
    assert!(content.contains("(Sentul) Tj"));
    assert!(content.contains("(021-8790123) Tj"));
}

#[test]
fn test_receipts_json() {
    let json = r#"[{
        "orderId": "073-00068330",
        "recipientName": "Rudi",
        "totalAmount": 2525000,
        "orderDetail": "Kemeja~!~Celana",
        "paid": true,
        "invoiceDate": "2023-01-25 11:20:00"
    }]"#;
    let rendered = nota::render_receipts_json(json, &RenderConfig::default()).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(rendered.document_id, "073-00068330");
}

#[test]
fn test_malformed_json_carries_hint() {
    let err = nota::render_receipts_json("[{ \"orderId\": ", &RenderConfig::default()).unwrap_err();
    match err {
        NotaError::Parse { hint, .. } => assert!(hint.contains("truncated")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_config_json_overrides_layout() {
    let config = RenderConfig::from_json(
        r#"{ "organization": { "prefix": "ABC" }, "receipt": { "minRows": 40 } }"#,
    )
    .unwrap();
    let renderer = Renderer::with_fonts(config, Arc::new(FontLibrary::standard()));
    // 43 rows of 12pt: only one block fits per A4 page.
    let rendered = renderer.render_receipts(&[receipt("1"), receipt("2")]).unwrap();
    assert_eq!(rendered.page_count, 2);
    assert!(rendered.document_id.starts_with("ABC-"));
}

// ─── Custom typefaces ───────────────────────────────────────────

#[test]
fn test_receipt_embeds_loaded_truetype() {
    let Some(path) = system_font_path() else {
        eprintln!("skipping: no TrueType font installed");
        return;
    };
    let mut assets = AssetConfig::default();
    assets.receipt_fonts.regular = Some(path);
    let fonts = Arc::new(FontLibrary::load(&assets).unwrap());
    let renderer = Renderer::with_fonts(RenderConfig::default(), fonts);

    let rendered = renderer.render_receipts(&[receipt("073-00068330")]).unwrap();
    assert_valid_pdf(&rendered.bytes);
    assert_eq!(count(&rendered.bytes, "/Subtype /CIDFontType2"), 1);
    assert!(count(&rendered.bytes, "/ToUnicode") >= 1);
    assert!(count(&rendered.bytes, "/Encoding /Identity-H") >= 1);
    // Bold labels still fall back to the built-in face.
    assert!(count(&rendered.bytes, "/BaseFont /Courier-Bold") >= 1);

    let content = inflated_streams(&rendered.bytes);
    let hex_shows: Vec<&str> = content
        .lines()
        .filter(|line| line.starts_with('<') && line.ends_with("> Tj"))
        .collect();
    assert!(!hex_shows.is_empty(), "no hex-encoded text in content streams");
    for line in &hex_shows {
        let hex = &line[1..line.len() - 4];
        assert_eq!(hex.len() % 4, 0, "glyph ids are two bytes: {}", line);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()), "{}", line);
    }
    // Values drawn in the embedded face never reach the output as literals.
    assert!(!content.contains("(Rudi) Tj"));
    assert!(content.contains("(Kepada) Tj"));
}

// ─── Output ─────────────────────────────────────────────────────

#[test]
fn test_reader_starts_at_beginning() {
    let rendered = renderer().render_invoice(&invoice(1)).unwrap();
    let len = rendered.bytes.len();
    let mut reader = rendered.into_reader();
    assert_eq!(reader.position(), 0);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).unwrap();
    assert_eq!(buf.len(), len);
    assert!(buf.starts_with(b"%PDF"));
}
