//! Quotation and invoice template.
//!
//! Positions are fixed to the pre-printed background: header fields sit in
//! the template's boxes, the item table starts at a fixed baseline and grows
//! downwards, and the totals, spelled-out amount and signature block follow
//! the last item.

use crate::canvas::{CanvasDocument, ImageHandle, PageCanvas};
use crate::config::RenderConfig;
use crate::error::NotaError;
use crate::font::{FontRole, FontSet};
use crate::identifier::document_number;
use crate::model::{Color, DocType, InvoiceRecord, InvoiceTotals, LineItem};
use crate::numeral::{format_with_thousands_separator, number_to_words_id_width};
use crate::text::capitalize_words;

use super::register_asset;

const TEXT_COLOR: Color = Color::rgb(0.20784313725490197, 0.1843137254901961, 0.21176470588235294);

const HEADER_X: f64 = 363.0;
const CUSTOMER_NAME_Y: f64 = 721.0;
const ADDRESS_TOP_Y: f64 = 709.5;
const HEADER_STEP: f64 = 11.5;
const ADDRESS_LINES: usize = 4;
const PHONE_Y: f64 = 663.5;
const FAX_Y: f64 = 652.0;
const DUE_DATE_POS: (f64, f64) = (110.0, 653.75);
const DOC_NUMBER_POS: (f64, f64) = (62.0, 705.5);

const TABLE_X: f64 = 42.0;
const TABLE_TOP_Y: f64 = 600.0;
const TABLE_HEADERS: [&str; 4] = ["Keterangan", "Harga(Rp)", "Qty", "Jml(Rp)"];
const COL_WIDTHS: [f64; 4] = [350.0, 70.0, 30.0, 75.0];
const ROW_HEIGHT: f64 = 20.0;
/// Rules sit this far below a row's baseline.
const RULE_DROP: f64 = 5.0;
/// Horizontal inset of full-width rules.
const RULE_MARGIN: f64 = 36.0;

const LINE_STEP: f64 = 15.0;
const SUMMARY_ROWS: usize = 5;
const STAMP_SIZE: (f64, f64) = (120.0, 90.0);
const SIGNATURE_LINE: &str =
    "(.................................................................)";

/// Nothing is drawn below this height.
const PAGE_FLOOR: f64 = 36.0;

/// A composed invoice and the values derived while composing it.
#[derive(Debug, Clone)]
pub struct ComposedInvoice {
    pub document: CanvasDocument,
    /// The printed document number, generated when the record had none.
    pub doc_number: String,
    pub totals: InvoiceTotals,
}

pub struct InvoiceComposer<'a> {
    config: &'a RenderConfig,
    fonts: &'a FontSet,
}

/// Column x positions, left to right.
fn column_x(col: usize) -> f64 {
    TABLE_X + COL_WIDTHS[..col].iter().sum::<f64>()
}

impl<'a> InvoiceComposer<'a> {
    pub fn new(config: &'a RenderConfig, fonts: &'a FontSet) -> Self {
        Self { config, fonts }
    }

    /// The record's document number, or a generated one when it is blank.
    pub fn document_number(&self, record: &InvoiceRecord) -> String {
        if !record.doc_number.trim().is_empty() {
            return record.doc_number.clone();
        }
        let sequence = record.order_id.as_deref().unwrap_or("0");
        document_number(&self.config.organization.prefix, &record.doc_type, sequence)
    }

    pub fn compose(&self, record: &InvoiceRecord) -> Result<ComposedInvoice, NotaError> {
        let totals = record.totals();
        let terbilang = number_to_words_id_width(totals.remaining, self.config.invoice.terbilang_width)?;
        let doc_number = self.document_number(record);

        let mut canvas = PageCanvas::new(self.fonts, self.config.page_size.dimensions());
        let assets = &self.config.assets;
        let background_path = match record.doc_type {
            DocType::Quotation => assets.quotation_background.as_deref(),
            _ => assets.invoice_background.as_deref(),
        };
        let background = register_asset(&mut canvas, background_path, "background")?;
        let stamp = register_asset(&mut canvas, assets.signature_stamp.as_deref(), "signature stamp")?;

        self.start_page(&mut canvas, background);
        self.draw_header(&mut canvas, record, &doc_number);

        let mut y = TABLE_TOP_Y;
        self.draw_table_header(&mut canvas, y);
        for item in &record.items {
            if y - ROW_HEIGHT - RULE_DROP < PAGE_FLOOR {
                tracing::debug!(page = canvas.page_count() + 1, "item table continues on a new page");
                canvas.show_page();
                self.start_page(&mut canvas, background);
                y = TABLE_TOP_Y;
                self.draw_table_header(&mut canvas, y);
            }
            y -= ROW_HEIGHT;
            self.draw_item_row(&mut canvas, y, item);
        }
        canvas.line(RULE_MARGIN, y - RULE_DROP, canvas.width() - RULE_MARGIN, y - RULE_DROP);

        let footer = footer_height(terbilang.len(), self.config.organization.payment_info.len());
        if y - footer < PAGE_FLOOR {
            tracing::debug!(footer, "totals block moved to a new page");
            canvas.show_page();
            self.start_page(&mut canvas, background);
            y = TABLE_TOP_Y;
        }

        self.draw_summary(&mut canvas, y, &totals);
        let last_y = self.draw_terbilang(&mut canvas, y - (SUMMARY_ROWS + 1) as f64 * ROW_HEIGHT, &terbilang);
        self.draw_signature(&mut canvas, last_y - LINE_STEP - 5.0, stamp);

        Ok(ComposedInvoice {
            document: canvas.finish(),
            doc_number,
            totals,
        })
    }

    fn start_page(&self, canvas: &mut PageCanvas<'_>, background: Option<ImageHandle>) {
        if let Some(handle) = background {
            let (w, h) = (canvas.width(), canvas.height());
            canvas.draw_image(handle, 0.0, 0.0, w, h);
        }
        canvas.set_fill_color(TEXT_COLOR);
        canvas.set_stroke_color(Color::BLACK);
        canvas.set_line_width(1.0);
        canvas.set_dash(None);
    }

    fn draw_header(&self, canvas: &mut PageCanvas<'_>, record: &InvoiceRecord, doc_number: &str) {
        canvas.set_font(FontRole::Regular, 10.0);
        canvas.draw_string(HEADER_X, CUSTOMER_NAME_Y, &record.customer_name);
        for (i, line) in record.customer_address.iter().take(ADDRESS_LINES).enumerate() {
            canvas.draw_string(HEADER_X, ADDRESS_TOP_Y - i as f64 * HEADER_STEP, line);
        }
        canvas.draw_string(HEADER_X, PHONE_Y, &record.customer_phone);
        canvas.draw_string(HEADER_X, FAX_Y, &record.customer_fax);
        canvas.draw_string(DUE_DATE_POS.0, DUE_DATE_POS.1, &record.due_date);

        canvas.set_font(FontRole::Italic, 12.0);
        canvas.draw_string(DOC_NUMBER_POS.0, DOC_NUMBER_POS.1, doc_number);
    }

    fn draw_table_header(&self, canvas: &mut PageCanvas<'_>, y: f64) {
        canvas.set_font(FontRole::Bold, 12.0);
        for (i, header) in TABLE_HEADERS.iter().enumerate() {
            canvas.draw_string(column_x(i), y, header);
        }
    }

    fn draw_item_row(&self, canvas: &mut PageCanvas<'_>, y: f64, item: &LineItem) {
        let rule_y = y + ROW_HEIGHT - RULE_DROP;
        canvas.line(RULE_MARGIN, rule_y, canvas.width() - RULE_MARGIN, rule_y);

        canvas.set_font(FontRole::Regular, 11.0);
        let name = capitalize_words(&item.name, self.config.invoice.item_name_width);
        canvas.draw_string(column_x(0), y, &name);
        canvas.draw_string(column_x(1), y, &format_with_thousands_separator(item.price));
        canvas.draw_string(column_x(2), y, &item.quantity.to_string());
        canvas.draw_string(column_x(3), y, &format_with_thousands_separator(item.total()));
    }

    /// Subtotal, discount, total, down payment and remaining balance, one
    /// ruled row each below `y`.
    fn draw_summary(&self, canvas: &mut PageCanvas<'_>, y: f64, totals: &InvoiceTotals) {
        let rows = [
            ("Subtotal", totals.subtotal, FontRole::Regular, 11.0),
            ("Diskon", totals.discount, FontRole::Regular, 11.0),
            ("Total", totals.grand_total, FontRole::Bold, 12.0),
            ("DP", totals.down_payment, FontRole::Regular, 12.0),
            ("Pelunasan", totals.remaining, FontRole::Bold, 12.0),
        ];
        let label_x = column_x(1);
        let rule_x1 = label_x - 10.0;
        let rule_x2 = canvas.width() - RULE_MARGIN;

        for (i, (label, amount, role, size)) in rows.into_iter().enumerate() {
            let row_y = y - (i + 1) as f64 * ROW_HEIGHT;
            canvas.set_font(role, size);
            canvas.draw_string(label_x, row_y, label);
            canvas.draw_string(column_x(3), row_y, &format_with_thousands_separator(amount));
            canvas.line(rule_x1, row_y - RULE_DROP, rule_x2, row_y - RULE_DROP);
        }
    }

    /// The "Terbilang" label at `y` and the spelled-out lines below it.
    /// Returns the baseline of the last line.
    fn draw_terbilang(&self, canvas: &mut PageCanvas<'_>, y: f64, lines: &[String]) -> f64 {
        canvas.set_font(FontRole::Bold, 12.0);
        canvas.draw_string(TABLE_X, y, "Terbilang");

        canvas.set_font(FontRole::Regular, 12.0);
        let mut line_y = y;
        for line in lines {
            line_y -= LINE_STEP;
            canvas.draw_string(TABLE_X, line_y, line);
        }
        line_y
    }

    /// Signatory block on the right, payment details on the left.
    fn draw_signature(&self, canvas: &mut PageCanvas<'_>, base_y: f64, stamp: Option<ImageHandle>) {
        let org = &self.config.organization;
        let base_x = column_x(1) - 10.0;

        if let Some(handle) = stamp {
            canvas.draw_image(
                handle,
                base_x + 30.0,
                base_y - LINE_STEP * 4.0,
                STAMP_SIZE.0,
                STAMP_SIZE.1,
            );
        }

        canvas.set_font(FontRole::Bold, 12.0);
        canvas.draw_string(base_x + 27.0, base_y - LINE_STEP * 4.6, &org.name);
        canvas.set_font(FontRole::Regular, 12.0);
        canvas.draw_string(base_x, base_y - LINE_STEP * 5.0, SIGNATURE_LINE);

        let pay_y = base_y - LINE_STEP * 4.0;
        canvas.set_font(FontRole::Bold, 12.0);
        canvas.draw_string(TABLE_X, pay_y, "Informasi Pembayaran");
        canvas.set_font(FontRole::Regular, 12.0);
        for (i, line) in org.payment_info.iter().enumerate() {
            canvas.draw_string(TABLE_X, pay_y - (i + 1) as f64 * LINE_STEP, line);
        }
    }
}

/// Height from the last item rule down to the lowest thing the footer draws.
fn footer_height(terbilang_lines: usize, payment_lines: usize) -> f64 {
    let summary = (SUMMARY_ROWS + 1) as f64 * ROW_HEIGHT;
    let terbilang = terbilang_lines as f64 * LINE_STEP + LINE_STEP + 5.0;
    let signature = (LINE_STEP * 5.0).max(LINE_STEP * (4.0 + payment_lines as f64));
    summary + terbilang + signature + RULE_DROP
}
