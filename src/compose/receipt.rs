//! Shipping receipt stubs, stacked down the page.
//!
//! Each receipt is a bordered block split into two halves. Both halves carry
//! the same barcode along their left edge and the same subheader along the
//! top. The left half holds recipient and sender details, the right half the
//! amount and order detail. Row positions come from the
//! [`RowPlanner`](crate::layout::RowPlanner); the block is
//! `total_rows + padding_rows` grid rows tall.
//!
//! ```text
//!  +----+---------------------------+----+---------------------------+
//!  |    |       BELUM LUNAS (ORDER ..) |    |    BELUM LUNAS (ORDER ..) |
//!  | || | Kepada  : ...             | || | Total  : Rp ...           |
//!  | || | Telp    : ...             | || | Pesanan:                  |
//!  | || | Alamat  : ...             | || | <detail lines>            |
//!  +----+---------------------------+----+---------------------------+
//! ```

use rand::Rng;

use crate::barcode::{BarcodeEmbedder, SymbolEncoder};
use crate::canvas::{CanvasDocument, ImageHandle, PageCanvas};
use crate::config::RenderConfig;
use crate::error::NotaError;
use crate::font::{FontRole, FontSet};
use crate::image_loader::LoadedImage;
use crate::layout::page_break::{decide_break, BreakDecision};
use crate::layout::{Column, FieldKey, RowPlan, RowPlanner};
use crate::model::{Color, ReceiptRecord};

/// Baseline offset of text above its row's lower rule.
const TEXT_LEV: f64 = 3.3;
const FONT_SIZE: f64 = 8.0;
const BORDER_COLOR: Color = Color::gray(0.25);
const GRID_COLOR: Color = Color::gray(0.8);
/// Gap between a barcode and the block edges around it.
const BARCODE_PAD: (f64, f64) = (2.0, 3.0);
const LABEL_INSET: f64 = 5.0;
const LEFT_COLON_OFFSET: f64 = 37.0;
const RIGHT_COLON_OFFSET: f64 = 32.0;
/// Space kept between value text and the rule closing its half.
const RULE_CLEARANCE: f64 = 2.0;

pub struct ReceiptComposer<'a> {
    config: &'a RenderConfig,
    fonts: &'a FontSet,
    encoder: &'a dyn SymbolEncoder,
}

/// Horizontal positions inside one receipt block.
struct BlockGeometry {
    left_x: f64,
    mid_x: f64,
    right_x: f64,
    /// Rule right of each barcode.
    left_rule_x: f64,
    right_rule_x: f64,
}

impl<'a> ReceiptComposer<'a> {
    pub fn new(config: &'a RenderConfig, fonts: &'a FontSet, encoder: &'a dyn SymbolEncoder) -> Self {
        Self {
            config,
            fonts,
            encoder,
        }
    }

    fn unit(&self) -> f64 {
        self.config.receipt.row_unit
    }

    /// Height in points of a receipt with `plan`.
    pub fn block_height(&self, plan: &RowPlan) -> f64 {
        (plan.total_rows + self.config.receipt.padding_rows) as f64 * self.unit()
    }

    /// Compose a batch, one block per record in order.
    pub fn compose(&self, records: &[ReceiptRecord]) -> Result<CanvasDocument, NotaError> {
        self.compose_with(records, &mut rand::thread_rng())
    }

    /// Like [`compose`](Self::compose) with a caller-supplied source for
    /// barcode filler.
    pub fn compose_with<R: Rng>(
        &self,
        records: &[ReceiptRecord],
        rng: &mut R,
    ) -> Result<CanvasDocument, NotaError> {
        let mut canvas = PageCanvas::new(self.fonts, self.config.page_size.dimensions());
        let planner = RowPlanner::new(&self.config.receipt);
        let embedder = BarcodeEmbedder::new(&self.config.barcode, self.encoder);
        let floor = self.unit();

        for record in records {
            let plan = planner.plan(record);
            let height = self.block_height(&plan);

            let remaining = canvas.cursor_y() - floor;
            if decide_break(remaining, height, canvas.page_is_empty()) == BreakDecision::MoveToNextPage {
                tracing::debug!(order = %record.order_id, page = canvas.page_count() + 1, "receipt moved to a new page");
                canvas.show_page();
            }

            let raster = embedder.encode_payload_with(&barcode_payload(record), rng)?;
            let barcode = canvas.add_image(LoadedImage::from_gray_image(&raster));

            tracing::debug!(
                order = %record.order_id,
                rows = plan.total_rows,
                left = plan.left_rows,
                right = plan.right_rows,
                "planned receipt"
            );
            self.draw_block(&mut canvas, record, &plan, barcode);
            canvas.advance_cursor(height);
        }

        Ok(canvas.finish())
    }

    fn draw_block(
        &self,
        canvas: &mut PageCanvas<'_>,
        record: &ReceiptRecord,
        plan: &RowPlan,
        barcode: ImageHandle,
    ) {
        let unit = self.unit();
        let cursor = canvas.cursor_y();
        let top_y = cursor - unit;
        let bot_y = cursor - self.block_height(plan);

        let cfg = &self.config.barcode;
        let left_x = 2.0 * unit;
        let mid_x = canvas.width() / 2.0;
        let geo = BlockGeometry {
            left_x,
            mid_x,
            right_x: canvas.width() - 2.0 * unit,
            left_rule_x: left_x + BARCODE_PAD.0 + cfg.print_width + BARCODE_PAD.0,
            right_rule_x: mid_x + BARCODE_PAD.0 + cfg.print_width + BARCODE_PAD.0,
        };

        canvas.set_fill_color(Color::BLACK);
        canvas.set_stroke_color(BORDER_COLOR);
        canvas.set_line_width(1.0);
        canvas.set_dash(None);

        // Frame and center divider
        for x in [geo.left_x, geo.mid_x, geo.right_x] {
            canvas.line(x, top_y, x, bot_y);
        }
        canvas.line(geo.left_x, top_y, geo.right_x, top_y);
        canvas.line(geo.left_x, bot_y, geo.right_x, bot_y);

        canvas.set_font(FontRole::Regular, FONT_SIZE);
        let subheader = subheader_text(record);
        let sub_y = top_y - unit + TEXT_LEV;
        canvas.draw_right_string(geo.mid_x - 5.0, sub_y, &subheader);
        canvas.draw_right_string(geo.right_x - 5.0, sub_y, &subheader);

        if self.config.receipt.debug_grid {
            self.draw_debug_grid(canvas, &geo, top_y, plan);
        }

        for (edge_x, rule_x) in [(geo.left_x, geo.left_rule_x), (geo.mid_x, geo.right_rule_x)] {
            canvas.draw_image(
                barcode,
                edge_x + BARCODE_PAD.0,
                bot_y + BARCODE_PAD.1,
                cfg.print_width,
                cfg.print_height,
            );
            canvas.line(rule_x, bot_y, rule_x, top_y);
        }

        let base_y = top_y - 2.0 * unit + TEXT_LEV;
        let row_y = |row: usize| base_y - row as f64 * unit;

        let left_label_x = geo.left_rule_x + LABEL_INSET;
        let right_label_x = geo.right_rule_x + LABEL_INSET;

        let place = |column: Column, key: FieldKey| {
            let (label_x, colon_offset, limit_x) = match column {
                Column::Left => (left_label_x, LEFT_COLON_OFFSET, geo.mid_x),
                Column::Right => (right_label_x, RIGHT_COLON_OFFSET, geo.right_x),
            };
            let colon_x = label_x + colon_offset;
            // Detail lines run the full width of the half, below their label.
            let text_x = if key == FieldKey::OrderDetail {
                label_x
            } else {
                colon_x + LABEL_INSET
            };
            (label_x, colon_x, text_x, limit_x - RULE_CLEARANCE)
        };

        // One value size per half, small enough for its widest line.
        let mut value_size = [FONT_SIZE; 2];
        for (key, field) in &plan.fields {
            let (_, _, text_x, limit_x) = place(field.column, *key);
            let size = &mut value_size[field.column as usize];
            for line in &field.lines {
                *size = size.min(self.fit_size(line, limit_x - text_x));
            }
        }

        for (key, field) in &plan.fields {
            let (label_x, colon_x, text_x, _) = place(field.column, *key);

            if let Some(label) = key.label() {
                canvas.set_font(FontRole::Bold, FONT_SIZE);
                canvas.draw_string(label_x, row_y(field.start_row), label);
                canvas.draw_string(colon_x, row_y(field.start_row), ":");
            }

            canvas.set_font(FontRole::Regular, value_size[field.column as usize]);
            for (i, line) in field.lines.iter().enumerate() {
                canvas.draw_string(text_x, row_y(field.start_row + i), line);
            }
        }

        if let Some(detail) = plan.field(FieldKey::OrderDetail) {
            let label_row = detail.start_row.saturating_sub(1).max(1);
            canvas.set_font(FontRole::Bold, FONT_SIZE);
            canvas.draw_string(right_label_x, row_y(label_row), "Pesanan");
            canvas.draw_string(right_label_x + RIGHT_COLON_OFFSET, row_y(label_row), ":");
        }
    }

    /// Largest size up to [`FONT_SIZE`] at which `line` spans at most `avail` points.
    fn fit_size(&self, line: &str, avail: f64) -> f64 {
        let width = self.fonts.measure(FontRole::Regular, line, FONT_SIZE);
        if width <= avail || width <= 0.0 {
            FONT_SIZE
        } else {
            FONT_SIZE * avail.max(0.0) / width
        }
    }

    /// Numbered rules on every data row.
    fn draw_debug_grid(&self, canvas: &mut PageCanvas<'_>, geo: &BlockGeometry, top_y: f64, plan: &RowPlan) {
        let unit = self.unit();
        let rows = plan.total_rows + self.config.receipt.padding_rows;
        canvas.set_stroke_color(GRID_COLOR);
        canvas.set_dash(Some((1.0, 2.0)));
        for i in 1..rows.saturating_sub(2) {
            let y = top_y - (2 + i) as f64 * unit;
            canvas.line(geo.left_x, y, geo.right_x, y);
            canvas.draw_string(geo.mid_x - 10.0, y + TEXT_LEV, &i.to_string());
        }
        canvas.set_stroke_color(BORDER_COLOR);
        canvas.set_dash(None);
    }
}

/// `LUNAS (ORDER 073-00068330) 2023-01-25`.
pub fn subheader_text(record: &ReceiptRecord) -> String {
    let status = if record.paid { "LUNAS" } else { "BELUM LUNAS" };
    let date = record.invoice_date.split_whitespace().next().unwrap_or("");
    format!("{} (ORDER {}) {}", status, record.order_id, date)
        .trim_end()
        .to_string()
}

/// What the receipt barcode encodes.
pub fn barcode_payload(record: &ReceiptRecord) -> String {
    format!("{}|{}", record.order_id, record.recipient_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::{ModuleMatrix, QrSymbolEncoder};
    use crate::canvas::DrawOp;
    use crate::font::StandardFamily;
    use crate::layout::sample_receipt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Skips real symbol encoding so layout tests stay fast.
    struct BlankEncoder;

    impl SymbolEncoder for BlankEncoder {
        fn encode(&self, _payload: &[u8]) -> Result<ModuleMatrix, NotaError> {
            ModuleMatrix::new(1, 1, vec![true])
        }
    }

    fn compose(config: &RenderConfig, records: &[ReceiptRecord]) -> CanvasDocument {
        let fonts = FontSet::standard(StandardFamily::Courier);
        ReceiptComposer::new(config, &fonts, &BlankEncoder)
            .compose_with(records, &mut StdRng::seed_from_u64(1))
            .unwrap()
    }

    fn texts(page: &crate::canvas::CanvasPage) -> Vec<(f64, f64, String)> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, .. } => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_subheader() {
        let mut record = sample_receipt();
        assert_eq!(subheader_text(&record), "BELUM LUNAS (ORDER 073-00068330) 2023-01-25");
        record.paid = true;
        record.invoice_date = String::new();
        assert_eq!(subheader_text(&record), "LUNAS (ORDER 073-00068330)");
    }

    #[test]
    fn test_block_height_of_minimal_receipt() {
        let config = RenderConfig::default();
        let fonts = FontSet::standard(StandardFamily::Courier);
        let composer = ReceiptComposer::new(&config, &fonts, &BlankEncoder);
        let plan = RowPlanner::new(&config.receipt).plan(&sample_receipt());
        assert_eq!(composer.block_height(&plan), 16.0 * 12.0);
    }

    #[test]
    fn test_fixed_height_batch_paginates() {
        // A4 leaves 829.89pt above the floor: four 192pt blocks per page.
        let config = RenderConfig::default();
        let records = vec![sample_receipt(); 9];
        let doc = compose(&config, &records);

        assert_eq!(doc.pages.len(), 3);
        assert_eq!(doc.images.len(), 9);
        let subheaders_on = |p: usize| {
            texts(&doc.pages[p])
                .iter()
                .filter(|(_, _, t)| t.starts_with("BELUM LUNAS"))
                .count()
        };
        assert_eq!(subheaders_on(0), 8);
        assert_eq!(subheaders_on(1), 8);
        assert_eq!(subheaders_on(2), 2);
    }

    #[test]
    fn test_each_barcode_drawn_on_both_halves() {
        let config = RenderConfig::default();
        let doc = compose(&config, &[sample_receipt()]);
        let placements: Vec<(f64, f64)> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { handle, x, y, .. } => {
                    assert_eq!(handle.index(), 0);
                    Some((*x, *y))
                }
                _ => None,
            })
            .collect();
        let bot_y = 841.8898 - 192.0;
        assert_eq!(placements.len(), 2);
        assert!((placements[0].0 - 26.0).abs() < 1e-9);
        assert!((placements[1].0 - (595.2756 / 2.0 + 2.0)).abs() < 1e-9);
        assert!((placements[0].1 - (bot_y + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fields_land_on_planned_rows() {
        let config = RenderConfig::default();
        let doc = compose(&config, &[sample_receipt()]);
        let texts = texts(&doc.pages[0]);
        let find = |needle: &str| texts.iter().find(|(_, _, t)| t == needle).cloned().unwrap();

        let top_y = 841.8898 - 12.0;
        let base_y = top_y - 24.0 + TEXT_LEV;

        let kepada = find("Kepada");
        assert!((kepada.1 - (base_y - 12.0)).abs() < 1e-9);
        // Left labels sit right of the barcode rule: 24 + 2 + 50 + 2 + 5.
        assert!((kepada.0 - 83.0).abs() < 1e-9);

        let pengirim = find("Pengirim");
        assert!((pengirim.1 - (base_y - 4.0 * 12.0)).abs() < 1e-9);

        let total = find("Rp 2,525,000 - BCA");
        assert!((total.1 - (base_y - 12.0)).abs() < 1e-9);

        let pesanan = find("Pesanan");
        assert!((pesanan.1 - (base_y - 24.0)).abs() < 1e-9);

        let detail = find("Kemeja polos warna merah 1");
        assert!((detail.1 - (base_y - 36.0)).abs() < 1e-9);
        assert!((detail.0 - pesanan.0).abs() < 1e-9);
    }

    #[test]
    fn test_widest_lines_stay_inside_their_half() {
        let config = RenderConfig::default();
        let mut wide = sample_receipt();
        // Exactly the configured wrap widths: 37 chars left, 46 right.
        wide.recipient_address = "abcdefghij abcdefghij abcdefghij abcd".to_string();
        wide.order_detail = "abcdefghij abcdefghij abcdefghij abcdefghij ab".to_string();
        let doc = compose(&config, &[wide]);

        let fonts = FontSet::standard(StandardFamily::Courier);
        let (mid_x, right_x) = (595.2756 / 2.0, 595.2756 - 24.0);
        let mut checked = 0;
        for op in &doc.pages[0].ops {
            if let DrawOp::Text { x, text, role, size, .. } = op {
                let end = x + fonts.measure(*role, text, *size);
                let limit = if *x < mid_x { mid_x } else { right_x };
                assert!(end <= limit + 1e-9, "{:?} at {} ends at {} past {}", text, x, end, limit);
                checked += 1;
            }
        }
        assert!(checked > 10);

        let sizes: Vec<f64> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, size, .. } if text.starts_with("abcdefghij") => Some(*size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes.len(), 2);
        assert!(sizes.iter().all(|s| *s < FONT_SIZE));
    }

    #[test]
    fn test_short_values_keep_full_size() {
        let doc = compose(&RenderConfig::default(), &[sample_receipt()]);
        for op in &doc.pages[0].ops {
            if let DrawOp::Text { size, .. } = op {
                assert_eq!(*size, FONT_SIZE);
            }
        }
    }

    #[test]
    fn test_tall_receipt_grows_block() {
        let config = RenderConfig::default();
        let mut tall = sample_receipt();
        tall.order_detail = (0..40).map(|i| format!("Line {}", i)).collect::<Vec<_>>().join("~!~");
        let doc = compose(&config, &[sample_receipt(), tall.clone(), sample_receipt()]);

        // 192 + 540 fit on the first page; the third block does not.
        let plan = RowPlanner::new(&config.receipt).plan(&tall);
        assert_eq!(plan.total_rows, 42);
        assert_eq!(doc.pages.len(), 2);
    }

    #[test]
    fn test_debug_grid_numbers_rows() {
        let mut config = RenderConfig::default();
        config.receipt.debug_grid = true;
        let doc = compose(&config, &[sample_receipt()]);
        let texts = texts(&doc.pages[0]);
        assert!(texts.iter().any(|(_, _, t)| t == "1"));
        assert!(texts.iter().any(|(_, _, t)| t == "13"));
        assert!(!texts.iter().any(|(_, _, t)| t == "14"));
    }

    #[test]
    fn test_empty_batch_yields_one_blank_page() {
        let doc = compose(&RenderConfig::default(), &[]);
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].ops.is_empty());
    }

    #[test]
    fn test_real_encoder_raster_size() {
        let config = RenderConfig::default();
        let fonts = FontSet::standard(StandardFamily::Courier);
        let doc = ReceiptComposer::new(&config, &fonts, &QrSymbolEncoder)
            .compose_with(&[sample_receipt()], &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!((doc.images[0].width_px, doc.images[0].height_px), (100, 350));
    }
}
