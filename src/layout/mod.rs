//! # Receipt Row Planner
//!
//! Decides which grid row every receipt field starts on, and how many rows
//! the whole receipt block needs.
//!
//! A receipt has two unrelated columns. The left holds the recipient and
//! sender blocks, the right holds the amount and the order detail. Each
//! column is described as an ordered list of [`Slot`]s and folded
//! top-to-bottom: a slot starts on the column's running row and then moves
//! it down by the slot's row cost. The block height is the taller column,
//! but never less than the configured floor so short orders still print a
//! consistent stub.
//!
//! Rows are 1-based: row 1 is the first data row below the subheader.

pub mod page_break;

use std::collections::BTreeMap;

use crate::config::{PaddingPolicy, ReceiptLayoutConfig};
use crate::model::ReceiptRecord;
use crate::numeral::format_with_thousands_separator;
use crate::text::wrap;

/// Every field a receipt prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    RecipientName,
    RecipientPhone,
    RecipientAddress,
    SenderName,
    SenderPhone,
    Total,
    OrderDetail,
}

impl FieldKey {
    /// Printed label, or `None` for fields drawn without one.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            FieldKey::RecipientName => Some("Kepada"),
            FieldKey::RecipientPhone | FieldKey::SenderPhone => Some("Telp"),
            FieldKey::RecipientAddress => Some("Alamat"),
            FieldKey::SenderName => Some("Pengirim"),
            FieldKey::Total => Some("Total"),
            FieldKey::OrderDetail => None,
        }
    }
}

/// Which side of the receipt a field lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

/// How a slot's text becomes lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    /// Greedy word wrap at the column width, honoring the break token.
    Wrapped,
    /// Printed as-is on one row.
    Single,
}

/// How far a slot moves its column's running row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowCost {
    /// One row per line, at least one.
    Lines,
    /// A fixed number of rows regardless of content.
    Fixed(usize),
}

/// One entry of a column's fold.
#[derive(Debug, Clone, Copy)]
struct Slot {
    key: FieldKey,
    content: Content,
    cost: RowCost,
}

const LEFT_COLUMN: [Slot; 5] = [
    Slot { key: FieldKey::RecipientName, content: Content::Wrapped, cost: RowCost::Lines },
    Slot { key: FieldKey::RecipientPhone, content: Content::Single, cost: RowCost::Fixed(1) },
    Slot { key: FieldKey::RecipientAddress, content: Content::Wrapped, cost: RowCost::Lines },
    Slot { key: FieldKey::SenderName, content: Content::Wrapped, cost: RowCost::Lines },
    Slot { key: FieldKey::SenderPhone, content: Content::Single, cost: RowCost::Fixed(1) },
];

// The amount takes two rows: its own and the "Pesanan" label row above the
// detail lines.
const RIGHT_COLUMN: [Slot; 2] = [
    Slot { key: FieldKey::Total, content: Content::Single, cost: RowCost::Fixed(2) },
    Slot { key: FieldKey::OrderDetail, content: Content::Wrapped, cost: RowCost::Lines },
];

/// Where one field lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRows {
    pub column: Column,
    /// First grid row of the field.
    pub start_row: usize,
    pub lines: Vec<String>,
}

/// The planned layout of one receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlan {
    pub fields: BTreeMap<FieldKey, FieldRows>,
    /// Last occupied row of the left column, after padding.
    pub left_rows: usize,
    /// Last occupied row of the right column, after padding.
    pub right_rows: usize,
    /// Rows the data area needs: the taller column or the floor.
    pub total_rows: usize,
}

impl RowPlan {
    pub fn field(&self, key: FieldKey) -> Option<&FieldRows> {
        self.fields.get(&key)
    }
}

/// Plans receipt rows for one layout configuration.
pub struct RowPlanner<'a> {
    config: &'a ReceiptLayoutConfig,
}

impl<'a> RowPlanner<'a> {
    pub fn new(config: &'a ReceiptLayoutConfig) -> Self {
        Self { config }
    }

    /// Compute start rows for every field and the receipt's row count.
    pub fn plan(&self, record: &ReceiptRecord) -> RowPlan {
        let mut fields = BTreeMap::new();

        let left = self.fold_column(Column::Left, &LEFT_COLUMN, record, &mut fields);
        let right = self.fold_column(Column::Right, &RIGHT_COLUMN, record, &mut fields);

        let left_rows = self.pad(left);
        let right_rows = self.pad(right);
        let total_rows = self.config.min_rows.max(left_rows).max(right_rows);

        RowPlan {
            fields,
            left_rows,
            right_rows,
            total_rows,
        }
    }

    /// Place a column's slots in order. Returns the column's last occupied row.
    fn fold_column(
        &self,
        column: Column,
        slots: &[Slot],
        record: &ReceiptRecord,
        fields: &mut BTreeMap<FieldKey, FieldRows>,
    ) -> usize {
        let width = match column {
            Column::Left => self.config.left_width,
            Column::Right => self.config.right_width,
        };

        let mut row = 1usize;
        let mut last_row = 0usize;

        for slot in slots {
            let text = field_text(record, slot.key);
            let lines = match slot.content {
                Content::Wrapped => wrap(&text, width, Some(self.config.break_token.as_str())),
                Content::Single => vec![text],
            };

            let occupied = lines.len().max(1);
            last_row = row + occupied - 1;

            let advance = match slot.cost {
                RowCost::Lines => occupied,
                RowCost::Fixed(n) => n,
            };

            fields.insert(
                slot.key,
                FieldRows {
                    column,
                    start_row: row,
                    lines,
                },
            );
            row += advance;
        }

        last_row
    }

    fn pad(&self, rows: usize) -> usize {
        match self.config.padding_policy {
            PaddingPolicy::PadAtFloor if rows >= self.config.min_rows => rows + 1,
            _ => rows,
        }
    }
}

/// The text a field prints before wrapping.
pub fn field_text(record: &ReceiptRecord, key: FieldKey) -> String {
    match key {
        FieldKey::RecipientName => record.recipient_name.clone(),
        FieldKey::RecipientPhone => record.recipient_phone.clone(),
        FieldKey::RecipientAddress => record.recipient_address.clone(),
        FieldKey::SenderName => record.sender_name.clone(),
        FieldKey::SenderPhone => record.sender_phone.clone(),
        FieldKey::Total => total_text(record),
        FieldKey::OrderDetail => record.order_detail.clone(),
    }
}

/// `Rp 2,525,000`, suffixed with ` - BCA` when a bank is named.
pub fn total_text(record: &ReceiptRecord) -> String {
    let mut text = format!("Rp {}", format_with_thousands_separator(record.total_amount));
    if let Some(bank) = record.bank_name.as_deref().filter(|b| !b.trim().is_empty()) {
        text.push_str(" - ");
        text.push_str(bank);
    }
    text
}

#[cfg(test)]
pub(crate) fn sample_receipt() -> ReceiptRecord {
    ReceiptRecord {
        order_id: "073-00068330".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_fields_hit_the_floor() {
        let config = ReceiptLayoutConfig::default();
        let plan = RowPlanner::new(&config).plan(&sample_receipt());

        assert_eq!(plan.left_rows, 5);
        assert_eq!(plan.right_rows, 3);
        assert_eq!(plan.total_rows, 13);
    }

    #[test]
    fn test_left_column_start_rows() {
        let config = ReceiptLayoutConfig::default();
        let mut record = sample_receipt();
        record.recipient_name = "Rudi Syahrudin Aulia Muhammad Rocky Gerung Super".to_string();
        record.recipient_address = "Jl. Babakan Madang No. 8 Sirkuit Sentul Bogor No 10".to_string();

        let plan = RowPlanner::new(&config).plan(&record);
        let start = |k| plan.field(k).unwrap().start_row;

        assert_eq!(start(FieldKey::RecipientName), 1);
        assert_eq!(plan.field(FieldKey::RecipientName).unwrap().lines.len(), 2);
        assert_eq!(start(FieldKey::RecipientPhone), 3);
        assert_eq!(start(FieldKey::RecipientAddress), 4);
        assert_eq!(start(FieldKey::SenderName), 6);
        assert_eq!(start(FieldKey::SenderPhone), 7);
        assert_eq!(plan.left_rows, 7);
    }

    #[test]
    fn test_right_column_detail_starts_two_rows_down() {
        let config = ReceiptLayoutConfig::default();
        let plan = RowPlanner::new(&config).plan(&sample_receipt());

        let total = plan.field(FieldKey::Total).unwrap();
        assert_eq!(total.start_row, 1);
        assert_eq!(total.lines, vec!["Rp 2,525,000 - BCA"]);
        assert_eq!(total.column, Column::Right);
        assert_eq!(plan.field(FieldKey::OrderDetail).unwrap().start_row, 3);
    }

    #[test]
    fn test_total_without_bank() {
        let mut record = sample_receipt();
        record.bank_name = None;
        assert_eq!(total_text(&record), "Rp 2,525,000");
        record.bank_name = Some("  ".to_string());
        assert_eq!(total_text(&record), "Rp 2,525,000");
    }

    #[test]
    fn test_break_tokens_grow_the_right_column() {
        let config = ReceiptLayoutConfig::default();
        let mut record = sample_receipt();
        record.order_detail = "000001~!~000~!~002~!~0000~!~03~!~000~!~004~!~000005~!~000006~!~000007~!~000008~!~000009~!~0".to_string();

        let plan = RowPlanner::new(&config).plan(&record);
        assert_eq!(plan.field(FieldKey::OrderDetail).unwrap().lines.len(), 13);
        assert_eq!(plan.right_rows, 15);
        assert_eq!(plan.total_rows, 15);
    }

    #[test]
    fn test_empty_wrapped_field_still_takes_a_row() {
        let config = ReceiptLayoutConfig::default();
        let mut record = sample_receipt();
        record.recipient_address = String::new();

        let plan = RowPlanner::new(&config).plan(&record);
        assert!(plan.field(FieldKey::RecipientAddress).unwrap().lines.is_empty());
        assert_eq!(plan.field(FieldKey::SenderName).unwrap().start_row, 4);
    }

    #[test]
    fn test_pad_at_floor_policy() {
        let config = ReceiptLayoutConfig {
            padding_policy: PaddingPolicy::PadAtFloor,
            ..Default::default()
        };
        let mut record = sample_receipt();
        // Short record: neither column reaches the floor, nothing changes.
        let plan = RowPlanner::new(&config).plan(&record);
        assert_eq!(plan.total_rows, 13);

        record.order_detail = (0..11).map(|i| i.to_string()).collect::<Vec<_>>().join("~!~");
        let plan = RowPlanner::new(&config).plan(&record);
        // Right column ends on row 13, reaching the floor, so it is padded.
        assert_eq!(plan.right_rows, 14);
        assert_eq!(plan.total_rows, 14);
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(FieldKey::SenderName.label(), Some("Pengirim"));
        assert_eq!(FieldKey::OrderDetail.label(), None);
    }
}
