//! # Record Model
//!
//! The input representation for the renderer. Records are assembled by the
//! order backend from persisted rows and handed in by value; the renderer
//! never validates or retains them.
//!
//! Two document kinds exist:
//!
//! - [`InvoiceRecord`]: a quotation or invoice with line items, rendered one
//!   per document on a pre-printed background template.
//! - [`ReceiptRecord`]: a shipping receipt stub, rendered in batches with
//!   many receipts stacked down each page.

use serde::{Deserialize, Serialize};

/// Quotation or invoice. Unknown codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocType {
    Quotation,
    Invoice,
    Other(String),
}

impl DocType {
    /// Three-letter code used in document numbers.
    pub fn code(&self) -> &'static str {
        match self {
            DocType::Quotation => "QUO",
            DocType::Invoice => "INV",
            DocType::Other(_) => "OTH",
        }
    }
}

impl From<String> for DocType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "Q" | "QUO" | "QUOTATION" => DocType::Quotation,
            "I" | "INV" | "INVOICE" => DocType::Invoice,
            _ => DocType::Other(raw),
        }
    }
}

impl From<DocType> for String {
    fn from(doc_type: DocType) -> Self {
        match doc_type {
            DocType::Quotation => "Q".to_string(),
            DocType::Invoice => "I".to_string(),
            DocType::Other(raw) => raw,
        }
    }
}

/// One row of the invoice item table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(alias = "item_name", alias = "itemName")]
    pub name: String,
    /// Unit price in whole rupiah.
    #[serde(alias = "item_price", alias = "itemPrice")]
    pub price: u64,
    #[serde(alias = "item_qty", alias = "itemQty")]
    pub quantity: u64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: u64, quantity: u64) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Price times quantity.
    pub fn total(&self) -> u64 {
        self.price.saturating_mul(self.quantity)
    }
}

/// A quotation or invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "InvoiceRecordWire")]
pub struct InvoiceRecord {
    pub doc_type: DocType,

    /// Printed document number. When empty, one is generated from the
    /// configured prefix and [`InvoiceRecord::order_id`].
    pub doc_number: String,

    /// Order this document belongs to, used as the sequence part of a
    /// generated document number.
    pub order_id: Option<String>,

    pub due_date: String,

    pub customer_name: String,

    /// Up to four printed address lines. Extra lines are ignored.
    pub customer_address: Vec<String>,

    pub customer_phone: String,

    pub customer_fax: String,

    pub items: Vec<LineItem>,

    pub discount: u64,

    pub down_payment: u64,
}

/// Accepted input shape of an [`InvoiceRecord`].
///
/// The order backend sends the address as four flat `customer_addr_N` keys,
/// the order id as a number and absent adjustments as `null`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceRecordWire {
    #[serde(alias = "doc_type")]
    doc_type: DocType,
    #[serde(default, alias = "doc_number")]
    doc_number: Option<String>,
    #[serde(default, alias = "order_id")]
    order_id: Option<OrderId>,
    #[serde(default, alias = "due_date")]
    due_date: Option<String>,
    #[serde(alias = "customer_name")]
    customer_name: String,
    #[serde(default, alias = "customer_address")]
    customer_address: Vec<String>,
    #[serde(default, alias = "customer_addr_1")]
    customer_addr1: Option<String>,
    #[serde(default, alias = "customer_addr_2")]
    customer_addr2: Option<String>,
    #[serde(default, alias = "customer_addr_3")]
    customer_addr3: Option<String>,
    #[serde(default, alias = "customer_addr_4")]
    customer_addr4: Option<String>,
    #[serde(default, alias = "cust_phone")]
    customer_phone: Option<String>,
    #[serde(default, alias = "cust_fax")]
    customer_fax: Option<String>,
    items: Vec<LineItem>,
    #[serde(default, alias = "diskon")]
    discount: Option<u64>,
    #[serde(default, alias = "down_payment")]
    down_payment: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderId {
    Text(String),
    Number(i64),
}

impl From<InvoiceRecordWire> for InvoiceRecord {
    fn from(wire: InvoiceRecordWire) -> Self {
        let mut customer_address = wire.customer_address;
        if customer_address.is_empty() {
            // Positions are kept: a blank second line still leaves its gap.
            customer_address = [
                wire.customer_addr1,
                wire.customer_addr2,
                wire.customer_addr3,
                wire.customer_addr4,
            ]
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
            while customer_address.last().is_some_and(|line| line.trim().is_empty()) {
                customer_address.pop();
            }
        }

        Self {
            doc_type: wire.doc_type,
            doc_number: wire.doc_number.unwrap_or_default(),
            order_id: wire.order_id.map(|id| match id {
                OrderId::Text(text) => text,
                OrderId::Number(n) => n.to_string(),
            }),
            due_date: wire.due_date.unwrap_or_default(),
            customer_name: wire.customer_name,
            customer_address,
            customer_phone: wire.customer_phone.unwrap_or_default(),
            customer_fax: wire.customer_fax.unwrap_or_default(),
            items: wire.items,
            discount: wire.discount.unwrap_or_default(),
            down_payment: wire.down_payment.unwrap_or_default(),
        }
    }
}

/// Amounts derived from an invoice's items and adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: i64,
    pub discount: i64,
    pub grand_total: i64,
    pub down_payment: i64,
    /// What is still owed after the down payment ("pelunasan").
    pub remaining: i64,
}

impl InvoiceRecord {
    /// Sum the items and apply discount and down payment.
    pub fn totals(&self) -> InvoiceTotals {
        let subtotal = self
            .items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.total()));
        let subtotal = clamp_i64(subtotal);
        let discount = clamp_i64(self.discount);
        let down_payment = clamp_i64(self.down_payment);
        let grand_total = subtotal - discount;
        InvoiceTotals {
            subtotal,
            discount,
            grand_total,
            down_payment,
            remaining: grand_total - down_payment,
        }
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// A shipping receipt stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    /// Human-readable order identifier, e.g. `073-00068330`.
    #[serde(alias = "orderanku_id", alias = "order_id")]
    pub order_id: String,

    #[serde(alias = "receipent_name", alias = "recipient_name")]
    pub recipient_name: String,

    #[serde(default, alias = "receipent_telp", alias = "recipient_phone")]
    pub recipient_phone: String,

    #[serde(default, alias = "receipent_addr", alias = "recipient_address")]
    pub recipient_address: String,

    #[serde(default, alias = "sender_name")]
    pub sender_name: String,

    #[serde(default, alias = "sender_telp", alias = "sender_phone")]
    pub sender_phone: String,

    #[serde(alias = "total_amount")]
    pub total_amount: i64,

    #[serde(default, alias = "bank_name")]
    pub bank_name: Option<String>,

    /// Free-text order description. May contain explicit break tokens.
    #[serde(default, alias = "order_detail")]
    pub order_detail: String,

    #[serde(default, alias = "paid_flag")]
    pub paid: bool,

    /// When the order was invoiced, e.g. `2023-01-25 11:20:00`.
    #[serde(default, alias = "invoice_date")]
    pub invoice_date: String,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.2756, 841.8898),
            PageSize::A5 => (419.5276, 595.2756),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// An RGB fill or stroke color, components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f64) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}
