//! Document numbers of the form `HCX/INV/2024/VI/1234`.

use std::fmt::Display;

use chrono::{Datelike, Local, NaiveDate};

use crate::model::DocType;

const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Roman numeral for a calendar month (1-12).
pub fn roman_month(month: u32) -> &'static str {
    let idx = month.clamp(1, 12) as usize - 1;
    ROMAN_MONTHS[idx]
}

/// Build `{prefix}/{doc code}/{year}/{roman month}/{sequence}` for a given date.
pub fn document_number_on<S: Display>(
    prefix: &str,
    doc_type: &DocType,
    date: NaiveDate,
    sequence: S,
) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        prefix,
        doc_type.code(),
        date.year(),
        roman_month(date.month()),
        sequence
    )
}

/// [`document_number_on`] for today's local date.
pub fn document_number<S: Display>(prefix: &str, doc_type: &DocType, sequence: S) -> String {
    document_number_on(prefix, doc_type, Local::now().date_naive(), sequence)
}
