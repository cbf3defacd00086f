//! # Numeral Formatting
//!
//! Thousands-separated amounts and Indonesian spelled-out amounts
//! ("terbilang") for the invoice totals block.

use std::fmt::Display;

use crate::error::NotaError;
use crate::text::wrap;

/// Separator placed between digit groups.
pub const THOUSANDS_SEPARATOR: char = ',';

/// Width, in characters, of one printed terbilang line.
pub const TERBILANG_LINE_WIDTH: usize = 70;

const CURRENCY_WORD: &str = "RUPIAH";
const ZERO_WORD: &str = "NOL";

const DIGITS: [&str; 10] = [
    "", "SATU", "DUA", "TIGA", "EMPAT", "LIMA", "ENAM", "TUJUH", "DELAPAN", "SEMBILAN",
];

/// Scale words for successive groups of three digits. Index 0 is the units group.
const SCALES: [&str; 7] = ["", "RIBU", "JUTA", "MILYAR", "TRILIUN", "KUADRILIUN", "KUINTILIUN"];

/// Group the integer digits of `number` by three from the right.
///
/// Works on the `Display` form of the value, so a leading sign and any
/// fractional part pass through untouched: `-1234.5` becomes `-1,234.5`.
pub fn format_with_thousands_separator<N: Display>(number: N) -> String {
    group_digits(&number.to_string(), THOUSANDS_SEPARATOR)
}

/// Insert `separator` between groups of three digits in a rendered number.
pub fn group_digits(rendered: &str, separator: char) -> String {
    let (sign, unsigned) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => match rendered.strip_prefix('+') {
            Some(rest) => ("+", rest),
            None => ("", rendered),
        },
    };

    let split_at = unsigned.find('.').unwrap_or(unsigned.len());
    let (integer, fraction) = unsigned.split_at(split_at);

    let digit_count = integer.chars().count();
    let mut out = String::with_capacity(rendered.len() + digit_count / 3);
    out.push_str(sign);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (digit_count - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out.push_str(fraction);
    out
}

/// Spell out `amount` in Indonesian, suffixed with the currency word, and
/// wrap the phrase into printable lines of [`TERBILANG_LINE_WIDTH`] chars.
///
/// Negative amounts have no spelled-out form and are rejected.
pub fn number_to_words_id(amount: i64) -> Result<Vec<String>, NotaError> {
    number_to_words_id_width(amount, TERBILANG_LINE_WIDTH)
}

/// [`number_to_words_id`] with an explicit line width.
pub fn number_to_words_id_width(amount: i64, line_width: usize) -> Result<Vec<String>, NotaError> {
    let value = u64::try_from(amount).map_err(|_| NotaError::NegativeAmount(amount))?;
    let phrase = format!("{} {}", spell_out(value), CURRENCY_WORD);
    Ok(wrap(&phrase, line_width, None))
}

/// Spell out a non-negative integer without the currency word.
pub fn spell_out(value: u64) -> String {
    if value == 0 {
        return ZERO_WORD.to_string();
    }

    let mut groups = Vec::new();
    let mut rest = value;
    while rest > 0 {
        groups.push((rest % 1000) as u16);
        rest /= 1000;
    }

    let mut words: Vec<&'static str> = Vec::new();
    for (scale, &group) in groups.iter().enumerate().rev() {
        if group == 0 {
            continue;
        }
        group_words(group, &mut words);
        if scale > 0 {
            words.push(SCALES[scale]);
        }
    }

    words.join(" ")
}

/// Words for a group of three digits (1..=999).
fn group_words(group: u16, out: &mut Vec<&'static str>) {
    let hundreds = (group / 100) as usize;
    let rest = group % 100;

    match hundreds {
        0 => {}
        1 => out.push("SERATUS"),
        h => {
            out.push(DIGITS[h]);
            out.push("RATUS");
        }
    }

    match rest {
        0 => {}
        1..=9 => out.push(DIGITS[rest as usize]),
        10 => out.push("SEPULUH"),
        11 => out.push("SEBELAS"),
        12..=19 => {
            out.push(DIGITS[(rest - 10) as usize]);
            out.push("BELAS");
        }
        _ => {
            out.push(DIGITS[(rest / 10) as usize]);
            out.push("PULUH");
            if rest % 10 > 0 {
                out.push(DIGITS[(rest % 10) as usize]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(format_with_thousands_separator(1000), "1,000");
        assert_eq!(format_with_thousands_separator(1234567890), "1,234,567,890");
        assert_eq!(format_with_thousands_separator(999), "999");
        assert_eq!(format_with_thousands_separator(0), "0");
        assert_eq!(format_with_thousands_separator(100000), "100,000");
    }

    #[test]
    fn test_thousands_separator_sign_and_fraction() {
        assert_eq!(format_with_thousands_separator(-2525000), "-2,525,000");
        assert_eq!(format_with_thousands_separator(1234.5), "1,234.5");
        assert_eq!(group_digits("+1234567.125", '.'), "+1.234.567.125");
    }

    #[test]
    fn test_terbilang_zero() {
        assert_eq!(number_to_words_id(0).unwrap(), vec!["NOL RUPIAH"]);
    }

    #[test]
    fn test_terbilang_hundreds() {
        assert_eq!(
            number_to_words_id(150).unwrap(),
            vec!["SERATUS LIMA PULUH RUPIAH"]
        );
        assert_eq!(spell_out(200), "DUA RATUS");
        assert_eq!(spell_out(999), "SEMBILAN RATUS SEMBILAN PULUH SEMBILAN");
    }

    #[test]
    fn test_terbilang_teens_are_irregular() {
        assert_eq!(spell_out(17), "TUJUH BELAS");
        assert_eq!(spell_out(11), "SEBELAS");
        assert_eq!(spell_out(10), "SEPULUH");
        assert_eq!(spell_out(17_017), "TUJUH BELAS RIBU TUJUH BELAS");
        assert!(!spell_out(117).contains("SEPULUH TUJUH"));
    }

    #[test]
    fn test_terbilang_scales() {
        assert_eq!(spell_out(1_000), "SATU RIBU");
        assert_eq!(spell_out(1_500), "SATU RIBU LIMA RATUS");
        assert_eq!(spell_out(2_000_000), "DUA JUTA");
        assert_eq!(spell_out(1_000_000), "SATU JUTA");
        assert_eq!(
            spell_out(2_525_000),
            "DUA JUTA LIMA RATUS DUA PULUH LIMA RIBU"
        );
        assert_eq!(spell_out(3_000_000_005), "TIGA MILYAR LIMA");
        assert_eq!(spell_out(4_000_000_000_000), "EMPAT TRILIUN");
    }

    #[test]
    fn test_terbilang_wraps_long_phrases() {
        let lines = number_to_words_id(987_654_321_987).unwrap();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= TERBILANG_LINE_WIDTH);
        }
        assert!(lines.last().unwrap().ends_with("RUPIAH"));
    }

    #[test]
    fn test_terbilang_rejects_negative() {
        assert!(matches!(
            number_to_words_id(-1),
            Err(NotaError::NegativeAmount(-1))
        ));
    }

    #[test]
    fn test_terbilang_largest_value() {
        let words = spell_out(u64::MAX);
        assert!(words.starts_with("DELAPAN BELAS KUINTILIUN"));
    }
}
