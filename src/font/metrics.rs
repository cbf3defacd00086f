//! Advance widths for the standard PDF fonts the templates fall back to.
//!
//! Values are the AFM widths (units per 1000 em) for printable ASCII,
//! 0x20 through 0x7E. Anything else measures as the font's average width.

/// Helvetica and Helvetica-Oblique.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0' - '9'
    278, 278, 584, 584, 584, 556, 1015, // ':' - '@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A' - 'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N' - 'Z'
    278, 278, 278, 469, 556, 333, // '[' - '`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a' - 'm'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n' - 'z'
    334, 260, 334, 584, // '{' - '~'
];

/// Helvetica-Bold.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' - '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0' - '9'
    333, 333, 584, 584, 584, 611, 975, // ':' - '@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A' - 'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N' - 'Z'
    333, 278, 333, 584, 556, 333, // '[' - '`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a' - 'm'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n' - 'z'
    389, 280, 389, 584, // '{' - '~'
];

/// Width metrics for one standard font.
#[derive(Debug, Clone, Copy)]
pub enum StandardFontMetrics {
    Table(&'static [u16; 95]),
    /// Every glyph has the same advance (Courier family).
    Monospaced(u16),
}

impl StandardFontMetrics {
    pub const HELVETICA: StandardFontMetrics = StandardFontMetrics::Table(&HELVETICA);
    pub const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics::Table(&HELVETICA_BOLD);
    pub const COURIER: StandardFontMetrics = StandardFontMetrics::Monospaced(600);

    /// Advance width of `ch` in 1/1000 em.
    pub fn units(&self, ch: char) -> u16 {
        match self {
            StandardFontMetrics::Monospaced(w) => *w,
            StandardFontMetrics::Table(table) => {
                let cp = ch as u32;
                if (0x20..=0x7E).contains(&cp) {
                    table[(cp - 0x20) as usize]
                } else {
                    556
                }
            }
        }
    }

    /// Width of `ch` in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.units(ch) as f64 * font_size / 1000.0
    }

    /// Width of `text` in points at `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}
