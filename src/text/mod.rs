//! # Text Wrapping
//!
//! Character-count line breaking for fixed-layout fields.
//!
//! The receipt and invoice templates are laid out on a grid sized for a fixed
//! number of characters per column, so lines are measured in chars rather
//! than points. Words are packed greedily; a word that is longer than the
//! column on its own is emitted as a single oversized line and never split.

/// Characters that separate words for [`capitalize_words`].
const CAPITALIZE_DELIMITERS: [char; 4] = [' ', '/', ',', '-'];

/// Break `text` into lines of at most `max_chars` characters.
///
/// When `break_token` is given, the text is first split on every literal
/// occurrence of the token and each segment is wrapped on its own. Lines from
/// different segments are never merged.
///
/// A line is closed before a word when the current line (including its
/// trailing separator space) plus the word would exceed `max_chars`.
pub fn wrap(text: &str, max_chars: usize, break_token: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();

    match break_token {
        Some(token) if !token.is_empty() => {
            for segment in text.split(token) {
                wrap_segment(segment, max_chars, &mut lines);
            }
        }
        _ => wrap_segment(text, max_chars, &mut lines),
    }

    lines
}

fn wrap_segment(segment: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    // Char count of `current`, trailing space included.
    let mut current_len = 0usize;

    for word in segment.split_whitespace() {
        let word_len = word.chars().count();

        if current_len + word_len > max_chars && current_len > 0 {
            out.push(current.trim_end().to_string());
            current.clear();
            current_len = 0;
        }

        current.push_str(word);
        current.push(' ');
        current_len += word_len + 1;
    }

    if current_len > 0 {
        out.push(current.trim_end().to_string());
    }
}

/// Title-case every word of `input` and cap the result at `max_chars`.
///
/// Words are delimited by space, `/`, `,` and `-`; each delimiter is kept
/// where it was. A word is capitalized as a whole: first character upper,
/// the rest lower. When the result is longer than `max_chars` it is cut at
/// the last space at or before `max_chars`. If there is no such space the
/// first word is kept whole, matching the oversized-word rule of [`wrap`],
/// so the result is then longer than `max_chars`.
pub fn capitalize_words(input: &str, max_chars: usize) -> String {
    let mut result = String::with_capacity(input.len());
    let mut at_word_start = true;

    for ch in input.chars() {
        if CAPITALIZE_DELIMITERS.contains(&ch) {
            result.push(ch);
            at_word_start = true;
        } else if at_word_start {
            result.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            result.extend(ch.to_lowercase());
        }
    }

    truncate_at_space(&result, max_chars)
}

fn truncate_at_space(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }

    let mut cut = max_chars;
    while cut > 0 && chars[cut] != ' ' {
        cut -= 1;
    }

    if cut == 0 {
        let first_word_end = chars.iter().position(|&c| c == ' ').unwrap_or(chars.len());
        return chars[..first_word_end].iter().collect();
    }

    let kept: String = chars[..cut].iter().collect();
    kept.trim_end().to_string()
}
