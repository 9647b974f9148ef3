/// Escape sequence written in place of a line break
pub const LINE_BREAK_ESCAPE: &str = "\\n";

/// Make transcript text safe for single-line tabular storage.
///
/// Every line break (`\n`, `\r\n` or a lone `\r`) becomes the two characters
/// `\` `n`. Nothing else is touched: residual markup, indentation and repeated
/// whitespace stay as extracted.
pub fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                cleaned.push_str(LINE_BREAK_ESCAPE);
            }
            '\n' => cleaned.push_str(LINE_BREAK_ESCAPE),
            _ => cleaned.push(c),
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_breaks_are_escaped() {
        assert_eq!(clean_text("a\nb"), "a\\nb");
        assert_eq!(clean_text("a\r\nb"), "a\\nb");
        assert_eq!(clean_text("a\rb"), "a\\nb");
        assert_eq!(clean_text("\n\n"), "\\n\\n");
    }

    #[test]
    fn test_other_text_is_untouched() {
        let input = "  Präsident Dr. Lammert:\t<b>Guten Morgen</b>   ";
        assert_eq!(clean_text(input), input);
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_output_is_single_line_and_not_shorter() {
        let input = "Erste Zeile\r\nZweite Zeile\nDritte\rVierte\n";
        let cleaned = clean_text(input);
        assert!(!cleaned.contains('\n'));
        assert!(!cleaned.contains('\r'));
        assert!(cleaned.len() >= input.len());
    }
}
