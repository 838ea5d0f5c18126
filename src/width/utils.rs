/// Display width of `text` in monospace cells after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_escape_sequences() {
        assert_eq!(display_width("\u{1b}[31mSave\u{1b}[0m"), 4);
    }

    #[test]
    fn counts_wide_glyphs_twice() {
        assert_eq!(display_width("ab"), 2);
        assert_eq!(display_width("日本"), 4);
    }
}
