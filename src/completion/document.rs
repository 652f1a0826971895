//! Input snapshot handed to every completer source

/// Full input text plus cursor position.
///
/// The cursor is a byte offset. Offsets past the end or inside a multi-byte
/// character are clamped down to the nearest character boundary, so any value
/// the host passes is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    cursor: usize,
}

impl Document {
    /// Create a document with an explicit cursor position
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let mut cursor = cursor.min(text.len());
        while !text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        Self { text, cursor }
    }

    /// Create a document with the cursor at the end of the text
    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    /// Full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position (byte index)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text between the start of the input and the cursor
    pub fn text_before_cursor(&self) -> &str {
        &self.text[..self.cursor]
    }

    /// Last whitespace-delimited word before the cursor.
    ///
    /// Empty when the cursor follows whitespace.
    pub fn word_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        let start = before
            .rfind(char::is_whitespace)
            .map(|i| i + before[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        &before[start..]
    }

    /// Character immediately before the cursor
    pub fn char_before_cursor(&self) -> Option<char> {
        self.text_before_cursor().chars().next_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_clamped_to_text() {
        let doc = Document::new("abc", 99);
        assert_eq!(doc.cursor(), 3);
        assert_eq!(doc.text_before_cursor(), "abc");
    }

    #[test]
    fn test_cursor_clamped_to_char_boundary() {
        // 'é' is two bytes; offset 2 falls inside it
        let doc = Document::new("aé", 2);
        assert_eq!(doc.cursor(), 1);
        assert_eq!(doc.text_before_cursor(), "a");
    }

    #[test]
    fn test_word_before_cursor() {
        assert_eq!(Document::at_end("select s1.ta").word_before_cursor(), "s1.ta");
        assert_eq!(Document::at_end("select ").word_before_cursor(), "");
        assert_eq!(Document::at_end("").word_before_cursor(), "");
        assert_eq!(Document::new("foo bar", 5).word_before_cursor(), "b");
    }

    #[test]
    fn test_char_before_cursor() {
        assert_eq!(Document::at_end("s1.").char_before_cursor(), Some('.'));
        assert_eq!(Document::at_end("").char_before_cursor(), None);
    }
}
