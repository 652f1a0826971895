//! Shell-style tokenizer for command input
//!
//! Splits on whitespace outside quotes, honours single quotes, double quotes
//! and backslash escapes, and never fails: an unterminated quote or a trailing
//! escape yields the partial token as-is. Comment characters are ordinary
//! characters.

use std::ops::Range;

/// A token together with the raw byte range it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token value with quotes and escapes removed
    pub value: String,
    /// Byte range in the source, including quotes
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between or inside unquoted words
    Plain,
    /// Inside '...': everything is literal
    Single,
    /// Inside "...": backslash escapes only `"` and `\`
    Double,
    /// After a backslash; remembers where to return
    Escape(Quoting),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    Plain,
    Double,
}

/// Split `text` into token values.
///
/// Pure function: identical input always yields identical tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with_spans(text)
        .into_iter()
        .map(|token| token.value)
        .collect()
}

/// Split `text` into tokens, keeping the raw span of each
pub fn tokenize_with_spans(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut state = State::Plain;
    let mut value = String::new();
    let mut start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        match state {
            State::Plain => {
                if ch.is_whitespace() {
                    if let Some(begin) = start.take() {
                        tokens.push(Token {
                            value: std::mem::take(&mut value),
                            span: begin..i,
                        });
                    }
                    continue;
                }
                start.get_or_insert(i);
                match ch {
                    '\'' => state = State::Single,
                    '"' => state = State::Double,
                    '\\' => state = State::Escape(Quoting::Plain),
                    _ => value.push(ch),
                }
            }
            State::Single => match ch {
                '\'' => state = State::Plain,
                _ => value.push(ch),
            },
            State::Double => match ch {
                '"' => state = State::Plain,
                '\\' => state = State::Escape(Quoting::Double),
                _ => value.push(ch),
            },
            State::Escape(Quoting::Plain) => {
                value.push(ch);
                state = State::Plain;
            }
            State::Escape(Quoting::Double) => {
                // Inside double quotes only the quote and the escape itself are escapable
                if ch != '"' && ch != '\\' {
                    value.push('\\');
                }
                value.push(ch);
                state = State::Double;
            }
        }
    }

    // Unterminated quote or dangling escape: keep what was read
    if let Some(begin) = start {
        tokens.push(Token {
            value,
            span: begin..text.len(),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_split() {
        assert_eq!(tokenize("timer  add\t--billable "), vec!["timer", "add", "--billable"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_unterminated_quote_keeps_partial_token() {
        assert_eq!(tokenize("foo 'bar baz"), vec!["foo", "bar baz"]);
        assert_eq!(tokenize("foo \"bar"), vec!["foo", "bar"]);
    }

    #[test]
    fn test_lone_open_quote_yields_empty_token() {
        assert_eq!(tokenize("foo '"), vec!["foo", ""]);
    }

    #[test]
    fn test_trailing_escape() {
        assert_eq!(tokenize("foo bar\\"), vec!["foo", "bar"]);
    }

    #[test]
    fn test_quotes_join_adjacent_text() {
        assert_eq!(tokenize("a\"b c\"d e"), vec!["ab cd", "e"]);
        assert_eq!(tokenize("''"), vec![""]);
    }

    #[test]
    fn test_escapes() {
        assert_eq!(tokenize("a\\ b"), vec!["a b"]);
        assert_eq!(tokenize("\"a\\\"b\""), vec!["a\"b"]);
        assert_eq!(tokenize("\"a\\nb\""), vec!["a\\nb"]);
        assert_eq!(tokenize("'a\\b'"), vec!["a\\b"]);
    }

    #[test]
    fn test_comment_chars_are_kept() {
        assert_eq!(tokenize("note #tag"), vec!["note", "#tag"]);
    }

    #[test]
    fn test_spans_cover_raw_text() {
        let tokens = tokenize_with_spans("add 'my note' x");
        assert_eq!(tokens[1].value, "my note");
        assert_eq!(tokens[1].span, 4..13);
        assert_eq!(tokens[2].span, 14..15);

        let tokens = tokenize_with_spans("add 'open");
        assert_eq!(tokens[1].span, 4..9);
    }

    #[test]
    fn test_deterministic() {
        let input = "timer add -p 'proj x' --note \"a\\\"b";
        assert_eq!(tokenize(input), tokenize(input));
    }
}
