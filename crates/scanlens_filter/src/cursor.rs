//! Stateful read-only scanner over the remaining filter input.

/// Character-oriented cursor used by the recursive-descent parser.
///
/// All operations are total: counts are clamped to the remaining length and
/// nothing here can fail.
#[derive(Debug, Clone)]
pub struct StringConsumer<'a> {
    rest: &'a str,
}

impl<'a> StringConsumer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// Byte offset of the `count`-th character boundary, clamped to the end.
    fn boundary(&self, count: usize) -> usize {
        self.rest
            .char_indices()
            .nth(count)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len())
    }

    /// Up to `count` characters of lookahead, without consuming.
    pub fn peek(&self, count: usize) -> &'a str {
        &self.rest[..self.boundary(count)]
    }

    /// Consume and return up to `count` characters.
    pub fn consume(&mut self, count: usize) -> &'a str {
        let (head, tail) = self.rest.split_at(self.boundary(count));
        self.rest = tail;
        head
    }

    pub fn has_more_chars(&self) -> bool {
        !self.rest.is_empty()
    }

    /// Trim leading whitespace, returning how many characters were removed.
    pub fn remove_leading_whitespace(&mut self) -> usize {
        let removed = self
            .rest
            .chars()
            .take_while(|c| c.is_whitespace())
            .count();
        self.rest = self.rest.trim_start();
        removed
    }

    /// The unparsed remainder, for error reporting.
    pub fn remainder(&self) -> &'a str {
        self.rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let cursor = StringConsumer::new("abc");
        assert_eq!(cursor.peek(2), "ab");
        assert_eq!(cursor.peek(2), "ab");
        assert_eq!(cursor.peek(10), "abc");
    }

    #[test]
    fn test_consume_clamps_to_remaining() {
        let mut cursor = StringConsumer::new("abc");
        assert_eq!(cursor.consume(2), "ab");
        assert_eq!(cursor.consume(5), "c");
        assert_eq!(cursor.consume(1), "");
        assert!(!cursor.has_more_chars());
    }

    #[test]
    fn test_remove_leading_whitespace_counts_chars() {
        let mut cursor = StringConsumer::new("  \t x");
        assert_eq!(cursor.remove_leading_whitespace(), 4);
        assert_eq!(cursor.remainder(), "x");
        assert_eq!(cursor.remove_leading_whitespace(), 0);
    }

    #[test]
    fn test_multibyte_input() {
        let mut cursor = StringConsumer::new("äöü");
        assert_eq!(cursor.peek(1), "ä");
        assert_eq!(cursor.consume(2), "äö");
        assert_eq!(cursor.remainder(), "ü");
    }
}
