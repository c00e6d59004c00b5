// Scanning primitives over an immutable text buffer.
//
// The end of the buffer acts as the terminator, none of the primitives
// can move past it.

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a str,
    offset: usize,
    line: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a str) -> Cursor<'a> {
        Cursor { data, offset: 0, line: 1 }
    }

    /// Current byte, `None` at end of buffer.
    pub fn current(&self) -> Option<u8> {
        self.data.as_bytes().get(self.offset).copied()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based line number.
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.data[start..end]
    }

    // Step over the current byte.
    pub fn bump(&mut self) {
        if let Some(c) = self.current() {
            if c == b'\n' {
                self.line += 1;
            }
            self.offset += 1;
        }
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        while let Some(c) = self.current() {
            if !pred(c) {
                return true;
            }
            self.bump();
        }
        false
    }

    pub fn skip_whitespace(&mut self) {
        self.advance_while(|c| c.is_ascii_whitespace());
    }

    /// Returns false if `delim` was not found before the end of the buffer.
    pub fn advance_to_next(&mut self, delim: u8) -> bool {
        self.advance_while(|c| c != delim)
    }

    pub fn advance_to_next_non_alphanumeric(&mut self) -> bool {
        self.advance_while(|c| c.is_ascii_alphanumeric())
    }

    pub fn advance_to_next_whitespace_or_comma(&mut self) -> bool {
        self.advance_while(|c| !(c.is_ascii_whitespace() || c == b','))
    }

    // Skip past the end of the current line.
    pub fn skip_line(&mut self) {
        if self.advance_to_next(b'\n') {
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_counts_lines() {
        let mut c = Cursor::new(" \t\n\n  x");
        c.skip_whitespace();
        assert_eq!(c.current(), Some(b'x'));
        assert_eq!(c.line(), 3);
    }

    #[test]
    fn test_advance_to_next() {
        let mut c = Cursor::new("[abc\n]");
        c.bump();
        assert!(c.advance_to_next(b']'));
        assert_eq!(c.offset(), 5);
        assert_eq!(c.line(), 2);

        let mut c = Cursor::new("\"open");
        c.bump();
        assert!(!c.advance_to_next(b'"'));
        assert_eq!(c.current(), None);
        assert_eq!(c.offset(), 5);
    }

    #[test]
    fn test_token_bounds() {
        let mut c = Cursor::new("width2 = 1.5e3,2");
        assert!(c.advance_to_next_non_alphanumeric());
        assert_eq!(c.slice(0, c.offset()), "width2");

        let mut c = Cursor::new("1.5e3,2");
        assert!(c.advance_to_next_whitespace_or_comma());
        assert_eq!(c.slice(0, c.offset()), "1.5e3");

        let mut c = Cursor::new("abc");
        assert!(!c.advance_to_next_non_alphanumeric());
        assert!(!c.advance_to_next_whitespace_or_comma());
    }

    #[test]
    fn test_skip_line() {
        let mut c = Cursor::new("; comment\nx");
        c.skip_line();
        assert_eq!(c.current(), Some(b'x'));
        assert_eq!(c.line(), 2);

        let mut c = Cursor::new("; no newline");
        c.skip_line();
        assert_eq!(c.current(), None);
        assert_eq!(c.line(), 1);

        // never moves past the end
        c.skip_line();
        c.skip_whitespace();
        c.bump();
        assert_eq!(c.current(), None);
    }
}
