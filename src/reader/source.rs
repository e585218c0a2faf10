/// A byte cursor over `[index, end)` of the source text
#[derive(Debug, Clone)]
pub struct Source<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> Source<'a> {
    pub fn new(bytes: &'a [u8]) -> Source<'a> {
        Source { bytes, index: 0 }
    }

    pub fn from_str(s: &'a str) -> Source<'a> {
        Source::new(s.as_bytes())
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.index).cloned()
    }

    pub fn advance(&mut self, n: usize) {
        self.index = (self.index + n).min(self.bytes.len());
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, is_whitespace) {
            self.index += 1;
        }
    }

    /// Consumes bytes while `predicate` holds and returns them
    pub fn take_while<P>(&mut self, predicate: P) -> &'a [u8]
    where
        P: Fn(u8) -> bool,
    {
        let start = self.index;
        while self.peek().map_or(false, &predicate) {
            self.index += 1;
        }
        &self.bytes[start..self.index]
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.bytes.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }
}

pub fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'
}

pub fn is_delimiter(c: u8) -> bool {
    is_whitespace(c) || c == b'(' || c == b')'
}
