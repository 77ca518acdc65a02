use std::ops::Range;

/// A byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: u32,
    /// The length of the token in bytes.
    pub length: u32,
}

impl Span {
    pub const fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    pub const fn between(start: u32, end: u32) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    pub const fn end(&self) -> u32 {
        self.start + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }
}
