#[derive(Debug, Clone, Copy)]
pub struct SourceChar {
    pub value: char,
    pub offset: u32,
    pub line: u32,
}

impl SourceChar {
    pub fn next_offset(&self) -> u32 {
        self.offset + self.value.len_utf8() as u32
    }
}

/// Where the lexer currently stands. Used to place tokens and errors that run into the end of input.
#[derive(Debug, Clone, Copy)]
pub struct SourcePosition {
    pub offset: u32,
    pub line: u32,
}
