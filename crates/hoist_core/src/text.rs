//! Source positions.
//!
//! The scanner walks a script as a sequence of `char`s, so every position
//! stored in the AST is a character offset. `LineMap` converts those offsets
//! to line/column pairs for messages and to byte offsets for report
//! rendering.

use std::fmt;
use std::ops::Range;

/// A character offset into a script.
pub type TextPos = u32;

/// A span defined by a start offset and a length.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.start && pos < self.end()
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// A range with inclusive start and exclusive end, as stored on AST nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TextRange {
    pub pos: TextPos,
    pub end: TextPos,
}

impl TextRange {
    #[inline]
    pub fn new(pos: TextPos, end: TextPos) -> Self {
        Self { pos, end }
    }

    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { pos, end: pos }
    }

    #[inline]
    pub fn len(&self) -> TextPos {
        self.end.saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    #[inline]
    pub fn to_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.pos, self.end)
    }

    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.pos as usize..self.end as usize
    }

    /// The smallest range covering both.
    pub fn cover(&self, other: TextRange) -> TextRange {
        TextRange::new(self.pos.min(other.pos), self.end.max(other.end))
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.pos, self.end)
    }
}

impl From<TextRange> for TextSpan {
    fn from(range: TextRange) -> Self {
        range.to_span()
    }
}

impl From<TextSpan> for TextRange {
    fn from(span: TextSpan) -> Self {
        TextRange::new(span.start, span.end())
    }
}

/// A 0-based line and column. Columns count characters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    pub line: u32,
    pub character: u32,
}

impl LineAndColumn {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for LineAndColumn {
    /// Renders 1-based, the way editors show positions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Maps character offsets to lines and to UTF-8 byte offsets.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Character offset of the first character of each line.
    line_starts: Vec<TextPos>,
    /// Byte offset of each character, plus one trailing entry for the end.
    byte_offsets: Vec<u32>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        let mut byte_offsets = Vec::with_capacity(text.len() + 1);
        for (index, (byte, ch)) in text.char_indices().enumerate() {
            byte_offsets.push(byte as u32);
            if ch == '\n' {
                line_starts.push(index as u32 + 1);
            }
        }
        byte_offsets.push(text.len() as u32);
        Self {
            line_starts,
            byte_offsets,
        }
    }

    /// 0-based line containing `pos`.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => line.saturating_sub(1) as u32,
        }
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts[line as usize];
        LineAndColumn::new(line, pos - line_start)
    }

    /// UTF-8 byte offset of a character offset, clamped to the text's end.
    pub fn byte_offset(&self, pos: TextPos) -> usize {
        let last = self.byte_offsets.len() - 1;
        self.byte_offsets[(pos as usize).min(last)] as usize
    }

    /// Byte range covered by a character range.
    pub fn byte_range(&self, range: TextRange) -> Range<usize> {
        self.byte_offset(range.pos)..self.byte_offset(range.end)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_span() {
        let span = TextSpan::new(5, 10);
        assert_eq!(span.end(), 15);
        assert!(span.contains(5));
        assert!(span.contains(14));
        assert!(!span.contains(15));
        assert_eq!(TextSpan::from_bounds(5, 15), span);
    }

    #[test]
    fn test_text_range_cover() {
        let a = TextRange::new(4, 9);
        let b = TextRange::new(2, 6);
        assert_eq!(a.cover(b), TextRange::new(2, 9));
        assert_eq!(a.len(), 5);
        assert!(TextRange::empty(3).is_empty());
    }

    #[test]
    fn test_line_map() {
        let map = LineMap::new("let a;\nlet b;\nb");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_of(0), 0);
        assert_eq!(map.line_of(6), 0);
        assert_eq!(map.line_of(7), 1);
        assert_eq!(map.line_of(14), 2);

        let lc = map.line_and_column_of(11);
        assert_eq!(lc, LineAndColumn::new(1, 4));
        assert_eq!(lc.to_string(), "2:5");
    }

    #[test]
    fn test_byte_offsets_with_multibyte_chars() {
        // '✅' is three bytes but one scanner position.
        let map = LineMap::new("'✅' + x");
        assert_eq!(map.byte_offset(0), 0);
        assert_eq!(map.byte_offset(1), 1);
        assert_eq!(map.byte_offset(2), 4);
        assert_eq!(map.byte_range(TextRange::new(6, 7)), 8..9);
        assert_eq!(map.byte_offset(100), "'✅' + x".len());
    }
}
