//! Line index for exact UTF-16 position calculations.
//!
//! The index precomputes start-of-line byte offsets and performs exact
//! translation between byte offsets and LSP UTF-16 positions. Translation is
//! fallible: out-of-range offsets, invalid UTF-8, and positions splitting a
//! surrogate pair are reported as errors instead of being guessed.

use crate::span::Point;
use memchr::memchr2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An LSP-facing position: 0-based line and UTF-16 code-unit character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Utf16Position {
    /// 0-based line number
    pub line: u32,
    /// 0-based UTF-16 code-unit offset within the line
    pub character: u32,
}

impl Utf16Position {
    /// Creates a new position.
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Errors produced by position translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Byte offset lies beyond the end of the source.
    #[error("offset {offset} out of range for source of {len} bytes")]
    OffsetOutOfRange {
        /// The offending offset
        offset: usize,
        /// Source length in bytes
        len: usize,
    },
    /// The source is not valid UTF-8 at the given byte offset.
    #[error("invalid UTF-8 at byte {at}")]
    InvalidUtf8 {
        /// Byte offset of the first invalid byte
        at: usize,
    },
    /// A UTF-16 character index falls between the two code units of a
    /// surrogate pair.
    #[error("position {line}:{character} splits a surrogate pair")]
    SplitSurrogate {
        /// 0-based line
        line: u32,
        /// 0-based UTF-16 character
        character: u32,
    },
}

/// Precomputed start-of-line byte offsets over one source buffer.
///
/// `\n`, `\r\n`, and lone `\r` all terminate a line. The index does not own
/// the source; translation methods take the same buffer the index was built
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the index from source bytes.
    pub fn new(source: &[u8]) -> Self {
        let mut line_starts = vec![0];
        let mut pos = 0;
        while let Some(i) = memchr2(b'\n', b'\r', &source[pos..]) {
            let at = pos + i;
            if source[at] == b'\r' && source.get(at + 1) == Some(&b'\n') {
                line_starts.push(at + 2);
                pos = at + 2;
            } else {
                line_starts.push(at + 1);
                pos = at + 1;
            }
        }
        Self { line_starts, len: source.len() }
    }

    /// Number of lines (always at least 1).
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Source length in bytes at index-construction time.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for an empty source.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start-of-line byte offset, or None for an out-of-range line.
    #[inline]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// The line containing `offset` (offsets inside a terminator belong to
    /// the line the terminator ends).
    pub fn line_at(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&s| s <= offset).saturating_sub(1)
    }

    /// End of the line's content, excluding its terminator.
    pub fn content_end(&self, line: usize, source: &[u8]) -> usize {
        match self.line_starts.get(line + 1) {
            Some(&next) => {
                let mut end = next;
                if end > 0 && source.get(end - 1) == Some(&b'\n') {
                    end -= 1;
                }
                if end > 0 && source.get(end - 1) == Some(&b'\r') {
                    end -= 1;
                }
                end
            }
            None => self.len,
        }
    }

    /// Translate a byte offset to a 0-based line / byte-column point.
    ///
    /// Offsets strictly inside a line terminator are canonicalized to the
    /// line's content end.
    pub fn offset_to_point(&self, source: &[u8], offset: usize) -> Result<Point, PositionError> {
        if offset > self.len {
            return Err(PositionError::OffsetOutOfRange { offset, len: self.len });
        }
        let line = self.line_at(offset);
        let start = self.line_starts[line];
        let offset = offset.min(self.content_end(line, source));
        Ok(Point::new(line as u32, (offset - start) as u32))
    }

    /// Translate a byte offset to a UTF-16 position.
    ///
    /// Offsets strictly inside a line terminator map to the line's content
    /// end. Errors on out-of-range offsets and invalid UTF-8.
    pub fn offset_to_utf16(
        &self,
        source: &[u8],
        offset: usize,
    ) -> Result<Utf16Position, PositionError> {
        if offset > self.len {
            return Err(PositionError::OffsetOutOfRange { offset, len: self.len });
        }
        let line = self.line_at(offset);
        let start = self.line_starts[line];
        let offset = offset.min(self.content_end(line, source));
        let text = str_slice(source, start, offset)?;
        let character: usize = text.chars().map(|c| c.len_utf16()).sum();
        Ok(Utf16Position::new(line as u32, character as u32))
    }

    /// Translate a UTF-16 position to a byte offset.
    ///
    /// Lines past the end of the source map to the source end; a character
    /// index past the line's content maps to the content end. A character
    /// index that falls between the two code units of a surrogate pair is an
    /// error.
    pub fn utf16_to_offset(
        &self,
        source: &[u8],
        pos: Utf16Position,
    ) -> Result<usize, PositionError> {
        let line = pos.line as usize;
        let Some(&start) = self.line_starts.get(line) else {
            return Ok(self.len);
        };
        let end = self.content_end(line, source);
        let text = str_slice(source, start, end)?;

        let target = pos.character as usize;
        let mut units = 0;
        for (byte_off, ch) in text.char_indices() {
            if units == target {
                return Ok(start + byte_off);
            }
            units += ch.len_utf16();
            if units > target {
                return Err(PositionError::SplitSurrogate {
                    line: pos.line,
                    character: pos.character,
                });
            }
        }
        Ok(end)
    }
}

fn str_slice(source: &[u8], start: usize, end: usize) -> Result<&str, PositionError> {
    std::str::from_utf8(&source[start..end])
        .map_err(|e| PositionError::InvalidUtf8 { at: start + e.valid_up_to() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_starts() {
        let idx = LineIndex::new(b"a\nbb\r\nccc\rd");
        assert_eq!(idx.line_count(), 4);
        assert_eq!(idx.line_start(0), Some(0));
        assert_eq!(idx.line_start(1), Some(2));
        assert_eq!(idx.line_start(2), Some(6));
        assert_eq!(idx.line_start(3), Some(10));
        assert_eq!(idx.line_start(4), None);
    }

    #[test]
    fn offset_to_utf16_basic() {
        let src = b"ab\ncd";
        let idx = LineIndex::new(src);
        assert_eq!(idx.offset_to_utf16(src, 0), Ok(Utf16Position::new(0, 0)));
        assert_eq!(idx.offset_to_utf16(src, 1), Ok(Utf16Position::new(0, 1)));
        assert_eq!(idx.offset_to_utf16(src, 3), Ok(Utf16Position::new(1, 0)));
        assert_eq!(idx.offset_to_utf16(src, 5), Ok(Utf16Position::new(1, 2)));
        assert!(matches!(
            idx.offset_to_utf16(src, 6),
            Err(PositionError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn offset_inside_crlf_clamps_to_content_end() {
        let src = b"ab\r\ncd";
        let idx = LineIndex::new(src);
        // Offset 3 is the `\n` of the `\r\n` terminator: canonicalize to the
        // end of line 0's content.
        assert_eq!(idx.offset_to_utf16(src, 3), Ok(Utf16Position::new(0, 2)));
        assert_eq!(idx.offset_to_utf16(src, 2), Ok(Utf16Position::new(0, 2)));
        assert_eq!(idx.offset_to_utf16(src, 4), Ok(Utf16Position::new(1, 0)));
    }

    #[test]
    fn utf16_counts_supplementary_as_two() {
        let src = "a𐍈b".as_bytes(); // U+10348 is two UTF-16 units
        let idx = LineIndex::new(src);
        assert_eq!(idx.offset_to_utf16(src, 1), Ok(Utf16Position::new(0, 1)));
        assert_eq!(idx.offset_to_utf16(src, 5), Ok(Utf16Position::new(0, 3)));
        assert_eq!(idx.utf16_to_offset(src, Utf16Position::new(0, 3)), Ok(5));
    }

    #[test]
    fn utf16_to_offset_rejects_surrogate_split() {
        let src = "𐍈".as_bytes();
        let idx = LineIndex::new(src);
        assert_eq!(
            idx.utf16_to_offset(src, Utf16Position::new(0, 1)),
            Err(PositionError::SplitSurrogate { line: 0, character: 1 })
        );
    }

    #[test]
    fn utf16_to_offset_clamps_past_line_end() {
        let src = b"ab\ncd";
        let idx = LineIndex::new(src);
        assert_eq!(idx.utf16_to_offset(src, Utf16Position::new(0, 99)), Ok(2));
        assert_eq!(idx.utf16_to_offset(src, Utf16Position::new(9, 0)), Ok(5));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let src = [b'a', 0xFF, b'b'];
        let idx = LineIndex::new(&src);
        assert_eq!(
            idx.offset_to_utf16(&src, 3),
            Err(PositionError::InvalidUtf8 { at: 1 })
        );
    }

    #[test]
    fn round_trip_outside_terminators() {
        let src = "ab\ncdé\nf𐍈g\n".as_bytes();
        let idx = LineIndex::new(src);
        let mut offset = 0;
        while offset <= src.len() {
            // Skip continuation bytes and terminator interiors.
            if src.get(offset).is_none_or(|b| b & 0xC0 != 0x80) {
                let pos = idx.offset_to_utf16(src, offset).unwrap();
                let line = idx.line_at(offset);
                if offset <= idx.content_end(line, src) {
                    assert_eq!(idx.utf16_to_offset(src, pos), Ok(offset));
                }
            }
            offset += 1;
        }
    }
}
