//! Non-overlapping edit application over byte buffers.

use crate::span::ByteSpan;
use thiserror::Error;

/// A single replacement: the bytes at `span` are replaced by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Half-open byte range to replace
    pub span: ByteSpan,
    /// Replacement bytes
    pub text: Vec<u8>,
}

impl Edit {
    /// Creates a replacement edit.
    pub fn replace(span: ByteSpan, text: impl Into<Vec<u8>>) -> Self {
        Self { span, text: text.into() }
    }

    /// Creates an insertion at `pos`.
    pub fn insert(pos: usize, text: impl Into<Vec<u8>>) -> Self {
        Self { span: ByteSpan::empty(pos), text: text.into() }
    }

    /// Creates a deletion of `span`.
    pub fn delete(span: ByteSpan) -> Self {
        Self { span, text: Vec::new() }
    }
}

/// Validation failure for an edit set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// An edit span has `end < start`.
    #[error("edit span {span} is not ordered")]
    Unordered {
        /// The offending span
        span: ByteSpan,
    },
    /// An edit span extends past the end of the source.
    #[error("edit span {span} out of bounds for source of {len} bytes")]
    OutOfBounds {
        /// The offending span
        span: ByteSpan,
        /// Source length in bytes
        len: usize,
    },
    /// Two edit spans strictly overlap.
    #[error("edit spans {first} and {second} overlap")]
    Overlap {
        /// Earlier span after sorting
        first: ByteSpan,
        /// Later span after sorting
        second: ByteSpan,
    },
}

/// Applies a set of non-overlapping edits to `source`, returning the new
/// buffer.
///
/// Edits may be supplied in any order; they are sorted internally, so the
/// result is independent of input order. Touching spans are allowed,
/// strictly overlapping spans are rejected. An empty edit list returns a
/// copy of the source.
pub fn apply_edits(source: &[u8], edits: &[Edit]) -> Result<Vec<u8>, EditError> {
    for edit in edits {
        if !edit.span.is_ordered() {
            return Err(EditError::Unordered { span: edit.span });
        }
        if edit.span.end > source.len() {
            return Err(EditError::OutOfBounds { span: edit.span, len: source.len() });
        }
    }

    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| {
        (a.span.start, a.span.end, &a.text).cmp(&(b.span.start, b.span.end, &b.text))
    });

    for pair in sorted.windows(2) {
        if pair[1].span.start < pair[0].span.end {
            return Err(EditError::Overlap { first: pair[0].span, second: pair[1].span });
        }
    }

    let grown: usize = sorted.iter().map(|e| e.text.len()).sum();
    let mut out = Vec::with_capacity(source.len() + grown);
    let mut cursor = 0;
    for edit in sorted {
        out.extend_from_slice(&source[cursor..edit.span.start]);
        out.extend_from_slice(&edit.text);
        cursor = edit.span.end;
    }
    out.extend_from_slice(&source[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn empty_edit_list_copies() {
        assert_eq!(apply_edits(b"abc", &[]), Ok(b"abc".to_vec()));
    }

    #[test]
    fn replace_insert_delete() {
        let src = b"hello world";
        let edits = vec![
            Edit::replace(ByteSpan::new(0, 5), "goodbye"),
            Edit::delete(ByteSpan::new(5, 6)),
            Edit::insert(11, "!"),
        ];
        assert_eq!(apply_edits(src, &edits), Ok(b"goodbyeworld!".to_vec()));
    }

    #[test]
    fn touching_spans_allowed() {
        let src = b"abcdef";
        let edits = vec![
            Edit::replace(ByteSpan::new(0, 3), "X"),
            Edit::replace(ByteSpan::new(3, 6), "Y"),
        ];
        assert_eq!(apply_edits(src, &edits), Ok(b"XY".to_vec()));
    }

    #[test]
    fn overlap_rejected() {
        let src = b"abcdef";
        let edits = vec![
            Edit::replace(ByteSpan::new(0, 4), "X"),
            Edit::replace(ByteSpan::new(3, 6), "Y"),
        ];
        assert!(matches!(apply_edits(src, &edits), Err(EditError::Overlap { .. })));
    }

    #[test]
    fn out_of_bounds_rejected() {
        assert!(matches!(
            apply_edits(b"ab", &[Edit::delete(ByteSpan::new(1, 5))]),
            Err(EditError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn unordered_rejected() {
        let edit = Edit { span: ByteSpan { start: 4, end: 2 }, text: Vec::new() };
        assert!(matches!(apply_edits(b"abcdef", &[edit]), Err(EditError::Unordered { .. })));
    }

    proptest! {
        #[test]
        fn order_independent(src in proptest::collection::vec(any::<u8>(), 0..64)) {
            let len = src.len();
            if len < 4 { return Ok(()); }
            let a = Edit::replace(ByteSpan::new(0, len / 4), "A");
            let b = Edit::replace(ByteSpan::new(len / 2, len), "B");
            let fwd = apply_edits(&src, &[a.clone(), b.clone()]);
            let rev = apply_edits(&src, &[b, a]);
            prop_assert_eq!(fwd, rev);
        }
    }
}
