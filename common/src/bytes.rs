//! Byte utilities for key encoding and range queries.

use std::ops::Bound::{Excluded, Included, Unbounded};
use std::ops::{Bound, RangeBounds};

use bytes::{Bytes, BytesMut};

/// Computes the lexicographic successor of a byte sequence.
///
/// Returns the smallest byte sequence that is strictly greater than every
/// sequence starting with `data`, or `None` when `data` is empty or made only
/// of `0xFF` bytes.
///
/// - `[0x61]` ("a") → `Some([0x62])` ("b")
/// - `[0x61, 0xFF]` → `Some([0x62])`
/// - `[0xFF]` → `None`
pub(crate) fn lex_increment(data: &[u8]) -> Option<Bytes> {
    let mut result = BytesMut::from(data);

    while let Some(last) = result.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return Some(result.freeze());
        }
        result.truncate(result.len() - 1);
    }

    None
}

/// A range over byte sequences, used for key range queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BytesRange {
    pub start: Bound<Bytes>,
    pub end: Bound<Bytes>,
}

impl BytesRange {
    pub fn new(start: Bound<Bytes>, end: Bound<Bytes>) -> Self {
        Self { start, end }
    }

    /// Creates a range that scans everything.
    pub fn unbounded() -> Self {
        Self::new(Unbounded, Unbounded)
    }

    /// Creates a range that includes all keys with the given prefix.
    pub fn prefix(prefix: Bytes) -> Self {
        if prefix.is_empty() {
            return Self::unbounded();
        }
        match lex_increment(&prefix) {
            Some(end) => Self::new(Included(prefix), Excluded(end)),
            None => Self::new(Included(prefix), Unbounded),
        }
    }

    /// Returns true if `k` falls within the range.
    pub fn contains(&self, k: &[u8]) -> bool {
        let after_start = match &self.start {
            Included(s) => k >= s.as_ref(),
            Excluded(s) => k > s.as_ref(),
            Unbounded => true,
        };
        let before_end = match &self.end {
            Included(e) => k <= e.as_ref(),
            Excluded(e) => k < e.as_ref(),
            Unbounded => true,
        };
        after_start && before_end
    }

    /// Returns true if no key can fall within the range.
    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Included(s), Included(e)) => s > e,
            (Included(s), Excluded(e)) | (Excluded(s), Included(e)) | (Excluded(s), Excluded(e)) => {
                s >= e
            }
            _ => false,
        }
    }
}

impl RangeBounds<Bytes> for BytesRange {
    fn start_bound(&self) -> Bound<&Bytes> {
        self.start.as_ref()
    }

    fn end_bound(&self) -> Bound<&Bytes> {
        self.end.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn should_prefix_range_contain_all_prefixed_keys(prefix: Vec<u8>, suffix: Vec<u8>) {
            prop_assume!(!prefix.is_empty());

            let range = BytesRange::prefix(Bytes::from(prefix.clone()));

            let mut extended = prefix.clone();
            extended.extend(&suffix);
            prop_assert!(range.contains(&prefix));
            prop_assert!(range.contains(&extended));
        }

        #[test]
        fn should_increment_produce_strictly_greater_result(data: Vec<u8>) {
            prop_assume!(data.iter().any(|&b| b < 0xFF));

            let incremented = lex_increment(&data).unwrap();

            prop_assert!(incremented.as_ref() > data.as_slice());
        }
    }

    #[test]
    fn should_increment_with_trailing_ff() {
        assert_eq!(lex_increment(b"a").unwrap().as_ref(), b"b");
        assert_eq!(lex_increment(&[0x61, 0xFF]).unwrap().as_ref(), &[0x62]);
        assert!(lex_increment(&[]).is_none());
        assert!(lex_increment(&[0xFF, 0xFF]).is_none());
    }

    #[test]
    fn should_bound_record_tag_prefix_to_next_tag() {
        // when
        let range = BytesRange::prefix(Bytes::from_static(&[0x01, 0x10]));

        // then
        assert_eq!(range.start, Included(Bytes::from_static(&[0x01, 0x10])));
        assert_eq!(range.end, Excluded(Bytes::from_static(&[0x01, 0x11])));
        assert!(range.contains(b"\x01\x10001"));
        assert!(!range.contains(b"\x01\x11"));
    }

    #[test]
    fn should_detect_empty_ranges() {
        let a = Bytes::from("a");
        let b = Bytes::from("b");

        assert!(BytesRange::new(Included(b.clone()), Excluded(a.clone())).is_empty());
        assert!(BytesRange::new(Included(a.clone()), Excluded(a.clone())).is_empty());
        assert!(!BytesRange::new(Included(a.clone()), Included(a.clone())).is_empty());
        assert!(!BytesRange::new(Included(a), Excluded(b)).is_empty());
        assert!(!BytesRange::unbounded().is_empty());
    }
}
