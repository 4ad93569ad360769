use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// Half-open byte range `[start, end)` within a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Byte offsets of every line of a file, split on `\n`.
///
/// Offsets count the separator, so line `n + 1` starts one byte after line `n` ends.
/// A trailing newline yields a final empty line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineIndex {
    ranges: Vec<CharRange>,
}

impl LineIndex {
    pub fn build(content: &str) -> Self {
        let mut ranges = Vec::new();
        let mut offset = 0;
        for line in content.split('\n') {
            ranges.push(CharRange::new(offset, offset + line.len()));
            offset += line.len() + 1;
        }
        Self { ranges }
    }

    pub fn line_count(&self) -> usize {
        self.ranges.len()
    }

    /// Range of the 1-based `line`, excluding its separator.
    pub fn char_range_for_line(&self, line: usize) -> Result<CharRange, ScopeError> {
        line.checked_sub(1)
            .and_then(|idx| self.ranges.get(idx))
            .copied()
            .ok_or(ScopeError::InvalidLineNumber {
                line,
                lines: self.ranges.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "package simple\n\nvar _ = Describe(\"simple\", func() {\n\tIt(\"works\", func() {})\n})\n";

    #[test]
    fn ranges_are_contiguous_and_cover_content() {
        let index = LineIndex::build(SAMPLE);
        let lines = index.line_count();
        assert_eq!(lines, 6);

        let mut covered = 0;
        for line in 1..=lines {
            let range = index.char_range_for_line(line).unwrap();
            covered += range.end - range.start;
            if line < lines {
                let next = index.char_range_for_line(line + 1).unwrap();
                assert_eq!(range.end + 1, next.start, "line {line}");
            }
        }
        assert_eq!(covered + (lines - 1), SAMPLE.len());
    }

    #[test]
    fn resolves_offsets_for_line() {
        let index = LineIndex::build(SAMPLE);
        assert_eq!(index.char_range_for_line(1).unwrap(), CharRange::new(0, 14));
        assert_eq!(index.char_range_for_line(2).unwrap(), CharRange::new(15, 15));
        assert_eq!(index.char_range_for_line(4).unwrap(), CharRange::new(52, 75));
        assert_eq!(&SAMPLE[52..75], "\tIt(\"works\", func() {})");
    }

    #[test]
    fn counts_bytes_of_multibyte_text() {
        let index = LineIndex::build("It(\"prüft\")\nx");
        assert_eq!(index.char_range_for_line(1).unwrap(), CharRange::new(0, 12));
        assert_eq!(index.char_range_for_line(2).unwrap(), CharRange::new(13, 14));
    }

    #[test]
    fn rejects_lines_outside_file() {
        let index = LineIndex::build("a\nb");
        for line in [0, 3] {
            let err = index.char_range_for_line(line).unwrap_err();
            assert!(
                matches!(err, ScopeError::InvalidLineNumber { line: l, lines: 2 } if l == line),
                "{err}"
            );
        }
    }

    #[test]
    fn empty_content_has_one_empty_line() {
        let index = LineIndex::build("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.char_range_for_line(1).unwrap(), CharRange::new(0, 0));
    }
}
