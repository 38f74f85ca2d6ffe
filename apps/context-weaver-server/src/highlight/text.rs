//! Character offset helpers
//!
//! Annotation offsets are character positions; Rust strings are indexed by
//! byte. `CharIndex` converts once per document so slicing stays O(1).

/// Number of characters in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte positions of every character boundary of a string
#[derive(Debug, Clone)]
pub struct CharIndex<'a> {
    text: &'a str,
    /// Byte offset of each char, plus `text.len()` as the final boundary.
    /// Empty for ASCII text, where char and byte offsets coincide.
    boundaries: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let boundaries = if text.is_ascii() {
            Vec::new()
        } else {
            text.char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(text.len()))
                .collect()
        };

        Self { text, boundaries }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        if self.boundaries.is_empty() {
            self.text.len()
        } else {
            self.boundaries.len() - 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of character `index`, clamped to the end of the text
    pub fn byte_offset(&self, index: usize) -> usize {
        let index = index.min(self.len());
        if self.boundaries.is_empty() {
            index
        } else {
            self.boundaries[index]
        }
    }

    /// Slice by character range. Out-of-range or inverted bounds clamp.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let start = self.byte_offset(start);
        let end = self.byte_offset(end).max(start);
        &self.text[start..end]
    }
}
