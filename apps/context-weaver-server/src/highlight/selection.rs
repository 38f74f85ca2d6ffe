//! Selection translation: a selection in a rendered view back to document offsets
//!
//! A rendered document is split into several text runs (one per segment), so a
//! selection is reported as two points, each a run index plus a character
//! offset inside that run. Both are mapped onto the single logical text stream
//! of the document.

use serde::{Deserialize, Serialize};

use super::segments::Segment;
use super::text::{char_len, CharIndex};

/// The rendered text of one document, as an ordered list of text runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentView {
    pub document_id: String,
    pub nodes: Vec<String>,
}

/// A position inside a rendered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPoint {
    /// Index of the text run
    pub node: usize,
    /// Character offset within the run
    pub offset: usize,
}

/// A selection as reported by the view that produced the interaction event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSelection {
    /// Document whose container produced the event
    pub document_id: String,
    /// Where the selection started (may come after `focus` for backward drags)
    pub anchor: SelectionPoint,
    pub focus: SelectionPoint,
}

/// A selected range in document coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl DocumentView {
    pub fn new(document_id: impl Into<String>, nodes: Vec<String>) -> Self {
        Self {
            document_id: document_id.into(),
            nodes,
        }
    }

    /// Build the view a client would show for a rendering
    pub fn from_segments(document_id: impl Into<String>, segments: &[Segment<'_>]) -> Self {
        Self::new(
            document_id,
            segments.iter().map(|s| s.text.to_string()).collect(),
        )
    }

    /// Full text of the view
    pub fn text(&self) -> String {
        self.nodes.concat()
    }

    /// Absolute character offset of a point, clamped into the view.
    ///
    /// A node index past the last run maps to the end of the text.
    fn char_position(&self, point: SelectionPoint) -> usize {
        let preceding: usize = self.nodes.iter().take(point.node).map(|n| char_len(n)).sum();

        match self.nodes.get(point.node) {
            Some(node) => preceding + point.offset.min(char_len(node)),
            None => preceding,
        }
    }
}

/// Translate a selection into a `[start, end)` range of the document.
///
/// Returns `None` when the selection belongs to another document's view or
/// when nothing but whitespace is selected.
pub fn translate(view: &DocumentView, selection: &UserSelection) -> Option<SelectionRange> {
    if selection.document_id != view.document_id {
        tracing::debug!(
            view = %view.document_id,
            selection = %selection.document_id,
            "Ignoring selection from another document"
        );
        return None;
    }

    let anchor = view.char_position(selection.anchor);
    let focus = view.char_position(selection.focus);
    let (from, to) = if anchor <= focus {
        (anchor, focus)
    } else {
        (focus, anchor)
    };

    let full_text = view.text();
    let text = CharIndex::new(&full_text).slice(from, to);
    if text.trim().is_empty() {
        return None;
    }

    let start = from;
    let end = start + char_len(text);

    Some(SelectionRange {
        text: text.to_string(),
        start,
        end,
    })
}
