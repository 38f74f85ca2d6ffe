//! Offset mapping: annotation ranges to display segments

use serde::Serialize;

use super::color::HighlightColor;
use super::text::CharIndex;
use crate::models::Annotation;

/// A contiguous slice of a document, either plain or highlighted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment<'a> {
    pub text: &'a str,
    /// Character offset of the first char of `text` in the document
    pub start: usize,
    /// Character offset one past the last char of `text`
    pub end: usize,
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<&'a Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HighlightColor>,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str, start: usize, end: usize) -> Self {
        Self {
            text,
            start,
            end,
            highlighted: false,
            annotation: None,
            color: None,
        }
    }

    fn highlight(text: &'a str, start: usize, end: usize, annotation: &'a Annotation) -> Self {
        Self {
            text,
            start,
            end,
            highlighted: true,
            annotation: Some(annotation),
            color: Some(HighlightColor::resolve(Some(&annotation.color))),
        }
    }
}

/// Split `content` into plain and highlighted segments.
///
/// Annotations are visited by ascending `position_start`, ties broken by
/// ascending `position_end` and then input order. Offsets are clamped into the
/// document. Where annotations overlap, the later one only highlights the part
/// not already covered, so the concatenated segment text is always `content`.
pub fn render<'a>(content: &'a str, annotations: &'a [Annotation]) -> Vec<Segment<'a>> {
    let index = CharIndex::new(content);
    let len = index.len();

    if annotations.is_empty() {
        return vec![Segment::plain(content, 0, len)];
    }

    let mut ranges: Vec<(usize, usize, &Annotation)> = annotations
        .iter()
        .map(|a| {
            let (start, end) = clamp_range(a, len);
            (start, end, a)
        })
        .collect();
    // sort_by_key is stable, so equal ranges keep their input order
    ranges.sort_by_key(|&(start, end, _)| (start, end));

    let mut segments = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;

    for (start, end, annotation) in ranges {
        if start == end {
            continue;
        }
        if start > cursor {
            segments.push(Segment::plain(index.slice(cursor, start), cursor, start));
        }

        let from = start.max(cursor);
        if end > from {
            segments.push(Segment::highlight(index.slice(from, end), from, end, annotation));
        } else if start < cursor {
            tracing::debug!(
                annotation_id = %annotation.id,
                "Annotation fully covered by an earlier highlight"
            );
        }

        cursor = cursor.max(end);
    }

    if cursor < len {
        segments.push(Segment::plain(index.slice(cursor, len), cursor, len));
    }

    segments
}

/// Clamp stored offsets to `0 <= start <= end <= len`
fn clamp_range(annotation: &Annotation, len: usize) -> (usize, usize) {
    let max = len as i64;
    let start = annotation.position_start.clamp(0, max);
    let end = annotation.position_end.clamp(start, max);

    if start != annotation.position_start || end != annotation.position_end {
        tracing::debug!(
            annotation_id = %annotation.id,
            position_start = annotation.position_start,
            position_end = annotation.position_end,
            len,
            "Clamped out-of-range annotation"
        );
    }

    (start as usize, end as usize)
}
