//! Highlight rendering core
//!
//! Two halves that share one coordinate space, the character offsets of a
//! document's raw text:
//!
//! - [`render`] maps stored annotation ranges onto the text and produces an
//!   ordered, non-overlapping list of [`Segment`]s.
//! - [`translate`] takes a selection made inside a rendered [`DocumentView`]
//!   and turns it back into a `[start, end)` range of the document text.
//!
//! Offsets count Unicode scalar values (`char`s), never bytes.

mod color;
mod html;
mod segments;
mod selection;
mod text;

pub use color::HighlightColor;
pub use html::{render_html, HtmlOptions};
pub use segments::{render, Segment};
pub use selection::{translate, DocumentView, SelectionPoint, SelectionRange, UserSelection};
pub use text::{char_len, CharIndex};
