//! HTML rendering of highlight segments
//!
//! Each highlighted segment becomes a `<mark>` element that carries the
//! annotation id, so a client can use it as a click target. Plain segments
//! are escaped text.

use super::segments::Segment;

/// Options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Class present on every highlight, in addition to the color class
    pub base_class: String,
    /// Data attribute holding the annotation ID
    pub id_attribute: String,
    /// Whether to include an inline background style
    pub include_inline_styles: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            base_class: "cw-highlight".to_string(),
            id_attribute: "data-annotation-id".to_string(),
            include_inline_styles: true,
        }
    }
}

/// Render segments to an HTML fragment
pub fn render_html(segments: &[Segment<'_>], options: &HtmlOptions) -> String {
    let mut html = String::new();

    for segment in segments {
        let text = html_escape::encode_text(segment.text);

        match (segment.highlighted, segment.annotation, segment.color) {
            (true, Some(annotation), Some(color)) => {
                let style = if options.include_inline_styles {
                    format!(" style=\"background-color: {};\"", color.background())
                } else {
                    String::new()
                };

                html.push_str(&format!(
                    "<mark class=\"{} {}\" {}=\"{}\"{}>{}</mark>",
                    options.base_class,
                    color.css_class(),
                    options.id_attribute,
                    html_escape::encode_double_quoted_attribute(&annotation.id),
                    style,
                    text
                ));
            }
            _ => html.push_str(&text),
        }
    }

    html
}
