//! Highlight colors
//!
//! Stored annotations carry a color *name*. Rendering resolves it through a
//! fixed table; unknown or missing names resolve to the default color.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    #[default]
    Yellow,
    Green,
    Blue,
    Pink,
    Purple,
    Orange,
}

/// Display values per color: (variant, stored name, css class, background)
static COLOR_TABLE: [(HighlightColor, &str, &str, &str); 6] = [
    (HighlightColor::Yellow, "yellow", "cw-highlight-yellow", "#fef08a"),
    (HighlightColor::Green, "green", "cw-highlight-green", "#bbf7d0"),
    (HighlightColor::Blue, "blue", "cw-highlight-blue", "#bfdbfe"),
    (HighlightColor::Pink, "pink", "cw-highlight-pink", "#fbcfe8"),
    (HighlightColor::Purple, "purple", "cw-highlight-purple", "#e9d5ff"),
    (HighlightColor::Orange, "orange", "cw-highlight-orange", "#fed7aa"),
];

impl HighlightColor {
    /// All supported colors, in display order
    pub const ALL: [HighlightColor; 6] = [
        HighlightColor::Yellow,
        HighlightColor::Green,
        HighlightColor::Blue,
        HighlightColor::Pink,
        HighlightColor::Purple,
        HighlightColor::Orange,
    ];

    /// Look up a color by its stored name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        COLOR_TABLE
            .iter()
            .find(|(_, n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|(color, _, _, _)| *color)
    }

    /// Resolve a stored name, falling back to the default color
    pub fn resolve(name: Option<&str>) -> Self {
        name.and_then(Self::from_name).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        self.entry().1
    }

    /// CSS class applied to highlighted segments of this color
    pub fn css_class(&self) -> &'static str {
        self.entry().2
    }

    /// Background color as a CSS hex value
    pub fn background(&self) -> &'static str {
        self.entry().3
    }

    fn entry(&self) -> &'static (HighlightColor, &'static str, &'static str, &'static str) {
        // Every variant has exactly one row.
        &COLOR_TABLE[*self as usize]
    }
}
