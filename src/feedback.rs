#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::constants::{DEFAULT_LEADING_MARKER, DEFAULT_TRAILING_MARKER};

/// Variation selector that often trails an emoji and renders as nothing.
const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Code-point ranges treated as decorative glyphs.
const PICTOGRAPHIC_RANGES: &[(u32, u32)] = &[
    (0x00A9, 0x00A9),   // ©
    (0x00AE, 0x00AE),   // ®
    (0x203C, 0x203C),   // ‼
    (0x2049, 0x2049),   // ⁉
    (0x2122, 0x2122),   // ™
    (0x2300, 0x23FF),   // misc technical, includes ⌛ ⏰ ⏳
    (0x2600, 0x27BF),   // misc symbols, dingbats
    (0x2B00, 0x2BFF),   // arrows and stars, includes ⭐
    (0x1F1E6, 0x1F1FF), // regional indicators
    (0x1F300, 0x1F5FF), // symbols and pictographs
    (0x1F600, 0x1F64F), // emoticons
    (0x1F680, 0x1F6FF), // transport and map
    (0x1F7E0, 0x1F7FF), // coloured shapes
    (0x1F900, 0x1F9FF), // supplemental symbols
    (0x1FA70, 0x1FAFF), // extended-A
];

/// Decorative markers that must open and close every feedback message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMarkers {
    /// Marker prepended when the text does not start with one.
    leading:  String,
    /// Marker appended when the text does not end with one.
    trailing: String,
}

impl Default for FeedbackMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_LEADING_MARKER, DEFAULT_TRAILING_MARKER)
    }
}

impl FeedbackMarkers {
    /// Creates a marker pair. Blank markers fall back to the defaults.
    pub fn new(leading: impl Into<String>, trailing: impl Into<String>) -> Self {
        let leading = leading.into();
        let trailing = trailing.into();
        Self {
            leading:  if leading.trim().is_empty() {
                DEFAULT_LEADING_MARKER.to_owned()
            } else {
                leading.trim().to_owned()
            },
            trailing: if trailing.trim().is_empty() {
                DEFAULT_TRAILING_MARKER.to_owned()
            } else {
                trailing.trim().to_owned()
            },
        }
    }

    /// Makes sure `text` starts and ends with a marker, adding the configured
    /// ones where missing. Applying it twice changes nothing.
    pub fn apply(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return format!("{} {}", self.leading, self.trailing);
        }

        let mut out = if self.starts_marked(text) {
            text.to_owned()
        } else {
            format!("{} {}", self.leading, text)
        };

        if !self.ends_marked(&out) {
            out = format!("{} {}", out, self.trailing);
        }
        out
    }

    /// True if the first character is a marker.
    fn starts_marked(&self, text: &str) -> bool {
        text.starts_with(self.leading.as_str())
            || text.starts_with(self.trailing.as_str())
            || text.chars().next().is_some_and(is_decorative)
    }

    /// True if the last visible character is a marker.
    fn ends_marked(&self, text: &str) -> bool {
        let text = text.trim_end_matches(VARIATION_SELECTOR);
        text.ends_with(self.trailing.as_str())
            || text.ends_with(self.leading.as_str())
            || text.chars().next_back().is_some_and(is_decorative)
    }
}

/// Whether `c` falls in one of the pictographic ranges.
pub fn is_decorative(c: char) -> bool {
    let c = c as u32;
    PICTOGRAPHIC_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_common_glyphs() {
        for c in ['🌟', '⭐', '✨', '🎉', '🤔', '❗', '🚀', '✅'] {
            assert!(is_decorative(c), "{c}");
        }
        for c in ['a', 'ş', '!', '.', '1'] {
            assert!(!is_decorative(c), "{c}");
        }
    }

    #[test]
    fn custom_markers_count_as_marked() {
        let markers = FeedbackMarkers::new(">>", "<<");
        assert_eq!(markers.apply(">> done <<"), ">> done <<");
        assert_eq!(markers.apply("done"), ">> done <<");
    }
}
