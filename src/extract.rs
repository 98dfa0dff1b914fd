#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Best-effort extraction of the value assigned in an `identifier = value`
//! statement.
//!
//! This is deliberately not a parser. It finds the first assignment-shaped
//! span in a piece of text and classifies its right-hand side; anything it
//! cannot find yields `None` so callers can abstain instead of guessing.

use std::{fmt, sync::LazyLock};

use regex::Regex;

/// Right-hand side runs until `;` or the end of the text.
static CODE_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*=\s*([^;]+)").expect("valid code assignment regex"));

/// Right-hand side also stops at the first comma or whitespace, so trailing
/// sentence text in a task description is not swallowed.
static PROSE_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s*=\s*([^;,\s]+)").expect("valid prose assignment regex"));

/// Integer or decimal literal with an optional sign.
static NUMBER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("valid number regex"));

/// Which terminators end the right-hand side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Submitted code: a single statement, ends at `;` or end of input.
    Code,
    /// Task prose: ends at `;`, `,` or any whitespace.
    Prose,
}

impl ExtractMode {
    /// Returns the pattern used for this mode.
    fn pattern(self) -> &'static Regex {
        match self {
            ExtractMode::Code => &CODE_ASSIGNMENT,
            ExtractMode::Prose => &PROSE_ASSIGNMENT,
        }
    }
}

/// Classification of an extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A quoted text literal.
    String,
    /// `True` or `False`.
    Boolean,
    /// An integer or decimal literal.
    Number,
    /// Anything else.
    Unrecognized,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// The value itself, in its native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Text with its surrounding quote characters removed.
    Str(String),
    /// Boolean keyword.
    Bool(bool),
    /// Parsed number.
    Number(f64),
    /// Trimmed text that matched no other kind.
    Unrecognized(String),
}

impl Literal {
    /// Returns the kind of this literal.
    pub fn kind(&self) -> ValueKind {
        match self {
            Literal::Str(_) => ValueKind::String,
            Literal::Bool(_) => ValueKind::Boolean,
            Literal::Number(_) => ValueKind::Number,
            Literal::Unrecognized(_) => ValueKind::Unrecognized,
        }
    }
}

/// A classified right-hand side together with how it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue {
    /// Classified value.
    pub literal: Literal,
    /// Trimmed right-hand side exactly as written.
    pub raw:     String,
}

impl ExtractedValue {
    /// Returns the kind of the extracted value.
    pub fn kind(&self) -> ValueKind {
        self.literal.kind()
    }

    /// True when both kind and value are equal. Numbers compare exactly.
    pub fn same_value(&self, other: &ExtractedValue) -> bool {
        self.literal == other.literal
    }
}

/// Finds the first assignment in `text` and classifies its right-hand side.
///
/// Returns `None` when nothing assignment-shaped is found.
pub fn extract(text: &str, mode: ExtractMode) -> Option<ExtractedValue> {
    let haystack = match mode {
        ExtractMode::Code => text.trim(),
        ExtractMode::Prose => text,
    };

    let captures = mode.pattern().captures(haystack)?;
    let raw = captures.get(2)?.as_str().trim();

    Some(ExtractedValue {
        literal: classify(raw),
        raw:     raw.to_owned(),
    })
}

/// Extracts the assigned value from submitted code.
pub fn extract_from_code(code: &str) -> Option<ExtractedValue> {
    extract(code, ExtractMode::Code)
}

/// Extracts the expected value from a task description.
pub fn extract_from_task(description: &str) -> Option<ExtractedValue> {
    extract(description, ExtractMode::Prose)
}

/// Classifies a trimmed right-hand side. First matching rule wins.
pub fn classify(raw: &str) -> Literal {
    if raw.starts_with('"') || raw.starts_with('\'') {
        return Literal::Str(strip_ends(raw).to_owned());
    }

    match raw {
        "True" => return Literal::Bool(true),
        "False" => return Literal::Bool(false),
        _ => {}
    }

    if NUMBER_LITERAL.is_match(raw)
        && let Ok(number) = raw.parse::<f64>()
    {
        return Literal::Number(number);
    }

    Literal::Unrecognized(raw.to_owned())
}

/// Drops the first and last character, whatever they are.
fn strip_ends(raw: &str) -> &str {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}
