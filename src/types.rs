use bon::Builder;
use serde::{Deserialize, Deserializer, Serialize};

/// An annotation attached to one line of the student's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct LineComment {
    /// One-based line number the comment refers to.
    pub line_number: u32,
    /// Text shown next to the line.
    pub content:     String,
}

/// A pass/fail decision with feedback, produced either locally or by the
/// remote model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct Judgment {
    /// Whether the submission satisfies the question.
    pub is_correct:    bool,
    /// Human-readable feedback message.
    pub feedback:      String,
    /// Per-line annotations, in display order.
    #[serde(default)]
    #[builder(default)]
    pub line_comments: Vec<LineComment>,
}

/// The final, merged judgment returned to callers.
pub type Verdict = Judgment;

/// The question a submission answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Lesson question title.
    #[serde(default)]
    pub title:       String,
    /// Full task text; all lesson steps joined by newlines.
    #[serde(default)]
    pub description: String,
}

impl Question {
    /// Creates a question from a title and a ready-made description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title:       title.into(),
            description: description.into(),
        }
    }

    /// Creates a question whose description is every step's text, one per
    /// line, the way the lesson view presents them.
    pub fn from_steps<I, S>(title: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let description = steps
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(title, description)
    }
}

/// Body accepted by the grading endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRequest {
    /// Student's submitted source; missing or null means nothing was written
    /// yet.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code:     String,
    /// Question being answered.
    #[serde(default)]
    pub question: Question,
}

impl GradeRequest {
    /// Bundles a submission with its question.
    pub fn new(code: impl Into<String>, question: Question) -> Self {
        Self {
            code: code.into(),
            question,
        }
    }
}

/// Reads an optional string, treating `null` as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
