#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::{
    extract::{ExtractedValue, extract_from_code, extract_from_task},
    types::{Judgment, LineComment},
};

/// Outcome of checking the submitted value against the one the task asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// One side had no recognizable assignment; no opinion either way.
    Abstain,
    /// Both sides assign the same kind and value.
    Match {
        /// Value found in the task description.
        expected:  ExtractedValue,
        /// Value found in the submission.
        submitted: ExtractedValue,
    },
    /// Kinds or values differ.
    Mismatch {
        /// Value found in the task description.
        expected:  ExtractedValue,
        /// Value found in the submission.
        submitted: ExtractedValue,
    },
}

impl Comparison {
    /// True only for [`Comparison::Mismatch`].
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Comparison::Mismatch { .. })
    }

    /// True only for [`Comparison::Match`].
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match { .. })
    }

    /// The rejecting judgment for a mismatch, naming both raw values.
    pub fn rejection(&self) -> Option<Judgment> {
        let Comparison::Mismatch {
            expected,
            submitted,
        } = self
        else {
            return None;
        };

        Some(
            Judgment::builder()
                .is_correct(false)
                .feedback(format!(
                    "🤔 Değer kontrolü başarısız! Görevde {} isteniyor, sen {} yazmışsın. ✨",
                    expected.raw, submitted.raw
                ))
                .line_comments(vec![
                    LineComment::builder()
                        .line_number(1)
                        .content(format!("❗ Beklenen değer: {}", expected.raw))
                        .build(),
                ])
                .build(),
        )
    }
}

/// Compares the value assigned in `code` with the one named in
/// `task_description`.
pub fn compare(task_description: &str, code: &str) -> Comparison {
    let (Some(expected), Some(submitted)) =
        (extract_from_task(task_description), extract_from_code(code))
    else {
        return Comparison::Abstain;
    };

    if expected.same_value(&submitted) {
        Comparison::Match {
            expected,
            submitted,
        }
    } else {
        Comparison::Mismatch {
            expected,
            submitted,
        }
    }
}
