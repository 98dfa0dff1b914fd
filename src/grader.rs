#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::{
    compare::{Comparison, compare},
    config,
    constants::{CORRECT_FEEDBACK, FALLBACK_FEEDBACK, NO_CODE_FEEDBACK},
    feedback::FeedbackMarkers,
    judge::{Judge, OpenAiJudge},
    types::{GradeRequest, Judgment, Verdict},
};

/// Returns the verdict for a submission with no code in it.
pub fn no_code_verdict() -> Verdict {
    Judgment::builder()
        .is_correct(false)
        .feedback(NO_CODE_FEEDBACK)
        .build()
}

/// Returns the judgment substituted when the remote judge fails.
pub fn fallback_judgment() -> Judgment {
    Judgment::builder()
        .is_correct(false)
        .feedback(FALLBACK_FEEDBACK)
        .build()
}

/// Merges the local value check with the remote judgment into a verdict.
#[derive(Clone)]
pub struct Grader {
    /// Remote judge.
    judge:   Arc<dyn Judge>,
    /// Markers enforced on the final feedback.
    markers: FeedbackMarkers,
}

impl Grader {
    /// Creates a grader around `judge`.
    pub fn new(judge: Arc<dyn Judge>, markers: FeedbackMarkers) -> Self {
        Self { judge, markers }
    }

    /// Creates a grader backed by the OpenAI judge and the global
    /// configuration.
    pub fn from_config() -> Self {
        let markers = config::get().markers().clone();
        Self::new(Arc::new(OpenAiJudge::from_config()), markers)
    }

    /// Returns the markers enforced on feedback.
    pub fn markers(&self) -> &FeedbackMarkers {
        &self.markers
    }

    /// Grades one submission. Never fails: remote problems degrade to the
    /// fallback judgment.
    pub async fn grade(&self, request: &GradeRequest) -> Verdict {
        let span = tracing::info_span!("grade", request_id = %Uuid::new_v4());
        self.grade_inner(request).instrument(span).await
    }

    /// Body of [`Grader::grade`], run inside the request span.
    async fn grade_inner(&self, request: &GradeRequest) -> Verdict {
        if request.code.trim().is_empty() {
            tracing::debug!("empty submission");
            return no_code_verdict();
        }

        // TODO: skip the remote call when the local value check already rejects.
        // On a mismatch the remote feedback is dropped as well as its verdict;
        // the student sees the value-check message and its line-1 comment.
        let external = match self.judge.judge(&request.question, &request.code).await {
            Ok(judgment) => judgment,
            Err(err) => {
                tracing::warn!(error = %err, "remote judgment unavailable, using fallback");
                fallback_judgment()
            }
        };

        let comparison = compare(&request.question.description, &request.code);
        match &comparison {
            Comparison::Abstain => tracing::debug!("no assignment to compare"),
            Comparison::Match { expected, .. } => {
                tracing::debug!(kind = %expected.kind(), "submitted value matches")
            }
            Comparison::Mismatch {
                expected,
                submitted,
            } => tracing::debug!(
                expected = %expected.kind(),
                submitted = %submitted.kind(),
                "submitted value differs"
            ),
        }
        tracing::debug!(remote_correct = external.is_correct, "merging");

        let mut verdict = merge(&comparison, external);
        if verdict.is_correct {
            verdict.feedback = CORRECT_FEEDBACK.to_owned();
        }
        verdict.feedback = self.markers.apply(&verdict.feedback);
        verdict
    }
}

/// Combines the local comparison with the remote judgment.
///
/// A mismatch decides everything; a match needs the remote judge to agree;
/// an abstention defers entirely to the remote judge.
pub fn merge(comparison: &Comparison, external: Judgment) -> Judgment {
    comparison.rejection().unwrap_or(external)
}
