//! # kodcheck
//!
//! Checks answers to step-by-step coding lessons. A submission is compared
//! against the value the task asks for, judged by a remote language model,
//! and the two opinions are merged into a single verdict with feedback.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Comparing the submitted value with the one the task asks for
pub mod compare;
/// Environment-driven settings shared across the crate
pub mod config;
/// Fixed messages and defaults
pub mod constants;
/// Extracting assigned values from code and task prose
pub mod extract;
/// Decorative markers around feedback text
pub mod feedback;
/// Merging local and remote opinions into a verdict
pub mod grader;
/// Remote language-model judgment
pub mod judge;
/// Embedded prompt templates
pub mod prompts;
/// HTTP grading endpoint
pub mod server;
/// Request and response shapes
pub mod types;

pub use grader::Grader;
pub use types::{GradeRequest, Judgment, LineComment, Question, Verdict};
