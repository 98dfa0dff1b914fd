#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Feedback returned when the submission is empty or only whitespace.
pub const NO_CODE_FEEDBACK: &str = "🌟 Henüz kod yazmamışsın! Hadi başlayalım! ✨";

/// Feedback that replaces everything else once a submission is accepted.
pub const CORRECT_FEEDBACK: &str = "🎉 Harika! Kodu tam olarak doğru yazdın! 🌟";

/// Feedback used whenever the remote judgment could not be obtained or read.
pub const FALLBACK_FEEDBACK: &str = "🤔 Bir hata oluştu. Tekrar dener misin? ⭐";

/// Default marker placed in front of feedback that lacks one.
pub const DEFAULT_LEADING_MARKER: &str = "🌟";

/// Default marker placed after feedback that lacks one.
pub const DEFAULT_TRAILING_MARKER: &str = "⭐";

/// Path the lesson UI posts submissions to.
pub const CHECK_CODE_ROUTE: &str = "/api/openai/check-code";

/// Default OpenAI-compatible API base.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default chat model used for grading.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Default sampling temperature for grading requests.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default upper bound on a single remote grading call, in seconds.
pub const DEFAULT_JUDGE_TIMEOUT_SECS: u64 = 30;

/// Default origin of the lesson UI allowed through CORS.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Submissions longer than this are cut before being placed in a prompt.
pub const PROMPT_TRUNCATE: usize = 15000;
