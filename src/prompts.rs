#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::constants::PROMPT_TRUNCATE;

/// Version tag of the embedded prompt templates. Bump whenever any file under
/// `src/prompts/` changes so logged requests can be traced to their wording.
pub const PROMPT_VERSION: &str = "check-code/v1";

/// Prompt templates used when asking the model for a judgment.
#[derive(Clone, Debug)]
pub struct GradingPrompts {
    /// Version tag the templates were loaded under.
    version:        &'static str,
    /// Persona and tone given as the system message.
    system_message: String,
    /// Fixed grading rules and reply format appended to every user message.
    rules:          String,
}

impl Default for GradingPrompts {
    fn default() -> Self {
        Self::load()
    }
}

impl GradingPrompts {
    /// Load prompt templates embedded in the binary.
    pub fn load() -> Self {
        Self {
            version:        PROMPT_VERSION,
            system_message: include_str!("prompts/system_message.md").trim().to_string(),
            rules:          include_str!("prompts/grading_rules.md").trim().to_string(),
        }
    }

    /// Returns the template version tag.
    pub fn version(&self) -> &str {
        self.version
    }

    /// Returns the system message.
    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Returns the fixed grading rules.
    pub fn rules(&self) -> &str {
        &self.rules
    }

    /// Renders the user message for one submission.
    pub fn user_message(&self, title: &str, description: &str, code: &str) -> String {
        format!(
            include_str!("prompts/grading_prompt.md"),
            title = truncate(title),
            description = truncate(description),
            code = truncate(code.trim()),
            rules = self.rules,
        )
    }
}

/// Cuts `text` to at most `PROMPT_TRUNCATE` characters.
fn truncate(text: &str) -> &str {
    match text.char_indices().nth(PROMPT_TRUNCATE) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
