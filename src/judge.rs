#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Holistic grading by a remote language model.
//!
//! The model sees the question, the submission and a fixed rule set (quoting,
//! numeric literals, exact variable names, single `=`, capitalised boolean
//! keywords, no stray punctuation) and answers with a JSON [`Judgment`]. The
//! [`Judge`] trait is the seam the grader depends on, so tests can swap in a
//! deterministic stand-in.

use std::time::Duration;

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use crate::{
    config::{self, OpenAiEnv},
    prompts::GradingPrompts,
    types::{Judgment, Question},
};

/// Ways obtaining a remote judgment can fail.
#[derive(thiserror::Error, Debug)]
pub enum JudgeError {
    /// No API key is configured.
    #[error("OpenAI environment not configured (set OPENAI_API_KEY)")]
    NotConfigured,
    /// Transport, API or request-building failure.
    #[error("remote grading call failed: {0}")]
    Remote(#[from] OpenAIError),
    /// The call did not finish in time.
    #[error("remote grading call timed out after {0:?}")]
    Timeout(Duration),
    /// The reply had no message content.
    #[error("remote grading reply had no content")]
    EmptyReply,
    /// The reply was not a JSON judgment.
    #[error("remote grading reply is not a valid judgment: {reason}\nReply:\n```\n{reply}\n```")]
    Malformed {
        /// Why parsing failed.
        reason: String,
        /// The text that failed to parse.
        reply:  String,
    },
}

/// Produces a judgment for one submission.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Judges `code` as an answer to `question`.
    async fn judge(&self, question: &Question, code: &str) -> Result<Judgment, JudgeError>;
}

/// Judge backed by an OpenAI-compatible chat completions API.
#[derive(Clone, Debug)]
pub struct OpenAiJudge {
    /// Credentials and model settings; `None` means every call fails.
    openai:  Option<OpenAiEnv>,
    /// Prompt templates.
    prompts: GradingPrompts,
    /// Upper bound on one call.
    timeout: Duration,
}

impl OpenAiJudge {
    /// Creates a judge from explicit settings.
    pub fn new(openai: Option<OpenAiEnv>, prompts: GradingPrompts, timeout: Duration) -> Self {
        Self {
            openai,
            prompts,
            timeout,
        }
    }

    /// Creates a judge from the global configuration.
    pub fn from_config() -> Self {
        let cfg = config::get();
        Self::new(cfg.openai().cloned(), cfg.prompts().clone(), cfg.judge_timeout())
    }

    /// Builds the system and user messages for one submission.
    pub fn messages(
        &self,
        question: &Question,
        code: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, JudgeError> {
        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.system_message().to_string())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(self.prompts.user_message(&question.title, &question.description, code))
                .build()?
                .into(),
        ])
    }

    /// Sends one completion request and returns the reply text.
    async fn complete(
        &self,
        openai: &OpenAiEnv,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<String, JudgeError> {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(openai.api_base())
                .with_api_key(openai.api_key()),
        );

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(openai.model())
            .messages(messages)
            .temperature(openai.temperature())
            .n(1);
        if let Some(top_p) = openai.top_p() {
            args.top_p(top_p);
        }
        let request = args.build()?;

        let response = client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or(JudgeError::EmptyReply)
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    async fn judge(&self, question: &Question, code: &str) -> Result<Judgment, JudgeError> {
        let openai = self.openai.as_ref().ok_or(JudgeError::NotConfigured)?;
        let messages = self.messages(question, code)?;

        tracing::debug!(
            model = openai.model(),
            prompt_version = self.prompts.version(),
            "requesting remote judgment"
        );

        let reply = tokio::time::timeout(self.timeout, self.complete(openai, messages))
            .await
            .map_err(|_| JudgeError::Timeout(self.timeout))??;

        parse_judgment(&reply)
    }
}

/// Parses a model reply into a [`Judgment`].
///
/// The reply must hold exactly one JSON object. Text around it, such as a
/// Markdown code fence, is ignored.
pub fn parse_judgment(reply: &str) -> Result<Judgment, JudgeError> {
    let malformed = |reason: String| JudgeError::Malformed {
        reason,
        reply: reply.to_owned(),
    };

    let start = reply
        .find('{')
        .ok_or_else(|| malformed("no JSON object found".into()))?;
    let end = reply
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| malformed("unterminated JSON object".into()))?;

    serde_json::from_str::<Judgment>(&reply[start..=end]).map_err(|e| malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
    use serde_json::{Value, json};

    use super::*;
    use crate::{constants::FALLBACK_FEEDBACK, feedback::FeedbackMarkers, grader::Grader};

    /// Chat completion body whose single choice carries `content`.
    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-test",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
                "logprobs": null
            }],
            "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 1 }
        })
    }

    /// Serves `app` on an ephemeral port and returns its base URL.
    async fn spawn_api(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake API");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{addr}")
    }

    /// Judge pointed at `base` with a short timeout.
    fn judge_at(base: String) -> OpenAiJudge {
        let openai = OpenAiEnv::new("k").with_api_base(base).with_model("gpt-test");
        OpenAiJudge::new(Some(openai), GradingPrompts::load(), Duration::from_millis(500))
    }

    /// Fake API answering every completion with `content`.
    async fn replying(content: &'static str) -> String {
        let app = Router::new().route(
            "/chat/completions",
            post(move || async move { Json(completion(content)) }),
        );
        spawn_api(app).await
    }

    /// Fake API rejecting every request with an OpenAI-style error.
    async fn failing() -> String {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async {
                let body = json!({
                    "error": {
                        "message": "bad request",
                        "type": "invalid_request_error",
                        "param": null,
                        "code": null
                    }
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }),
        );
        spawn_api(app).await
    }

    /// Fake API that answers only after the judge has given up.
    async fn stalling() -> String {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(completion(r#"{"isCorrect": true, "feedback": "late"}"#))
            }),
        );
        spawn_api(app).await
    }

    /// Question whose task expects `yas = 10`.
    fn question() -> Question {
        Question::new("Yaş", "yas = 10 olsun")
    }

    #[test]
    fn parses_bare_object() {
        let judgment = parse_judgment(
            r#"{"isCorrect": true, "feedback": "🎉 ok 🌟", "lineComments": []}"#,
        )
        .expect("valid judgment");
        assert!(judgment.is_correct);
        assert_eq!(judgment.feedback, "🎉 ok 🌟");
        assert!(judgment.line_comments.is_empty());
    }

    #[test]
    fn parses_fenced_object_with_comments() {
        let reply = "```json\n{\"isCorrect\": false, \"feedback\": \"tırnak eksik\", \
                     \"lineComments\": [{\"lineNumber\": 1, \"content\": \"\\\"Mehmet\\\" \
                     yaz\"}]}\n```";
        let judgment = parse_judgment(reply).expect("fenced judgment");
        assert!(!judgment.is_correct);
        assert_eq!(judgment.line_comments.len(), 1);
        assert_eq!(judgment.line_comments[0].line_number, 1);
        assert_eq!(judgment.line_comments[0].content, "\"Mehmet\" yaz");
    }

    #[test]
    fn missing_line_comments_defaults_to_empty() {
        let judgment = parse_judgment(r#"{"isCorrect": false, "feedback": "x"}"#)
            .expect("line comments are optional");
        assert!(judgment.line_comments.is_empty());
    }

    #[test]
    fn rejects_prose_and_wrong_shapes() {
        assert!(matches!(
            parse_judgment("Kodun doğru!"),
            Err(JudgeError::Malformed { .. })
        ));
        assert!(matches!(
            parse_judgment(r#"{"correct": "yes"}"#),
            Err(JudgeError::Malformed { .. })
        ));
        assert!(matches!(parse_judgment("} {"), Err(JudgeError::Malformed { .. })));
    }

    #[tokio::test]
    async fn unconfigured_judge_fails_without_network() {
        let judge = OpenAiJudge::new(None, GradingPrompts::load(), Duration::from_secs(1));
        let err = judge
            .judge(&Question::new("t", "x = 1"), "x = 1")
            .await
            .expect_err("no credentials");
        assert!(matches!(err, JudgeError::NotConfigured));
    }

    #[test]
    fn messages_are_system_then_user() {
        let judge = OpenAiJudge::new(None, GradingPrompts::load(), Duration::from_secs(1));
        let messages = judge
            .messages(&Question::new("Yaş", "yas = 10 olsun"), "  yas = 10  ")
            .expect("messages build");
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }

    #[tokio::test]
    async fn remote_reply_is_parsed_into_a_judgment() {
        let base = replying(
            r#"```json
{"isCorrect": true, "feedback": "🎉 Harika 🌟", "lineComments": [{"lineNumber": 1, "content": "iyi"}]}
```"#,
        )
        .await;
        let judgment = judge_at(base)
            .judge(&question(), "yas = 10")
            .await
            .expect("judgment from fake API");
        assert!(judgment.is_correct);
        assert_eq!(judgment.feedback, "🎉 Harika 🌟");
        assert_eq!(judgment.line_comments.len(), 1);
    }

    #[tokio::test]
    async fn blank_remote_content_is_an_empty_reply() {
        let base = replying("   ").await;
        let err = judge_at(base)
            .judge(&question(), "yas = 10")
            .await
            .expect_err("blank content");
        assert!(matches!(err, JudgeError::EmptyReply), "{err}");
    }

    #[tokio::test]
    async fn prose_remote_content_is_malformed() {
        let base = replying("Kodun doğru görünüyor!").await;
        let err = judge_at(base)
            .judge(&question(), "yas = 10")
            .await
            .expect_err("prose content");
        assert!(matches!(err, JudgeError::Malformed { .. }), "{err}");
    }

    #[tokio::test]
    async fn api_error_status_is_a_remote_failure() {
        let base = failing().await;
        let err = judge_at(base)
            .judge(&question(), "yas = 10")
            .await
            .expect_err("error status");
        assert!(matches!(err, JudgeError::Remote(_)), "{err}");
    }

    #[tokio::test]
    async fn slow_api_times_out() {
        let base = stalling().await;
        let err = judge_at(base)
            .judge(&question(), "yas = 10")
            .await
            .expect_err("slow API");
        assert!(matches!(err, JudgeError::Timeout(_)), "{err}");
    }

    #[tokio::test]
    async fn grader_falls_back_when_the_api_fails() {
        for base in [failing().await, stalling().await, replying("").await] {
            let grader = Grader::new(Arc::new(judge_at(base)), FeedbackMarkers::default());
            let verdict = grader
                .grade(&crate::types::GradeRequest::new("yas = 10", question()))
                .await;
            assert!(!verdict.is_correct);
            assert_eq!(verdict.feedback, FeedbackMarkers::default().apply(FALLBACK_FEEDBACK));
            assert!(verdict.line_comments.is_empty());
        }
    }
}
