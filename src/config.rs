#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex, OnceLock},
    time::Duration,
};

use crate::{
    constants::{
        DEFAULT_CORS_ORIGIN, DEFAULT_HOST, DEFAULT_JUDGE_TIMEOUT_SECS, DEFAULT_OPENAI_ENDPOINT,
        DEFAULT_OPENAI_MODEL, DEFAULT_PORT, DEFAULT_TEMPERATURE,
    },
    feedback::FeedbackMarkers,
    prompts::GradingPrompts,
};

/// Errors raised while turning configuration values into runtime settings.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Host and port do not form a socket address.
    #[error("`{host}:{port}` is not a valid listen address")]
    BindAddress {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
    },
}

/// OpenAI credentials and optional tuning parameters sourced from the
/// environment.
#[derive(Clone)]
pub struct OpenAiEnv {
    /// Base URL for the OpenAI-compatible API endpoint.
    api_base:    String,
    /// API key used to authenticate OpenAI requests.
    api_key:     String,
    /// Model identifier for chat completions.
    model:       String,
    /// Sampling temperature.
    temperature: f32,
    /// Optional top-p override, if provided.
    top_p:       Option<f32>,
}

impl std::fmt::Debug for OpenAiEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEnv")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .finish()
    }
}

impl OpenAiEnv {
    /// Creates a configuration with default endpoint, model and temperature.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base:    DEFAULT_OPENAI_ENDPOINT.to_owned(),
            api_key:     api_key.into(),
            model:       DEFAULT_OPENAI_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            top_p:       None,
        }
    }

    /// Reads the OpenAI settings through `lookup`; returns `None` when no
    /// API key is available.
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = non_empty(lookup("OPENAI_API_KEY"))?;

        let mut env = Self::new(api_key);
        if let Some(base) = non_empty(lookup("OPENAI_ENDPOINT")) {
            env.api_base = base;
        }
        if let Some(model) = non_empty(lookup("OPENAI_MODEL")) {
            env.model = model;
        }
        env.temperature = lookup("OPENAI_TEMPERATURE")
            .and_then(|s| s.trim().parse::<f32>().ok())
            .unwrap_or(DEFAULT_TEMPERATURE);
        env.top_p = lookup("OPENAI_TOP_P").and_then(|s| s.trim().parse::<f32>().ok());

        Some(env)
    }

    /// Returns the API base URL used for OpenAI requests.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key used for OpenAI requests.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the sampling temperature.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Returns the configured top_p, if any.
    pub fn top_p(&self) -> Option<f32> {
        self.top_p
    }

    /// Overrides the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Overrides the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Runtime and prompt configuration shared across the crate.
pub struct ConfigState {
    /// OpenAI configuration, if an API key is present.
    openai:        Option<OpenAiEnv>,
    /// Embedded grading prompts.
    prompts:       GradingPrompts,
    /// Markers enforced on feedback text.
    markers:       FeedbackMarkers,
    /// Upper bound on one remote grading call.
    judge_timeout: Duration,
    /// Listen host.
    host:          String,
    /// Listen port.
    port:          u16,
    /// Origin of the lesson UI allowed through CORS.
    cors_origin:   String,
}

impl ConfigState {
    /// Construct a new configuration instance from process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construct a configuration from an arbitrary key lookup. Unparsable
    /// values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let judge_timeout = lookup("KODCHECK_JUDGE_TIMEOUT_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_JUDGE_TIMEOUT_SECS));

        let port = lookup("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let markers = FeedbackMarkers::new(
            lookup("KODCHECK_MARKER_LEADING").unwrap_or_default(),
            lookup("KODCHECK_MARKER_TRAILING").unwrap_or_default(),
        );

        Self {
            openai: OpenAiEnv::from_lookup(&lookup),
            prompts: GradingPrompts::load(),
            markers,
            judge_timeout,
            host: non_empty(lookup("KODCHECK_HOST")).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            cors_origin: non_empty(lookup("KODCHECK_CORS_ORIGIN"))
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        }
    }

    /// Returns the OpenAI configuration, if an API key was provided.
    pub fn openai(&self) -> Option<&OpenAiEnv> {
        self.openai.as_ref()
    }

    /// Returns the grading prompts.
    pub fn prompts(&self) -> &GradingPrompts {
        &self.prompts
    }

    /// Returns the feedback markers.
    pub fn markers(&self) -> &FeedbackMarkers {
        &self.markers
    }

    /// Returns the remote call timeout.
    pub fn judge_timeout(&self) -> Duration {
        self.judge_timeout
    }

    /// Returns the listen host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the listen port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the allowed CORS origin.
    pub fn cors_origin(&self) -> &str {
        &self.cors_origin
    }

    /// Returns the socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.host
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, self.port))
            .map_err(|_| ConfigError::BindAddress {
                host: self.host.clone(),
                port: self.port,
            })
    }

    /// Replaces the listen host and port, e.g. from command-line flags.
    pub fn with_listen(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Installs `state` as the global configuration, replacing any earlier one.
pub fn install(state: ConfigState) -> ConfigHandle {
    let cfg = Arc::new(state);
    let mut guard = slot().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(Arc::clone(&cfg));
    ConfigHandle(cfg)
}

/// Returns the active configuration, reading the environment on first use.
pub fn get() -> ConfigHandle {
    let mut guard = slot().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(cfg) = guard.as_ref() {
        return ConfigHandle(Arc::clone(cfg));
    }

    let cfg = Arc::new(ConfigState::from_env());
    *guard = Some(Arc::clone(&cfg));
    ConfigHandle(cfg)
}

/// Trims `value` and drops it when empty.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
