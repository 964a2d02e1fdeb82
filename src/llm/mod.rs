//! LLM request plumbing, shared types and the generation contract.
//!
//! The orchestrator in [`generator`] drives one generation call; provider
//! specifics live in [`provider`]; [`article`] validates the final output.

/// Article schema and response validation.
pub mod article;
/// Generation orchestrator.
pub mod generator;
/// Article prompt template rendering.
pub mod prompt;
/// Vendor adapters: request builders and stream decoders.
pub mod provider;

use std::fmt;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::ProxyMode;
use crate::error::ForgeError;
use crate::llm::provider::utils::mask_api_key;

pub use article::{ArticleRejection, GeneratedArticle, TitleOption, parse_article};
pub use generator::Generator;

/// Input to one generation call.
///
/// Built per user action by the CLI layer from settings and flags, consumed once.
///
/// # Example
/// ```
/// use article_forge::llm::GenerationRequest;
///
/// let request = GenerationRequest::new("chatgpt", "sk-test-1234567890", "Write about Rust")
///     .with_model("gpt-4o-mini")
///     .with_proxy(Some("http://127.0.0.1:8080".to_string()));
/// assert_eq!(request.model, "gpt-4o-mini");
/// ```
#[derive(Clone, Default)]
pub struct GenerationRequest {
    /// Provider identifier (`qwen`, `gemini`, `chatgpt`).
    pub provider: String,
    /// Secret API key. Only ever logged masked.
    pub api_key: String,
    /// Fully rendered prompt.
    pub prompt: String,
    /// Vendor model id. Empty means the provider default.
    pub model: String,
    /// Optional proxy address.
    pub proxy_url: Option<String>,
    /// How `proxy_url` is applied.
    pub proxy_mode: ProxyMode,
    /// Optional override of the vendor base URL.
    pub endpoint: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        provider: impl Into<String>,
        api_key: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key: api_key.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url;
        self
    }

    pub fn with_proxy_mode(mut self, proxy_mode: ProxyMode) -> Self {
        self.proxy_mode = proxy_mode;
        self
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("provider", &self.provider)
            .field("api_key", &mask_api_key(&self.api_key))
            .field("prompt_len", &self.prompt.len())
            .field("model", &self.model)
            .field("proxy_url", &self.proxy_url)
            .field("proxy_mode", &self.proxy_mode)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Lifecycle of one generation call.
///
/// `Failed` is reachable from every active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Requesting,
    Streaming,
    Complete,
    Failed,
}

/// Receiver side of the callback contract.
///
/// The generator guarantees: fragments arrive in decode order, and exactly one
/// of [`on_complete`](Self::on_complete) / [`on_error`](Self::on_error) is
/// called last. Nothing is called after the terminal callback.
pub trait GenerationCallbacks: Send {
    /// A decoded slice of model output.
    fn on_fragment(&mut self, fragment: &str);

    /// The accumulated output validated as an article.
    fn on_complete(&mut self, article: GeneratedArticle);

    /// The call failed (or was cancelled).
    fn on_error(&mut self, error: ForgeError);
}

/// Events emitted by [`Generator::generate_stream`].
///
/// # Variants
/// - [`Fragment`] - text to append to the running output
/// - [`Complete`] - terminal, validated article
/// - [`Error`] - terminal, failure (including cancellation)
///
/// [`Fragment`]: GenerationEvent::Fragment
/// [`Complete`]: GenerationEvent::Complete
/// [`Error`]: GenerationEvent::Error
#[derive(Debug)]
pub enum GenerationEvent {
    Fragment(String),
    Complete(GeneratedArticle),
    Error(ForgeError),
}

impl GenerationEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GenerationEvent::Fragment(_))
    }
}

/// Forwards callbacks into a channel, used by [`Generator::generate_stream`].
impl GenerationCallbacks for mpsc::UnboundedSender<GenerationEvent> {
    fn on_fragment(&mut self, fragment: &str) {
        let _ = self.send(GenerationEvent::Fragment(fragment.to_string()));
    }

    fn on_complete(&mut self, article: GeneratedArticle) {
        let _ = self.send(GenerationEvent::Complete(article));
    }

    fn on_error(&mut self, error: ForgeError) {
        let _ = self.send(GenerationEvent::Error(error));
    }
}

/// Handle for consuming a streaming generation.
///
/// # Usage example
/// ```no_run
/// use article_forge::llm::GenerationEvent;
///
/// # async fn example(mut handle: article_forge::llm::GenerationHandle) {
/// while let Some(event) = handle.next_event().await {
///     match event {
///         GenerationEvent::Fragment(text) => print!("{}", text),
///         GenerationEvent::Complete(article) => println!("\n{}", article.titles[0].title),
///         GenerationEvent::Error(err) => eprintln!("Error: {}", err),
///     }
/// }
/// # }
/// ```
pub struct GenerationHandle {
    receiver: mpsc::UnboundedReceiver<GenerationEvent>,
    cancel: CancellationToken,
    finished: bool,
}

impl GenerationHandle {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<GenerationEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            cancel,
            finished: false,
        }
    }

    /// Aborts the call. The next [`next_event`](Self::next_event) yields a
    /// single `Error(Cancelled)` and then `None`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the token driving this call (e.g. for a Ctrl-C handler).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event, or `None` once the terminal event has been delivered.
    ///
    /// Events queued before a cancellation are discarded, so no fragment or
    /// completion is ever observed after [`cancel`](Self::cancel).
    pub async fn next_event(&mut self) -> Option<GenerationEvent> {
        if self.finished {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.finished = true;
            self.receiver.close();
            return Some(GenerationEvent::Error(ForgeError::Cancelled));
        }

        let event = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => GenerationEvent::Error(ForgeError::Cancelled),
            event = self.receiver.recv() => match event {
                Some(event) => event,
                // Producer task ended without a terminal event (panicked).
                None => GenerationEvent::Error(ForgeError::Cancelled),
            },
        };

        if event.is_terminal() {
            self.finished = true;
            self.receiver.close();
        }
        Some(event)
    }
}

impl Drop for GenerationHandle {
    fn drop(&mut self) {
        // 调用方丢弃 handle 即视为取消，后台任务随之停止读取
        self.cancel.cancel();
    }
}
