//! Generation orchestrator
//!
//! One uniform entry point for all vendors: validate, resolve the adapter,
//! send, drive the read loop under cancellation and timeouts, then validate
//! the accumulated text as an article.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::article::{GeneratedArticle, parse_article, truncate_for_preview};
use super::provider::streaming::DecodeEvent;
use super::provider::utils::{is_valid_proxy_url, proxy_schemes, redact};
use super::provider::{ProviderKind, create_http_client, create_proxied_client};
use super::{GenerationCallbacks, GenerationHandle, GenerationRequest, GenerationState};
use crate::config::{NetworkConfig, ProxyMode};
use crate::error::{ForgeError, Result};

/// Drives generation calls.
///
/// Cheap to clone; calls are independent and may run concurrently, they
/// only share the HTTP connection pool.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    network: NetworkConfig,
}

impl Generator {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            network: network.clone(),
        }
    }

    /// Runs one generation call to completion.
    ///
    /// Fragments are delivered in decode order through `callbacks`, followed
    /// by exactly one of `on_complete` / `on_error`. Once `cancel` fires no
    /// further fragment or completion is delivered and the single terminal
    /// callback is `on_error(Cancelled)`.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        callbacks: &mut dyn GenerationCallbacks,
        cancel: &CancellationToken,
    ) {
        tracing::debug!(?request, "Starting generation");
        log_state(&request.provider, GenerationState::Idle);

        // 同步校验先于取消检查
        if let Err(e) = validate_request(&request) {
            log_state(&request.provider, GenerationState::Failed);
            tracing::warn!(provider = %request.provider, "Generation rejected: {}", e);
            callbacks.on_error(e);
            return;
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ForgeError::Cancelled),
            result = self.run(&request, callbacks, cancel) => result,
        };

        match outcome {
            Ok(article) if !cancel.is_cancelled() => {
                log_state(&request.provider, GenerationState::Complete);
                callbacks.on_complete(article);
            }
            Ok(_) => {
                log_state(&request.provider, GenerationState::Failed);
                callbacks.on_error(ForgeError::Cancelled);
            }
            Err(e) => {
                let e = if cancel.is_cancelled() {
                    ForgeError::Cancelled
                } else {
                    e
                };
                log_state(&request.provider, GenerationState::Failed);
                tracing::warn!(provider = %request.provider, "Generation failed: {}", e);
                callbacks.on_error(e);
            }
        }
    }

    /// Starts a generation call on the runtime and returns a handle to its events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn generate_stream(&self, request: GenerationRequest) -> GenerationHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let generator = self.clone();
        let token = cancel.clone();
        tokio::spawn(async move {
            let mut tx = tx;
            generator.generate(request, &mut tx, &token).await;
        });

        GenerationHandle::new(rx, cancel)
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        callbacks: &mut dyn GenerationCallbacks,
        cancel: &CancellationToken,
    ) -> Result<GeneratedArticle> {
        let kind: ProviderKind = request.provider.parse()?;

        let client = match (request.proxy_mode, request.proxy_url.as_deref()) {
            (ProxyMode::Forward, Some(proxy_url)) => {
                create_proxied_client(&self.network, proxy_url)?
            }
            _ => create_http_client(&self.network)?,
        };

        let seconds = self.network.stream_timeout;
        match tokio::time::timeout(
            Duration::from_secs(seconds),
            self.drive(kind, request, &client, callbacks, cancel),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ForgeError::Timeout {
                provider: kind.display_name().to_string(),
                stage: "complete response",
                seconds,
            }),
        }
    }

    async fn drive(
        &self,
        kind: ProviderKind,
        request: &GenerationRequest,
        client: &Client,
        callbacks: &mut dyn GenerationCallbacks,
        cancel: &CancellationToken,
    ) -> Result<GeneratedArticle> {
        let provider = kind.display_name();
        let built = kind.build_request(request);
        let first_byte_secs = self.network.first_byte_timeout;
        let first_byte = Duration::from_secs(first_byte_secs);
        let timeout_error = |stage: &'static str| ForgeError::Timeout {
            provider: provider.to_string(),
            stage,
            seconds: first_byte_secs,
        };
        let transport_error = |e: reqwest::Error| ForgeError::Transport {
            provider: provider.to_string(),
            status: e.status().map(|s| s.as_u16()),
            message: redact(&e.without_url().to_string(), &request.api_key),
        };

        log_state(provider, GenerationState::Requesting);
        tracing::debug!(request = ?built, "Sending {} request", provider);

        let mut http = client.request(built.method.clone(), &built.url);
        for (name, value) in &built.headers {
            http = http.header(name.as_str(), value.as_str());
        }

        let response = tokio::time::timeout(first_byte, http.json(&built.body).send())
            .await
            .map_err(|_| timeout_error("response headers"))?
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                "{} API error ({}): {}",
                provider,
                status,
                truncate_for_preview(&body)
            );
            return Err(ForgeError::Transport {
                provider: provider.to_string(),
                status: Some(status.as_u16()),
                message: redact(body.trim(), &request.api_key),
            });
        }

        log_state(provider, GenerationState::Streaming);

        let mut stream = response.bytes_stream();
        let mut decoder = kind.decoder();
        let mut accumulator = Accumulator::new(provider, self.network.max_consecutive_decode_errors);
        let mut first_chunk = true;
        let mut finished = false;

        loop {
            let next = if first_chunk {
                first_chunk = false;
                tokio::time::timeout(first_byte, stream.next())
                    .await
                    .map_err(|_| timeout_error("first byte"))?
            } else {
                stream.next().await
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(transport_error)?;

            if accumulator.apply(decoder.feed(&chunk), callbacks, cancel)? {
                finished = true;
                break;
            }
        }

        if !finished {
            accumulator.apply(decoder.finish(), callbacks, cancel)?;
        }

        accumulator.into_article()
    }
}

/// Per-call accumulated output and decode bookkeeping
struct Accumulator<'a> {
    provider: &'a str,
    buffer: String,
    fragments: usize,
    malformed: usize,
    consecutive_malformed: usize,
    max_consecutive_malformed: usize,
}

impl<'a> Accumulator<'a> {
    fn new(provider: &'a str, max_consecutive_malformed: usize) -> Self {
        Self {
            provider,
            buffer: String::new(),
            fragments: 0,
            malformed: 0,
            consecutive_malformed: 0,
            max_consecutive_malformed,
        }
    }

    /// Applies decoded events; `Ok(true)` once the vendor signalled completion.
    fn apply(
        &mut self,
        events: Vec<DecodeEvent>,
        callbacks: &mut dyn GenerationCallbacks,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        for event in events {
            match event {
                DecodeEvent::Fragment(text) => {
                    if cancel.is_cancelled() {
                        return Err(ForgeError::Cancelled);
                    }
                    self.consecutive_malformed = 0;
                    self.fragments += 1;
                    self.buffer.push_str(&text);
                    callbacks.on_fragment(&text);
                }
                DecodeEvent::Finished => return Ok(true),
                DecodeEvent::Malformed { record, error } => {
                    self.malformed += 1;
                    self.consecutive_malformed += 1;
                    tracing::warn!(
                        "Skipping malformed {} stream record: {}, record: {}",
                        self.provider,
                        error,
                        truncate_for_preview(&record)
                    );

                    if self.max_consecutive_malformed > 0
                        && self.consecutive_malformed >= self.max_consecutive_malformed
                    {
                        return Err(ForgeError::Transport {
                            provider: self.provider.to_string(),
                            status: None,
                            message: format!(
                                "{} consecutive stream records could not be decoded (last error: {})",
                                self.consecutive_malformed, error
                            ),
                        });
                    }
                }
            }
        }
        Ok(false)
    }

    fn into_article(self) -> Result<GeneratedArticle> {
        if self.malformed > 0 {
            tracing::warn!(
                "{} stream had {} malformed record(s)",
                self.provider,
                self.malformed
            );
            if self.fragments == 0 {
                return Err(ForgeError::Transport {
                    provider: self.provider.to_string(),
                    status: None,
                    message: format!(
                        "stream contained only malformed records ({})",
                        self.malformed
                    ),
                });
            }
        }

        tracing::debug!(
            "{} stream complete: {} fragment(s), {} bytes",
            self.provider,
            self.fragments,
            self.buffer.len()
        );

        parse_article(&self.buffer).map_err(|reason| ForgeError::MalformedResponse {
            reason,
            raw: self.buffer,
        })
    }
}

fn log_state(provider: &str, state: GenerationState) {
    tracing::debug!(provider, ?state, "Generation state changed");
}

/// Request checks performed before any network activity
fn validate_request(request: &GenerationRequest) -> Result<()> {
    if request.provider.trim().is_empty() {
        return Err(ForgeError::Validation(
            "provider must not be empty".to_string(),
        ));
    }
    if request.api_key.trim().is_empty() {
        return Err(ForgeError::Validation(
            "api_key must not be empty".to_string(),
        ));
    }
    if request.prompt.trim().is_empty() {
        return Err(ForgeError::Validation("prompt must not be empty".to_string()));
    }
    if let Some(proxy_url) = &request.proxy_url
        && !is_valid_proxy_url(proxy_url, request.proxy_mode)
    {
        return Err(ForgeError::Validation(format!(
            "proxy_url must be a non-blank address starting with one of {} (got '{}')",
            proxy_schemes(request.proxy_mode).join(", "),
            proxy_url
        )));
    }
    Ok(())
}
