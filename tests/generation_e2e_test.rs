//! 端到端生成测试
//!
//! 使用 mockito 模拟三家 vendor 的流式接口，经公开 API 走完整链路：
//! 请求构建 -> 流解码 -> 累积 -> 文章校验 -> 回调 / 事件 / 历史记录。

use article_forge::commands::format::OutputFormat;
use article_forge::commands::generate;
use article_forge::commands::options::GenerateOptions;
use article_forge::config::{AppConfig, NetworkConfig, ProviderConfig, ProxyMode};
use article_forge::error::ForgeError;
use article_forge::history::HistoryStore;
use article_forge::llm::prompt::ArticleOptions;
use article_forge::llm::{
    ArticleRejection, GeneratedArticle, GenerationCallbacks, GenerationEvent, GenerationRequest,
    Generator,
};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

const API_KEY: &str = "sk-e2e-0123456789";

fn ensure_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn generator() -> Generator {
    ensure_crypto_provider();
    Generator::new(&NetworkConfig {
        first_byte_timeout: 5,
        stream_timeout: 10,
        ..Default::default()
    })
}

fn request(provider: &str, server: &Server) -> GenerationRequest {
    GenerationRequest::new(provider, API_KEY, "写一篇关于 Rust 的文章")
        .with_endpoint(Some(server.url()))
}

/// 含多字节字符的合法文章
fn article_json() -> String {
    serde_json::json!({
        "titles": [
            { "title": "Rust 所有权入门", "score": 9 },
            { "title": "深入理解借用检查器", "score": 8.5 },
            { "title": "零成本抽象", "score": 8 },
            { "title": "无畏并发", "score": 7 },
            { "title": "从 C++ 到 Rust", "score": 6.5 }
        ],
        "content": "## 引言\n\nRust 通过所有权保证内存安全。",
        "tags": ["Rust", "所有权", "借用", "内存安全", "并发", "系统编程"]
    })
    .to_string()
}

fn split_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

fn openai_body(text: &str, size: usize) -> String {
    let mut body = String::new();
    for piece in split_chars(text, size) {
        let event = serde_json::json!({"choices": [{"delta": {"content": piece}, "finish_reason": null}]});
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[derive(Default)]
struct Recorder {
    fragments: Vec<String>,
    completed: Option<GeneratedArticle>,
    errors: Vec<ForgeError>,
}

impl GenerationCallbacks for Recorder {
    fn on_fragment(&mut self, fragment: &str) {
        assert!(self.completed.is_none() && self.errors.is_empty());
        self.fragments.push(fragment.to_string());
    }

    fn on_complete(&mut self, article: GeneratedArticle) {
        self.completed = Some(article);
    }

    fn on_error(&mut self, error: ForgeError) {
        self.errors.push(error);
    }
}

// ========== ChatGPT (vendor C) ==========

#[tokio::test]
async fn test_chatgpt_fragments_concatenate_to_article() {
    let mut server = Server::new_async().await;
    let article = article_json();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "stream": true
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(openai_body(&article, 3))
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    generator()
        .generate(request("chatgpt", &server), &mut recorder, &CancellationToken::new())
        .await;

    mock.assert_async().await;
    assert!(recorder.errors.is_empty());
    assert_eq!(recorder.fragments.concat(), article);

    let result = recorder.completed.unwrap();
    assert_eq!(result.titles[0].title, "Rust 所有权入门");
    assert_eq!(result.titles[1].score, 8.5);
    assert_eq!(result.tags.len(), 6);
}

#[tokio::test]
async fn test_openai_alias_and_custom_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(serde_json::json!({"model": "gpt-4o-mini"})))
        .with_status(200)
        .with_body(openai_body(&article_json(), 50))
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    generator()
        .generate(
            request("openai", &server).with_model("gpt-4o-mini"),
            &mut recorder,
            &CancellationToken::new(),
        )
        .await;

    mock.assert_async().await;
    assert!(recorder.completed.is_some());
}

#[tokio::test]
async fn test_malformed_output_reports_titles_length() {
    let mut server = Server::new_async().await;
    let text = r#"```json
{"titles":[{"title":"only one","score":9}],"content":"x","tags":["a","b","c","d","e","f"]}
```"#;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(openai_body(text, 8))
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    generator()
        .generate(request("chatgpt", &server), &mut recorder, &CancellationToken::new())
        .await;

    assert!(recorder.completed.is_none());
    assert_eq!(recorder.errors.len(), 1);
    match &recorder.errors[0] {
        ForgeError::MalformedResponse { reason, raw } => {
            assert_eq!(reason, &ArticleRejection::TitlesLength(1));
            assert_eq!(reason.to_string(), "titles length != 5 (got 1)");
            assert_eq!(raw, text);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_transport_with_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(503)
        .with_body("upstream overloaded")
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    generator()
        .generate(request("chatgpt", &server), &mut recorder, &CancellationToken::new())
        .await;

    assert!(recorder.fragments.is_empty());
    let err = &recorder.errors[0];
    assert!(matches!(
        err,
        ForgeError::Transport { status: Some(503), message, .. } if message.contains("overloaded")
    ));
    assert!(err.suggestion().is_some());
}

// ========== Qwen (vendor A) ==========

#[tokio::test]
async fn test_qwen_event_stream() {
    let mut server = Server::new_async().await;
    let article = article_json();
    let mut body = String::new();
    for (i, piece) in split_chars(&article, 20).iter().enumerate() {
        let chunk = serde_json::json!({
            "output": {"choices": [{"message": {"role": "assistant", "content": piece}, "finish_reason": "null"}]},
            "request_id": "req-1"
        });
        body.push_str(&format!("id:{}\nevent:result\n:HTTP_STATUS/200\ndata:{}\n\n", i + 1, chunk));
    }
    let done = serde_json::json!({"output": {"choices": [{"message": {"role": "assistant", "content": ""}, "finish_reason": "stop"}]}});
    body.push_str(&format!("id:999\nevent:result\n:HTTP_STATUS/200\ndata:{}\n\n", done));

    let mock = server
        .mock("POST", "/api/v1/services/aigc/text-generation/generation")
        .match_header("x-dashscope-sse", "enable")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "qwen-plus",
            "parameters": {"incremental_output": true}
        })))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let mut handle = generator().generate_stream(request("dashscope", &server));
    let mut text = String::new();
    let mut completed = None;
    while let Some(event) = handle.next_event().await {
        match event {
            GenerationEvent::Fragment(fragment) => text.push_str(&fragment),
            GenerationEvent::Complete(result) => completed = Some(result),
            GenerationEvent::Error(e) => panic!("unexpected error: {}", e),
        }
    }

    mock.assert_async().await;
    assert_eq!(text, article);
    assert_eq!(completed.unwrap().tags[1], "所有权");
}

// ========== Gemini (vendor B) ==========

#[tokio::test]
async fn test_gemini_json_array_stream() {
    let mut server = Server::new_async().await;
    let article = article_json();
    let objects: Vec<String> = split_chars(&article, 64)
        .into_iter()
        .map(|piece| {
            serde_json::json!({"candidates": [{"content": {"role": "model", "parts": [{"text": piece}]}}]})
                .to_string()
        })
        .collect();
    let body = format!("[{}]", objects.join(",\n"));

    let mock = server
        .mock("POST", "/v1beta/models/gemini-1.5-flash:streamGenerateContent")
        .match_query(Matcher::UrlEncoded("key".into(), API_KEY.into()))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let mut recorder = Recorder::default();
    generator()
        .generate(
            request("gemini", &server).with_model("gemini-1.5-flash"),
            &mut recorder,
            &CancellationToken::new(),
        )
        .await;

    mock.assert_async().await;
    assert_eq!(recorder.fragments.concat(), article);
    assert!(recorder.completed.is_some());
}

// ========== 代理与取消 ==========

#[tokio::test]
async fn test_prefix_proxy_receives_full_vendor_url() {
    let mut relay = Server::new_async().await;
    let mock = relay
        .mock(
            "POST",
            Matcher::Regex(r"^/https:/+api\.openai\.com/v1/chat/completions$".into()),
        )
        .with_status(200)
        .with_body(openai_body(&article_json(), 40))
        .create_async()
        .await;

    let request = GenerationRequest::new("chatgpt", API_KEY, "prompt")
        .with_proxy(Some(format!("{}/", relay.url())))
        .with_proxy_mode(ProxyMode::Prefix);

    let mut recorder = Recorder::default();
    generator()
        .generate(request, &mut recorder, &CancellationToken::new())
        .await;

    mock.assert_async().await;
    assert!(recorder.completed.is_some());
}

#[tokio::test]
async fn test_cancel_token_yields_only_cancelled() {
    let server = Server::new_async().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut recorder = Recorder::default();
    generator()
        .generate(request("chatgpt", &server), &mut recorder, &cancel)
        .await;

    assert!(recorder.fragments.is_empty());
    assert!(recorder.completed.is_none());
    assert_eq!(recorder.errors.len(), 1);
    assert!(matches!(recorder.errors[0], ForgeError::Cancelled));
}

// ========== generate 命令 + 历史记录 ==========

#[tokio::test]
async fn test_generate_command_saves_history() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(openai_body(&article_json(), 25))
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.llm.default_provider = "relay".to_string();
    config.llm.providers.insert(
        "relay".to_string(),
        ProviderConfig {
            kind: Some(article_forge::llm::provider::ProviderKind::ChatGpt),
            endpoint: Some(server.url()),
            api_key: Some(API_KEY.to_string()),
            model: "gpt-4o-mini".to_string(),
        },
    );
    config.network.first_byte_timeout = 5;
    config.network.stream_timeout = 10;

    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path().join("history.json"), 10);

    let options = GenerateOptions {
        article: ArticleOptions::new("Rust 所有权"),
        provider_override: None,
        model_override: None,
        proxy_override: None,
        no_history: false,
        format: OutputFormat::Json,
        verbose: false,
    };
    generate::run_internal(&options, &config, Some(&store))
        .await
        .unwrap();

    let items = store.list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].provider, "chatgpt");
    assert_eq!(items[0].options.keywords, "Rust 所有权");
    assert_eq!(items[0].title(), "Rust 所有权入门");
}
