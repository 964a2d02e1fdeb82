use serde::Serialize;

use super::format::OutputFormat;
use super::json;
use super::options::GenerateOptions;
use crate::config::AppConfig;
use crate::error::{ForgeError, Result};
use crate::export;
use crate::history::HistoryStore;
use crate::llm::prompt::build_article_prompt;
use crate::llm::provider::utils::mask_api_key;
use crate::llm::{GeneratedArticle, GenerationRequest, Generator};
use crate::ui;

/// JSON 输出的数据部分
#[derive(Debug, Serialize)]
struct GenerateJson<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    provider: &'a str,
    model: &'a str,
    article: &'a GeneratedArticle,
}

/// 执行 generate 命令（公开接口）
pub async fn run(options: &GenerateOptions<'_>, config: &AppConfig) -> Result<()> {
    let history = if config.history.enabled && !options.no_history {
        match HistoryStore::open_default(&config.history) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("History disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    let result = run_internal(options, config, history.as_ref()).await;
    if let Err(e) = &result
        && options.format.is_json()
    {
        json::output_json_error(e)?;
    }
    result
}

/// 内部实现，history store 由调用方注入（用于测试）
pub async fn run_internal(
    options: &GenerateOptions<'_>,
    config: &AppConfig,
    history: Option<&HistoryStore>,
) -> Result<()> {
    let colored = options.effective_colored(config);
    let is_text = !options.format.is_machine_readable();

    let request = build_request(options, config)?;
    let provider = request.provider.clone();
    let model = request.model.clone();

    if is_text {
        ui::step(
            "1/3",
            &format!(
                "Generating with {} ({})",
                provider,
                if model.is_empty() { "default model" } else { &model }
            ),
            colored,
        );
    }

    let generator = Generator::new(&config.network);
    let mut handle = generator.generate_stream(request);

    // Ctrl-C 取消当前生成
    let token = handle.cancellation_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Ctrl-C received, cancelling generation");
            token.cancel();
        }
    });

    let spinner = is_text.then(|| ui::Spinner::new("Waiting for the model...", colored));
    let mut output = ui::StreamingOutput::new(colored, is_text && config.ui.streaming);
    let outcome = output.process(&mut handle, spinner.as_ref()).await;
    ctrl_c.abort();
    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let article = match outcome {
        Ok(article) => article,
        Err(e) => {
            if let ForgeError::MalformedResponse { raw, .. } = &e {
                tracing::debug!("Raw model output:\n{}", raw);
            }
            return Err(e);
        }
    };
    tracing::debug!("Received {} bytes of model output", output.received());

    let saved = match history {
        Some(store) => match store.add(options.article.clone(), &provider, article.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                if is_text {
                    ui::warning(&format!("Failed to save history: {}", e), colored);
                }
                None
            }
        },
        None => None,
    };
    let id = saved.as_ref().map(|item| item.id.as_str());

    match options.format {
        OutputFormat::Json => json::output_json(GenerateJson {
            id,
            provider: &provider,
            model: &model,
            article: &article,
        })?,
        OutputFormat::Markdown | OutputFormat::Html => {
            println!("{}", export::render(&article, None, options.format)?)
        }
        OutputFormat::Text => {
            ui::step("2/3", "Article ready", colored);
            println!();
            ui::print_article(&article, None, colored);
            println!();
            match id {
                Some(id) => ui::success(
                    &format!("Saved to history as {} (article-forge export {})", id, id),
                    colored,
                ),
                None => ui::step("3/3", "Not saved to history", colored),
            }
        }
    }

    Ok(())
}

/// Resolves CLI options and settings into a generation request.
///
/// Precedence: CLI flag > provider section > built-in default.
pub fn build_request(options: &GenerateOptions<'_>, config: &AppConfig) -> Result<GenerationRequest> {
    let name = options.provider_name(config);
    let provider_config = config.provider(name)?;
    let kind = provider_config.resolve_kind(name)?;

    let model = options
        .model_override
        .map(str::to_string)
        .unwrap_or_else(|| provider_config.model.clone());
    let proxy = options
        .proxy_override
        .map(str::to_string)
        .or_else(|| config.proxy.effective_url());

    let prompt = build_article_prompt(&options.article, config.llm.prompt_template.as_deref());
    let api_key = provider_config.api_key.clone().unwrap_or_default();

    tracing::debug!(
        "Provider '{}' ({}), key {}, model '{}'",
        name,
        kind,
        mask_api_key(&api_key),
        model
    );

    Ok(GenerationRequest::new(kind.to_string(), api_key, prompt)
        .with_model(kind.resolve_model(&model))
        .with_proxy(proxy)
        .with_proxy_mode(config.proxy.mode)
        .with_endpoint(provider_config.endpoint))
}
