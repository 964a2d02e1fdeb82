//! # article-forge
//!
//! AI 文章生成工具：输入关键词，输出 5 个带评分的标题、6 个标签和 Markdown 正文。
//!
//! ## 功能
//! - **多 Provider 支持**：Qwen (DashScope)、Gemini、ChatGPT (OpenAI 及兼容网关)
//! - **流式输出**：实时显示生成过程，可随时取消（Ctrl-C）
//! - **结构校验**：模型输出必须符合文章 JSON 结构，否则报告具体原因
//! - **代理**：前缀代理（`<proxy>/<vendor URL>`）或 HTTP/SOCKS 转发代理
//! - **历史记录**：本地保存生成结果，支持选择标题和导出
//!
//! ## 快速开始
//!
//! ### 作为 CLI 使用
//! ```bash
//! article-forge generate "Rust 所有权" --length short --type tutorial
//! article-forge history list
//! article-forge export <ID> --format markdown -o article.md
//! ```
//!
//! ### 作为库使用
//! ```no_run
//! use article_forge::config::NetworkConfig;
//! use article_forge::llm::prompt::{build_article_prompt, ArticleOptions};
//! use article_forge::llm::{GenerationEvent, GenerationRequest, Generator};
//!
//! # async fn example() {
//! let prompt = build_article_prompt(&ArticleOptions::new("rust async"), None);
//! let request = GenerationRequest::new("chatgpt", "sk-...", prompt).with_model("gpt-4o-mini");
//!
//! let generator = Generator::new(&NetworkConfig::default());
//! let mut handle = generator.generate_stream(request);
//! while let Some(event) = handle.next_event().await {
//!     match event {
//!         GenerationEvent::Fragment(text) => print!("{}", text),
//!         GenerationEvent::Complete(article) => println!("\n{}", article.titles[0].title),
//!         GenerationEvent::Error(e) => eprintln!("{}", e),
//!     }
//! }
//! # }
//! ```
//!
//! ## 核心模块
//! - [`llm`] - 生成编排、provider 适配、流解码和文章校验
//! - [`config`] - 配置管理
//! - [`history`] - 本地历史记录
//! - [`export`] - 导出格式
//! - [`commands`] - CLI 命令实现
//! - [`error`] - 统一错误类型
//! - [`ui`] - 终端输出工具
//!
//! ## 配置
//! 配置文件位置：
//! - Linux: `~/.config/article-forge/config.toml`
//! - macOS: `~/Library/Application Support/article-forge/config.toml`
//! - Windows: `%APPDATA%\article-forge\config\config.toml`
//!
//! 示例配置：
//! ```toml
//! [llm]
//! default_provider = "qwen"
//!
//! [llm.providers.qwen]
//! api_key = "sk-..."
//! model = "qwen-plus"
//!
//! [proxy]
//! enabled = true
//! url = "http://127.0.0.1:8080"
//! mode = "prefix"
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod llm;
pub mod ui;
