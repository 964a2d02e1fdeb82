use article_forge::*;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use error::ForgeError;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    human_panic::setup_panic!();

    // reqwest 使用 rustls-no-provider，需要在任何请求前安装 ring provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    // 根据 verbose 标志设置日志级别
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    // 日志写 stderr，stdout 只输出结果
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .init();

    // generate 需要完整配置；其他命令在配置损坏时退回默认值
    let config = match &cli.command {
        Commands::Generate { .. } => config::load_config(),
        _ => Ok(config::load_config().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default configuration: {}", e);
            config::AppConfig::default()
        })),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => exit_with_error(&e, true),
    };
    let colored = config.ui.colored;

    let rt = Runtime::new()?;

    rt.block_on(async {
        match cli.command {
            Commands::Generate {
                ref keywords,
                length,
                style,
                article_type,
                ref language,
                ref provider,
                ref model,
                ref proxy,
                no_history,
                ref format,
                json,
            } => {
                let args = commands::GenerateArgs {
                    keywords,
                    length,
                    style,
                    article_type,
                    language,
                    provider: provider.as_deref(),
                    model: model.as_deref(),
                    proxy: proxy.as_deref(),
                    no_history,
                    format,
                    json,
                };
                let options = commands::GenerateOptions::from_cli(args, cli.verbose);
                if let Err(e) = commands::generate::run(&options, &config).await {
                    // JSON 模式下错误已经以 JSON 输出
                    if options.format.is_json() {
                        std::process::exit(1);
                    }
                    if matches!(e, ForgeError::Cancelled) {
                        ui::warning("Generation cancelled", colored);
                        std::process::exit(130);
                    }
                    exit_with_error(&e, colored);
                }
            }
            Commands::History { action, json } => {
                if let Err(e) = commands::history::run(action, json, &config) {
                    if json {
                        std::process::exit(1);
                    }
                    exit_with_error(&e, colored);
                }
            }
            Commands::Export {
                ref id,
                ref format,
                title,
                ref output,
            } => {
                if let Err(e) =
                    commands::export::run(id, format, title, output.as_deref(), &config)
                {
                    exit_with_error(&e, colored);
                }
            }
            Commands::Config { action } => {
                if let Err(e) = commands::config::run(action, colored) {
                    exit_with_error(&e, colored);
                }
            }
        }
        Ok(())
    })
}

/// 输出错误和建议后退出
fn exit_with_error(e: &ForgeError, colored: bool) -> ! {
    ui::error(&e.to_string(), colored);
    if let Some(suggestion) = e.suggestion() {
        eprintln!();
        eprintln!("{}", ui::info(suggestion, colored));
    }
    std::process::exit(1);
}
