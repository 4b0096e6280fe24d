use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use textcensor::{
    ConfigManager, FileLibraryFetcher, TextCensor, Verdict, DEFAULT_LIBRARY_TTL,
};

/// textcensor: 敏感词模糊匹配命令行工具
#[derive(Parser)]
#[command(name = "textcensor", version, about)]
struct Cli {
    /// 使用本地 JSON 词库文件，不走网络
    #[arg(long, global = true, value_name = "FILE")]
    library: Option<PathBuf>,

    /// 后端基础地址（默认 https://nkuwiki.com）
    #[arg(long, global = true, value_name = "URL")]
    api: Option<String>,

    /// 以 JSON 输出
    #[arg(long, global = true)]
    json: bool,

    /// 输出调试日志
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 检测文本是否包含敏感内容（有风险时退出码为 1）
    Check {
        text: String,
    },

    /// 对原文命中的敏感词打码
    Filter {
        text: String,

        /// 掩码字符
        #[arg(long, default_value = "*")]
        mask: String,
    },

    /// 列出词库分类，或指定分类下的敏感词
    Words {
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "textcensor=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let censor = build_censor(&cli)?;

    match cli.command {
        Commands::Check { text } => {
            let verdict = censor.check(&text).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                print_verdict(&verdict);
            }
            if verdict.risk {
                return Ok(ExitCode::from(1));
            }
        }

        Commands::Filter { text, mask } => {
            let filtered = censor.filter(&text, &mask).await;
            if cli.json {
                println!("{}", serde_json::json!({ "text": filtered }));
            } else {
                println!("{filtered}");
            }
        }

        Commands::Words { category } => match category {
            Some(category) => {
                let words = censor.category_words(&category).await;
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&words)?);
                } else if words.is_empty() {
                    println!("分类 {category} 不存在或为空");
                } else {
                    for word in words {
                        println!("{word}");
                    }
                }
            }
            None => {
                let mut summary = Vec::new();
                for name in censor.categories().await {
                    let count = censor.category_words(&name).await.len();
                    summary.push((name, count));
                }
                if cli.json {
                    let map: serde_json::Map<String, serde_json::Value> = summary
                        .into_iter()
                        .map(|(name, count)| (name, count.into()))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&map)?);
                } else {
                    for (name, count) in summary {
                        println!("{name}\t{count}");
                    }
                }
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn build_censor(cli: &Cli) -> Result<TextCensor> {
    if let Some(path) = &cli.library {
        debug!("使用本地词库文件：{}", path.display());
        let fetcher = Arc::new(FileLibraryFetcher::new(path.clone()));
        return Ok(TextCensor::with_fetcher(fetcher, DEFAULT_LIBRARY_TTL));
    }

    let mut builder = ConfigManager::custom();
    if let Some(api) = &cli.api {
        builder = builder.api_base_url(api);
    }
    Ok(TextCensor::new(builder.build())?)
}

fn print_verdict(verdict: &Verdict) {
    if !verdict.risk {
        println!("✅ 未发现敏感内容");
        return;
    }

    println!("⚠️  {}", verdict.reason.as_deref().unwrap_or_default());
    for m in &verdict.matches {
        println!(
            "  - [{:?}] {:?} -> {} ({}，风险{})",
            m.kind, m.matched_span, m.source_word, m.category, m.risk
        );
    }
}
