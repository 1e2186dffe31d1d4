use anyhow::Context;
use clap::Parser;
use fridge_chef::cache::{CacheFile, CachedInference};
use fridge_chef::cli::{Cli, Commands};
use fridge_chef::config::Config;
use fridge_chef::inference::{GeminiClient, Inference};
use fridge_chef::session::Session;
use fridge_chef::{acquire, render, repl};
use fridge_chef_common::{AnalysisResult, Intent, Phase};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "fridge_chef=debug" } else { "fridge_chef=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_inference(config: &Config, use_cache: bool) -> anyhow::Result<Arc<dyn Inference>> {
    let client = GeminiClient::from_config(config)?;
    info!(model = client.model(), use_cache, "inference client ready");

    if use_cache {
        let dir = CacheFile::default_dir()?;
        Ok(Arc::new(CachedInference::new(client, dir)))
    } else {
        Ok(Arc::new(client))
    }
}

/// 結果JSONを標準出力に流すときは案内を標準エラーへ
fn note(json_on_stdout: bool, line: impl std::fmt::Display) {
    if json_on_stdout {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

/// 解析結果JSONをファイルか `stdout` に書く（`stdout` にはJSONだけ）
fn write_analysis(result: &AnalysisResult, output: Option<&Path>, stdout: &mut impl Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            writeln!(stdout, "✔ Saved result: {}", path.display())?;
        }
        None => writeln!(stdout, "{}", json)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Cook { image, use_cache } => {
            println!("🍳 fridge-chef - What's for dinner?\n");

            let inference = build_inference(&config, use_cache)?;
            let mut session = Session::new(inference);
            repl::run(&mut session, image, config.max_image_size).await?;
        }

        Commands::Analyze { image, output, use_cache } => {
            let json_on_stdout = output.is_none();
            note(json_on_stdout, "🍳 fridge-chef - analyze\n");

            let payload = acquire::acquire(&image, config.max_image_size)
                .await
                .with_context(|| format!("could not use {}", image))?;
            note(json_on_stdout, format!("✔ Loaded {} ({} bytes)", image, payload.len()));

            let inference = build_inference(&config, use_cache)?;
            let mut session = Session::new(inference);
            session.dispatch(Intent::SelectImage(payload));
            session.settle().await;

            let state = session.state();
            if state.phase() == Phase::Errored {
                anyhow::bail!("{}", state.error().unwrap_or_default());
            }
            let result = state.result().context("analysis produced no result")?;

            note(json_on_stdout, format!("{}\n", render::render_status(state)));
            write_analysis(result, output.as_deref(), &mut std::io::stdout().lock())?;
        }

        Commands::Config { set_api_key, set_model, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key saved");
            }

            if let Some(model) = set_model {
                config.set_model(model)?;
                println!("✔ Model saved");
            }

            if show {
                println!("Settings:");
                println!("  File: {}", Config::config_path()?.display());
                println!("  Model: {}", config.model);
                println!("  Endpoint: {}", config.base_url);
                println!("  Max image size: {}px", config.max_image_size);
                match config.timeout_seconds {
                    Some(secs) => println!("  Timeout: {}s", secs),
                    None => println!("  Timeout: none"),
                }
                println!(
                    "  API key: {}",
                    if config.get_api_key().is_some() { "set" } else { "not set" }
                );
            }
        }

        Commands::Cache { clear, info } => {
            let dir = CacheFile::default_dir()?;
            let cache_path = CacheFile::cache_path(&dir);

            if info || !clear {
                if cache_path.exists() {
                    let cache = CacheFile::load(&dir);
                    println!("Cache:");
                    println!("  Path: {}", cache_path.display());
                    println!("  Entries: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  Size: {} bytes", meta.len());
                    }
                } else {
                    println!("No cache file: {}", cache_path.display());
                }
            }

            if clear {
                match CacheFile::clear(&dir)? {
                    true => println!("✔ Cache removed: {}", cache_path.display()),
                    false => println!("No cache file to remove"),
                }
            }
        }
    }

    Ok(())
}
