use clap::Parser;
use incident_ai_common::categorize_resolution;
use incident_ai_rust::{analyzer, cli, config, error, pipeline};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // .env があれば読み込む（GEMINI_API_KEY 用）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { file, model, dry_run } => {
            let path = config.resolve_input(file)?;
            println!("Iniciando la ejecución ({})...", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

            let outcome = if dry_run {
                println!("Modo simulación: no se llama a Gemini ni se modifica el archivo.");
                pipeline::classify_only(&path)
            } else {
                let mut config = config;
                if let Some(model) = model {
                    config.model = model;
                }
                analyze(&config, &path).await
            };

            match outcome {
                Ok(summary) => pipeline::print_summary(&summary),
                Err(e) => {
                    eprintln!("{}", pipeline::fatal_message(&e, &path));
                    std::process::exit(1);
                }
            }
        }

        Commands::Classify { text } => {
            println!("{}", categorize_resolution(&text));
        }

        Commands::Config { set_api_key, set_input, set_model, show } => {
            let mut config = config;
            let changed = set_api_key.is_some() || set_input.is_some() || set_model.is_some();

            if let Some(key) = set_api_key {
                config.api_key = Some(key);
                println!("✔ Clave de API configurada");
            }
            if let Some(input) = set_input {
                println!("✔ Archivo de entrada: {}", input.display());
                config.input_path = Some(input);
            }
            if let Some(model) = set_model {
                println!("✔ Modelo: {}", model);
                config.model = model;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("Configuración ({}):", Config::config_path()?.display());
                println!("  Modelo: {}", config.model);
                println!(
                    "  Archivo de entrada: {}",
                    config
                        .input_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(no definido)".into())
                );
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Intervalo de progreso: {}", config.progress_interval);
                println!(
                    "  Clave de API: {}",
                    if config.get_api_key().is_ok() { "configurada" } else { "no configurada" }
                );
            }
        }
    }

    Ok(())
}

async fn analyze(config: &Config, path: &Path) -> Result<pipeline::RunSummary> {
    let client = analyzer::GeminiClient::from_config(config)?;
    tracing::debug!(model = client.model(), "using Gemini model");

    let options = pipeline::RunOptions {
        progress_interval: config.progress_interval,
    };
    pipeline::run_analysis(path, &client, &options).await
}

/// ログ初期化（RUST_LOG 優先、--verbose で debug）
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "incident_ai_rust=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
