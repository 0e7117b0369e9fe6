//! Exam generator: turns documents into multiple-choice, short-answer and true/false questions

use clap::Parser;
use colored::Colorize;
use exam_generator::cli::{Cli, Commands, ConfigAction};
use exam_generator::config::Config;
use exam_generator::error::{ExamGeneratorError, Result};
use exam_generator::input::{TesseractOcr, UploadedDocument};
use exam_generator::output::{
    formatter_for, parse_output_format, use_colors, ExamReport, OutputFormat,
};
use exam_generator::processing::{ExamPipeline, RuleBasedSentenceModel, SentenceModel};
use exam_generator::server::ExamServer;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let colors = use_colors(cli.no_color);
    if !colors {
        colored::control::set_override(false);
    }

    // Execute command
    if let Err(e) = run_command(cli.command, config, config_path, colors).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn build_pipeline(config: &Config) -> Result<ExamPipeline> {
    let ocr = TesseractOcr::from_config(&config.ocr);
    if !ocr.is_available() {
        warn!(
            "OCR binary '{}' not found; PDFs with embedded images will fail",
            config.ocr.tesseract_path.display()
        );
    }

    let model: Arc<dyn SentenceModel> = Arc::new(RuleBasedSentenceModel::new(
        &config.segmentation.extra_abbreviations,
    )?);
    ExamPipeline::from_config(config, Arc::new(ocr), model)
}

async fn run_command(
    command: Commands,
    mut config: Config,
    config_path: PathBuf,
    colors: bool,
) -> Result<()> {
    match command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let pipeline = Arc::new(build_pipeline(&config)?);
            let server = ExamServer::new(config.server.clone(), pipeline);
            info!("Exam generator listening on {}", server.address());
            server.start().await?;
        }

        Commands::Generate { file, format, seed } => {
            let output_format = parse_output_format(&format)?;
            let document = UploadedDocument::from_path(&file).await?;
            let pipeline = build_pipeline(&config)?;

            if output_format == OutputFormat::Console {
                println!("{} {}", "📄 Processing".bold(), file.display());
            }

            let source = document.filename().to_string();
            let questions = tokio::task::spawn_blocking(move || {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                pipeline.generate_exam(&document, &mut rng)
            })
            .await
            .map_err(|e| ExamGeneratorError::Processing(format!("Generation task failed: {}", e)))??;

            let report = ExamReport::new(source, questions);
            let formatter = formatter_for(output_format, colors);
            println!("{}", formatter.format_exam(&report)?);
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    ExamGeneratorError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(&config_path)?;
                println!("{}", "✅ Configuration reset successfully!".green());
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}
