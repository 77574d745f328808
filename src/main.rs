//! Plant Disease Diagnosis Server
//!
//! Loads the class registry and the trained model once at startup, then
//! serves diagnoses over HTTP. Startup fails if either cannot be loaded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use plant_diagnosis::server::{self, AppState};
use plant_diagnosis::startup;
use plant_diagnosis::utils::logging::{init_logging, LogConfig, LogLevel};
use plant_diagnosis::{ClassRegistry, Classifier, DiagnosisPipeline, Preprocessor, ServerConfig};

/// Plant disease diagnosis from leaf images
#[derive(Parser, Debug)]
#[command(name = "plant-diagnosis")]
#[command(author = "Warre Snaet")]
#[command(version)]
#[command(about = "HTTP API for plant disease diagnosis with Burn", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PLANT_DIAGNOSIS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Host to bind to
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Trained model artifact
    #[arg(long, env = "PLANT_DIAGNOSIS_MODEL")]
    model: Option<PathBuf>,

    /// Alternate model artifact tried if the primary fails to load
    #[arg(long, env = "PLANT_DIAGNOSIS_FALLBACK_MODEL")]
    fallback_model: Option<PathBuf>,

    /// Dataset split whose sub-directories name the classes
    #[arg(long, env = "PLANT_DIAGNOSIS_CLASSES_DIR")]
    classes_dir: Option<PathBuf>,

    /// Newline-separated class list (overrides --classes-dir)
    #[arg(long, env = "PLANT_DIAGNOSIS_CLASSES_FILE")]
    classes_file: Option<PathBuf>,

    /// Model input size (square)
    #[arg(long)]
    image_size: Option<u32>,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve,

    /// Diagnose a single image file and print the result as JSON
    Diagnose {
        /// Path to the image
        #[arg(short, long)]
        image: PathBuf,
    },

    /// Print the resolved class registry
    Classes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default().with_level(config.log_level)
    };
    init_logging(&log_config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(config).await,
        Commands::Diagnose { image } => cmd_diagnose(&config, &image),
        Commands::Classes => cmd_classes(&config),
    }
}

/// Defaults, then the TOML file, then flags and environment
fn build_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    if let Some(fallback) = &cli.fallback_model {
        config.fallback_model_path = Some(fallback.clone());
    }
    if let Some(dir) = &cli.classes_dir {
        config.classes_dir = Some(dir.clone());
    }
    if let Some(file) = &cli.classes_file {
        config.classes_file = Some(file.clone());
    }
    if let Some(size) = cli.image_size {
        config.image_size = size;
    }
    if cli.verbose {
        config.log_level = LogLevel::Debug;
    }

    config.validate()?;
    Ok(config)
}

fn load_registry(config: &ServerConfig) -> Result<ClassRegistry> {
    startup::load_registry(config).context("Failed to load class names")
}

fn load_classifier(
    config: &ServerConfig,
    registry: &ClassRegistry,
) -> Result<Arc<dyn Classifier>> {
    startup::load_classifier(config, registry).context("Failed to load model")
}

async fn cmd_serve(config: ServerConfig) -> Result<()> {
    info!("Plant Disease Diagnosis Server v{}", plant_diagnosis::VERSION);
    info!("Configuration:");
    info!("  Model:        {:?}", config.model_path);
    info!("  Fallback:     {:?}", config.fallback_model_path);
    info!("  Classes dir:  {:?}", config.classes_dir);
    info!("  Classes file: {:?}", config.classes_file);
    info!("  Image size:   {}", config.image_size);
    info!("  Origins:      {:?}", config.allowed_origins);

    let registry = load_registry(&config)?;
    let classifier = load_classifier(&config, &registry)?;
    info!("Model loaded with {} classes", registry.len());

    let state = Arc::new(AppState::new(
        Some(classifier),
        registry,
        config.preprocess_config(),
    ));

    server::serve(state, &config).await?;
    Ok(())
}

fn cmd_diagnose(config: &ServerConfig, image: &Path) -> Result<()> {
    let registry = load_registry(config)?;
    let classifier = load_classifier(config, &registry)?;

    let bytes = std::fs::read(image).with_context(|| format!("Failed to read {:?}", image))?;
    let pipeline = DiagnosisPipeline::new(
        Preprocessor::new(config.preprocess_config()),
        classifier,
        Arc::new(registry),
    );

    let diagnosis = pipeline.diagnose(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    Ok(())
}

fn cmd_classes(config: &ServerConfig) -> Result<()> {
    let registry = load_registry(config)?;
    for (index, name) in registry.names().iter().enumerate() {
        println!("{:>3}  {}", index, name);
    }
    Ok(())
}
