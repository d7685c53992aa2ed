// agrisense/node/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use agrisense_api::ApiServer;
use agrisense_inference::{FeatureSchema, InferenceDispatcher, CROP_SCHEMA, FERTILIZER_SCHEMA};
use agrisense_models::{ModelArtifact, ModelId, ModelRegistry};
use agrisense_soil::SoilDataService;

mod config;
pub mod logging;

use config::NodeConfig;

#[derive(Parser)]
#[command(name = "agrisense")]
#[command(about = "Crop suitability and fertilizer recommendation service")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP listen address (e.g., 0.0.0.0:8000)
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Crop classifier artifact
    #[arg(long, value_name = "PATH")]
    classifier: Option<PathBuf>,

    /// Fertilizer recommender artifact
    #[arg(long, value_name = "PATH")]
    fertilizer: Option<PathBuf>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the models and serve HTTP (default)
    Serve,

    /// Load and validate both artifacts, then exit
    Check,

    /// Print the input and output contract of an artifact
    Inspect {
        /// Artifact file
        path: PathBuf,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Uses LOG_FORMAT env var (json, pretty, compact) and RUST_LOG for levels
    let log_config = logging::LogConfig::from_env();
    if let Err(e) = logging::init_logging(&log_config) {
        eprintln!("Warning: Failed to initialize structured logging: {}", e);
    }

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::InitConfig { path }) => {
            NodeConfig::default().save(path)?;
            println!("Wrote default configuration to {}", path.display());
            return Ok(());
        }
        Some(Commands::Inspect { path }) => return inspect(path),
        _ => {}
    }

    let config = load_config(&cli, std::env::var("PORT").ok().as_deref())?;

    match cli.command {
        Some(Commands::Check) => check(&config),
        _ => serve(config).await,
    }
}

/// Config file, then `PORT`, then CLI flags
fn load_config(cli: &Cli, port: Option<&str>) -> Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => NodeConfig::default(),
    };
    config.apply_port(port).map_err(|e| anyhow::anyhow!(e))?;

    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }
    if let Some(path) = &cli.classifier {
        config.models.classifier_path = path.clone();
    }
    if let Some(path) = &cli.fertilizer {
        config.models.fertilizer_path = path.clone();
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Load both artifacts and bind them to their request schemas. Any failure is fatal.
fn load_dispatcher(config: &NodeConfig) -> Result<InferenceDispatcher> {
    if let Some(dataset) = &config.models.dataset_path {
        if !dataset.exists() {
            warn!("Dataset {} not found; continuing without it", dataset.display());
        }
    }

    let registry = ModelRegistry::initialize(&config.models.registry_config()).map_err(|e| {
        error!("Failed to load model artifacts: {}", e);
        e
    })?;
    let dispatcher = InferenceDispatcher::new(Arc::new(registry)).map_err(|e| {
        error!("Model artifact does not match its request schema: {}", e);
        e
    })?;

    Ok(dispatcher)
}

fn check(config: &NodeConfig) -> Result<()> {
    let dispatcher = load_dispatcher(config)?;
    for (id, model) in dispatcher.registry().models() {
        let info = model.info();
        println!(
            "{:<11} ok  {} ({} features, {} classes)",
            id.as_str(),
            info.kind,
            info.n_features,
            info.classes.len()
        );
    }
    Ok(())
}

fn schema_for(artifact: &ModelArtifact) -> Option<&'static FeatureSchema> {
    let declared = artifact
        .model_id
        .as_deref()
        .and_then(|id| id.parse::<ModelId>().ok());
    [&CROP_SCHEMA, &FERTILIZER_SCHEMA].into_iter().find(|schema| match declared {
        Some(id) => schema.model == id,
        None => schema.len() == artifact.feature_names.len(),
    })
}

fn inspect(path: &Path) -> Result<()> {
    let artifact = ModelArtifact::load(path)?;
    let info = artifact.info();

    println!("Artifact:    {}", path.display());
    println!("Format:      v{}", artifact.format_version);
    println!("Model id:    {}", artifact.model_id.as_deref().unwrap_or("(undeclared)"));
    if let Some(description) = &info.description {
        println!("Description: {}", description);
    }
    println!("Estimator:   {}", info.kind);
    println!("Features:    {}", artifact.feature_names.join(", "));
    println!("Classes:     {}", artifact.classes.join(", "));

    match schema_for(&artifact) {
        Some(schema) => {
            let expected = schema.names();
            let matches = expected.len() == artifact.feature_names.len()
                && expected
                    .iter()
                    .zip(&artifact.feature_names)
                    .all(|(a, b)| a.eq_ignore_ascii_case(b));
            if matches {
                println!("Request:     matches the {} request fields", schema.model);
            } else {
                println!(
                    "Request:     MISMATCH, {} requests send [{}]",
                    schema.model,
                    expected.join(", ")
                );
            }
        }
        None => println!("Request:     no request schema takes {} features", info.n_features),
    }

    Ok(())
}

async fn serve(config: NodeConfig) -> Result<()> {
    let dispatcher = load_dispatcher(&config)?;
    info!(
        "Loaded {} models; serving on {}",
        dispatcher.registry().len(),
        config.server.listen_addr
    );

    let soil = SoilDataService::new(config.soil.clone());
    let server =
        ApiServer::new(Arc::new(dispatcher), Arc::new(soil)).with_cors(config.server.cors);

    server.start(config.server.listen_addr).await?;
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../artifacts")
    }

    fn bundled_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.models.classifier_path = bundled().join("crop_classifier.json");
        config.models.fertilizer_path = bundled().join("fertilizer_recommender.json");
        config
    }

    #[test]
    fn test_bundled_artifacts_load() {
        let dispatcher = load_dispatcher(&bundled_config()).unwrap();
        assert_eq!(dispatcher.registry().len(), 2);
        assert!(check(&bundled_config()).is_ok());
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let mut config = bundled_config();
        config.models.fertilizer_path = bundled().join("does_not_exist.json");

        let err = load_dispatcher(&config).unwrap_err();
        assert!(err.to_string().contains("does_not_exist.json"));
    }

    #[test]
    fn test_swapped_artifacts_are_fatal() {
        let mut config = bundled_config();
        std::mem::swap(
            &mut config.models.classifier_path,
            &mut config.models.fertilizer_path,
        );
        assert!(load_dispatcher(&config).is_err());
    }

    #[test]
    fn test_schema_lookup_for_inspect() {
        let crop = ModelArtifact::load(&bundled().join("crop_classifier.json")).unwrap();
        assert_eq!(schema_for(&crop).map(|s| s.model), Some(ModelId::Classifier));

        let fertilizer =
            ModelArtifact::load(&bundled().join("fertilizer_recommender.json")).unwrap();
        assert_eq!(schema_for(&fertilizer).map(|s| s.model), Some(ModelId::Fertilizer));
        assert!(inspect(&bundled().join("fertilizer_recommender.json")).is_ok());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "agrisense",
            "--listen",
            "127.0.0.1:9000",
            "--classifier",
            "/tmp/crop.json",
            "check",
        ]);
        let config = load_config(&cli, None).unwrap();
        assert_eq!(config.server.listen_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.models.classifier_path, PathBuf::from("/tmp/crop.json"));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn test_listen_flag_wins_over_port_env() {
        let cli = Cli::parse_from(["agrisense", "--listen", "127.0.0.1:9000"]);
        let config = load_config(&cli, Some("7000")).unwrap();
        assert_eq!(config.server.listen_addr.to_string(), "127.0.0.1:9000");

        let cli = Cli::parse_from(["agrisense"]);
        let config = load_config(&cli, Some("7000")).unwrap();
        assert_eq!(config.server.listen_addr.to_string(), "0.0.0.0:7000");

        assert!(load_config(&cli, Some("not-a-port")).is_err());
    }
}
