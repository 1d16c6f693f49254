mod display;
mod setup;

use std::path::PathBuf;

use anyhow::Context;
use arxivist_ai::Service;
use arxivist_core::ServiceConfig;
use arxivist_core::config::{DEFAULT_BUNDLE_URL, DEFAULT_K};
use clap::{Parser, Subcommand};

/// Subject classification and title recommendation for arXiv abstracts.
#[derive(Parser, Debug)]
#[command(name = "arxivist", version, about)]
struct Cli {
    /// Asset directory [env: MODELS_DIR, default: models]
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Local model bundle to provision from [env: MODELS_ZIP_PATH]
    #[arg(long, global = true)]
    models_zip: Option<PathBuf>,

    /// Encoder cache root [env: ENCODER_DIR, default: models/encoders]
    #[arg(long, global = true)]
    encoder_dir: Option<PathBuf>,

    /// Sentence encoder name [env: ENCODER_MODEL, default: all-MiniLM-L6-v2]
    #[arg(long = "encoder", global = true)]
    encoder_model: Option<String>,

    /// Never download a missing encoder
    #[arg(long, global = true)]
    offline: bool,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report which model assets are on disk.
    Health,
    /// Predict the arXiv subjects of a passage.
    Classify {
        text: String,
        #[arg(long, default_value_t = DEFAULT_K)]
        top_k: usize,
    },
    /// Recommend corpus titles similar to a query.
    Recommend {
        query: String,
        #[arg(long, default_value_t = DEFAULT_K)]
        k: usize,
    },
    /// Download the model bundle and encoder files.
    Fetch {
        #[arg(long, default_value = DEFAULT_BUNDLE_URL)]
        url: String,
        /// Re-download encoder files even when present
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Environment first, flags on top.
    fn config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::from_env();
        if let Some(dir) = &self.models_dir {
            config.models_dir = dir.clone();
        }
        if let Some(zip) = &self.models_zip {
            config.models_zip = Some(zip.clone());
        }
        if let Some(dir) = &self.encoder_dir {
            config.encoder_dir = dir.clone();
        }
        if let Some(name) = &self.encoder_model {
            config.encoder_model = name.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("arxivist v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Command::Health => {
            let health = Service::new(config).health_status();
            display::print_health(&health, cli.json)?;
        }
        Command::Classify { text, top_k } => {
            let service = setup::start(config, cli.offline).await?;
            let predictions = service
                .classify(&text, top_k)
                .context("classifying passage")?;
            display::print_predictions(&predictions, cli.json)?;
        }
        Command::Recommend { query, k } => {
            let service = setup::start(config, cli.offline).await?;
            let recommendations = service
                .recommend(&query, k)
                .context("recommending titles")?;
            display::print_recommendations(&recommendations, cli.json)?;
        }
        Command::Fetch { url, force } => {
            setup::fetch(&config, &url, force).await?;
            let health = Service::new(config).health_status();
            display::print_health(&health, cli.json)?;
        }
    }

    Ok(())
}
