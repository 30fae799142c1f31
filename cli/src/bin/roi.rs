use clap::{Parser, Subcommand};
use cli::RoiConfig;
use color_eyre::eyre::{eyre, Result};
use roi::{Roi, RoiDocument};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Manage regions of interest stored as PNG masks", long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// ROI directory, overrides the configuration file
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the names of all ROIs in the directory
    List,
    /// Show a single ROI
    Show {
        name: String,
        /// Print the full JSON document instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Add an ROI described by a JSON document
    Add {
        /// Path to the JSON document
        #[arg(short, long)]
        from: PathBuf,
    },
    /// Remove an ROI from the directory
    Remove { name: String },
    /// Import any image as a mask, saving it as an ROI
    Import {
        /// Image to read; every non-background pixel becomes part of the ROI
        image: PathBuf,
        /// ROI name (defaults to the image file stem)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Print the JSON schema of ROI documents
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    // stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RoiConfig::resolve(cli.config.as_deref(), cli.dir)?;
    info!("ROI directory: {}", config.directory.display());

    match cli.command {
        Commands::List => list(&config)?,
        Commands::Show { name, json } => show(&config, &name, json)?,
        Commands::Add { from } => add(&config, &from)?,
        Commands::Remove { name } => remove(&config, &name)?,
        Commands::Import { image, name } => import(&config, &image, name)?,
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&RoiDocument::schema())?);
        }
    }

    Ok(())
}

fn list(config: &RoiConfig) -> Result<()> {
    for name in config.store()?.list_names()? {
        println!("{}", name);
    }
    Ok(())
}

fn show(config: &RoiConfig, name: &str, json: bool) -> Result<()> {
    let roi = config
        .store()?
        .load_one(name)?
        .ok_or_else(|| eyre!("No ROI named '{}' in {}", name, config.directory.display()))?;

    if json {
        println!("{}", roi.to_json_string()?);
    } else {
        println!("{}: {}x{}, {} pixels", roi.name(), roi.width(), roi.height(), roi.len());
    }
    Ok(())
}

fn add(config: &RoiConfig, document: &Path) -> Result<()> {
    let roi = Roi::from_json_file(document)?;
    let name = roi.name().to_string();
    let indexed = cli::add_roi(config, roi)?;
    info!("✅ Added ROI '{}' ({} ROIs indexed)", name, indexed);
    Ok(())
}

fn remove(config: &RoiConfig, name: &str) -> Result<()> {
    let mut index = config.index()?;
    let existed = index.store().exists(name)?;
    index.remove(name)?;

    if existed {
        info!("✅ Removed ROI '{}'", name);
    } else {
        warn!("No ROI named '{}', nothing removed", name);
    }
    Ok(())
}

fn import(config: &RoiConfig, image_path: &Path, name: Option<String>) -> Result<()> {
    let (roi, path) = cli::import_image(config, image_path, name)?;

    info!(
        "✅ Imported {} as '{}' ({}x{}, {} pixels) -> {}",
        image_path.display(),
        roi.name(),
        roi.width(),
        roi.height(),
        roi.len(),
        path.display()
    );
    Ok(())
}
