use clap::Parser;
use config::{Config as ConfigBuilder, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::camera::{DEFAULT_MAGNIFICATION, DEFAULT_MOVE_SPEED, DEFAULT_PROJECTION_DISTANCE};

const DEFAULT_SCAN_DEPTH: usize = 3;
const DEFAULT_SCAN_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about = "Explore a directory as an interactive 3D point cloud")]
pub struct CliArgs {
    /// Directory to scan and explore (read/write). Without it, press Space
    /// in the entry screen for the bundled sample tree.
    pub directory: Option<PathBuf>,

    /// Path to a custom configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Camera translation per frame for held movement keys
    #[arg(long)]
    pub move_speed: Option<f32>,

    /// Focal distance of the perspective projection
    #[arg(long)]
    pub projection_distance: Option<f32>,

    /// Screen-space magnification of projected coordinates
    #[arg(long)]
    pub magnification: Option<f32>,

    /// Maximum directory depth read from the real filesystem
    #[arg(long)]
    pub scan_depth: Option<usize>,

    /// Maximum number of entries read from the real filesystem
    #[arg(long)]
    pub scan_limit: Option<usize>,

    /// Print the resolved configuration and exit
    #[arg(long)]
    pub debug_config: bool,
}

/// Serde struct for the config file / environment layer; optional fields so
/// the sources can be layered (defaults -> file -> env -> args).
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FileConfig {
    move_speed: Option<f32>,
    projection_distance: Option<f32>,
    magnification: Option<f32>,
    scan_depth: Option<usize>,
    scan_limit: Option<usize>,
}

/// Resolved configuration; every field has a value.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory: Option<PathBuf>,
    pub move_speed: f32,
    pub projection_distance: f32,
    pub magnification: f32,
    pub scan_depth: usize,
    pub scan_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            directory: None,
            move_speed: DEFAULT_MOVE_SPEED,
            projection_distance: DEFAULT_PROJECTION_DISTANCE,
            magnification: DEFAULT_MAGNIFICATION,
            scan_depth: DEFAULT_SCAN_DEPTH,
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }
}

pub fn load_config(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    let config_file_path = args.config.clone().or_else(|| {
        ProjectDirs::from("", "", "filescape").map(|dirs| dirs.config_dir().join("config.toml"))
    });

    let mut builder = ConfigBuilder::builder();
    if let Some(ref path) = config_file_path {
        builder = builder.add_source(File::from(path.clone()).required(false));
    }
    builder = builder.add_source(Environment::with_prefix("FILESCAPE").separator("__"));

    let file_config: FileConfig = builder.build()?.try_deserialize()?;

    let config = AppConfig {
        directory: args.directory.clone(),
        move_speed: args
            .move_speed
            .or(file_config.move_speed)
            .unwrap_or(DEFAULT_MOVE_SPEED),
        projection_distance: args
            .projection_distance
            .or(file_config.projection_distance)
            .unwrap_or(DEFAULT_PROJECTION_DISTANCE),
        magnification: args
            .magnification
            .or(file_config.magnification)
            .unwrap_or(DEFAULT_MAGNIFICATION),
        scan_depth: args
            .scan_depth
            .or(file_config.scan_depth)
            .unwrap_or(DEFAULT_SCAN_DEPTH),
        scan_limit: args
            .scan_limit
            .or(file_config.scan_limit)
            .unwrap_or(DEFAULT_SCAN_LIMIT),
    };

    // The perspective divide degenerates at distance 0.
    if config.projection_distance <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field: "projection_distance",
            reason: format!("must be positive, got {}", config.projection_distance),
        });
    }
    if config.scan_depth == 0 {
        return Err(ConfigError::InvalidValue {
            field: "scan_depth",
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(config)
}
