//! Simple configuration persistence for IKFX
//!
//! Stores the preferred engine, host buffer size and last preset.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::layout::EngineKind;

/// Default host buffer size in frames
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Engine started by default
    pub engine: EngineKind,
    /// Preferred host buffer size in frames
    pub block_size: usize,
    /// Preset loaded at startup
    pub last_preset: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineKind::Distortion,
            block_size: DEFAULT_BLOCK_SIZE,
            last_preset: None,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be read.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Using default config");
                Self::default()
            }
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.serialize())
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ikfx")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "engine" => match EngineKind::from_name(value) {
                    Some(engine) => config.engine = engine,
                    None => warn!(value, "Unknown engine in config"),
                },
                "block_size" => match value.parse::<usize>() {
                    Ok(size) if size > 0 => config.block_size = size,
                    _ => warn!(value, "Invalid block_size in config"),
                },
                "last_preset" => {
                    if !value.is_empty() {
                        config.last_preset = Some(PathBuf::from(value));
                    }
                }
                _ => {} // Ignore unknown keys
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = vec![
            "# IKFX Configuration".to_string(),
            format!("engine={}", self.engine.name()),
            format!("block_size={}", self.block_size),
        ];

        if let Some(ref preset) = self.last_preset {
            lines.push(format!("last_preset={}", preset.display()));
        }

        lines.join("\n")
    }
}
