// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::encoder::{OutputFormat, DEFAULT_QUALITY};
use crate::logging::LoggingConfig;
use crate::resource::LoaderConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub fonts: Vec<FontConfig>,
    #[serde(default)]
    pub loader: LoaderSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Upper bound for one composite request, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

fn default_output_format() -> String {
    "image/png".to_string()
}

fn default_quality() -> f32 {
    DEFAULT_QUALITY
}

/// Defaults for requests that do not name an output format or quality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: String,
    /// Lossy quality from 0.0 to 1.0
    #[serde(default = "default_quality")]
    pub quality: f32,
    /// Most results whose object URLs stay registered; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_object_urls: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            quality: default_quality(),
            max_object_urls: None,
        }
    }
}

/// Extra font family loaded from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    pub family: String,
    /// Regular face (TTF or OTF)
    pub regular: PathBuf,
    /// Bold face; the regular face is used for bold text when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<PathBuf>,
}

fn default_max_cache_entries() -> u64 {
    100
}

fn default_cache_ttl_seconds() -> u64 {
    3600
}

fn default_http_timeout_seconds() -> u64 {
    30
}

/// Default decoded-size limit (100 megapixels)
fn default_max_source_pixels() -> u64 {
    100_000_000
}

fn default_allow_file_paths() -> bool {
    true
}

/// Resource loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSettings {
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: u64,
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
    #[serde(default = "default_max_source_pixels")]
    pub max_source_pixels: u64,
    /// Whether plain strings may be read as filesystem paths
    #[serde(default = "default_allow_file_paths")]
    pub allow_file_paths: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            max_cache_entries: default_max_cache_entries(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            http_timeout_seconds: default_http_timeout_seconds(),
            max_source_pixels: default_max_source_pixels(),
            allow_file_paths: default_allow_file_paths(),
        }
    }
}

impl LoaderSettings {
    pub fn to_loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            max_cache_entries: self.max_cache_entries,
            cache_ttl: Duration::from_secs(self.cache_ttl_seconds),
            http_timeout: Duration::from_secs(self.http_timeout_seconds),
            max_pixels: self.max_source_pixels,
            allow_file_paths: self.allow_file_paths,
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        OutputFormat::from_mime(&self.output.format)
            .map_err(|_| format!("Unsupported output format '{}'", self.output.format))?;

        if !(0.0..=1.0).contains(&self.output.quality) {
            return Err(format!(
                "Output quality {} must be between 0.0 and 1.0",
                self.output.quality
            ));
        }

        if self.output.max_object_urls == Some(0) {
            return Err("output.max_object_urls must be > 0".to_string());
        }

        let mut seen_families = HashSet::new();
        for font in &self.fonts {
            if font.family.trim().is_empty() {
                return Err("Font family name cannot be empty".to_string());
            }
            if !seen_families.insert(font.family.to_ascii_lowercase()) {
                return Err(format!("Duplicate font family '{}'", font.family));
            }
        }

        if self.loader.max_cache_entries == 0 {
            return Err("loader.max_cache_entries must be > 0".to_string());
        }

        if self.loader.http_timeout_seconds == 0 {
            return Err("loader.http_timeout_seconds must be > 0".to_string());
        }

        if self.loader.max_source_pixels == 0 {
            return Err("loader.max_source_pixels must be > 0".to_string());
        }

        if self.timeout_seconds == Some(0) {
            return Err("timeout_seconds must be > 0 when set".to_string());
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
