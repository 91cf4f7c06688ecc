//! Job Configuration
//!
//! Loaded from TOML or YAML (chosen by file extension); every field has a
//! default so a partial file, or none at all, is valid.

use anyhow::{anyhow, Context, Result};
use common::RecordErrorPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct KqiConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Raw export location
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InputConfig {
    /// Folder holding `*.csv.gz` / `*.csv` exports
    #[serde(default = "default_input_folder")]
    pub folder: PathBuf,
    /// Field separator of the raw export
    #[serde(default = "default_raw_delimiter")]
    pub delimiter: char,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            folder: default_input_folder(),
            delimiter: default_raw_delimiter(),
        }
    }
}

fn default_input_folder() -> PathBuf {
    PathBuf::from("input")
}

fn default_raw_delimiter() -> char {
    '|'
}

/// Tower reference table
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MappingConfig {
    #[serde(default = "default_mapping_file")]
    pub file: PathBuf,
    #[serde(default = "default_mapping_delimiter")]
    pub delimiter: char,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            file: default_mapping_file(),
            delimiter: default_mapping_delimiter(),
        }
    }
}

fn default_mapping_file() -> PathBuf {
    PathBuf::from("mapping.csv")
}

fn default_mapping_delimiter() -> char {
    ','
}

/// Report output
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_folder")]
    pub folder: PathBuf,
    #[serde(default = "default_resolved_prefix")]
    pub resolved_prefix: String,
    #[serde(default = "default_unresolved_prefix")]
    pub unresolved_prefix: String,
    /// Leave decompressed input in the scratch folder after the run
    #[serde(default)]
    pub keep_extracted: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: default_output_folder(),
            resolved_prefix: default_resolved_prefix(),
            unresolved_prefix: default_unresolved_prefix(),
            keep_extracted: false,
        }
    }
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("output")
}

fn default_resolved_prefix() -> String {
    interfaces::report_writer::DEFAULT_RESOLVED_PREFIX.to_string()
}

fn default_unresolved_prefix() -> String {
    interfaces::report_writer::DEFAULT_UNRESOLVED_PREFIX.to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub on_record_error: RecordErrorPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub mapping: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub log_level: Option<String>,
    pub on_record_error: Option<RecordErrorPolicy>,
    pub keep_extracted: bool,
}

impl KqiConfig {
    /// Load a TOML or YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents, path)
    }

    /// Load `path`, or defaults when it is the implicit default and absent
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let config = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?,
            Some("toml") => toml::from_str(contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?,
            _ => {
                return Err(anyhow!(
                    "Unsupported config format: {} (expected .toml, .yaml or .yml)",
                    path.display()
                ))
            }
        };
        Ok(config)
    }

    /// Apply command-line values on top of the file
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(folder) = overrides.input {
            self.input.folder = folder;
        }
        if let Some(file) = overrides.mapping {
            self.mapping.file = file;
        }
        if let Some(folder) = overrides.output {
            self.output.folder = folder;
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
        if let Some(policy) = overrides.on_record_error {
            self.processing.on_record_error = policy;
        }
        if overrides.keep_extracted {
            self.output.keep_extracted = true;
        }
    }

    /// Check delimiters fit in one byte
    pub fn validate(&self) -> Result<()> {
        delimiter_byte(self.input.delimiter).context("input.delimiter")?;
        delimiter_byte(self.mapping.delimiter).context("mapping.delimiter")?;
        Ok(())
    }

    /// Scratch folder for decompressed input
    pub fn scratch_folder(&self) -> PathBuf {
        self.output.folder.join("_temp_extracted")
    }
}

/// Single-byte field separator
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(anyhow!("Delimiter {:?} must be a single ASCII character", delimiter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KqiConfig::default();
        assert_eq!(config.input.delimiter, '|');
        assert_eq!(config.mapping.delimiter, ',');
        assert_eq!(config.output.resolved_prefix, "KQI_");
        assert_eq!(config.output.unresolved_prefix, "kqi_unmapped_");
        assert_eq!(config.processing.on_record_error, RecordErrorPolicy::Abort);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.scratch_folder(), PathBuf::from("output/_temp_extracted"));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            [input]
            folder = "/data/kqi"

            [processing]
            on_record_error = "skip"
        "#;
        let config = KqiConfig::parse(toml, Path::new("kqi.toml")).unwrap();
        assert_eq!(config.input.folder, PathBuf::from("/data/kqi"));
        assert_eq!(config.input.delimiter, '|');
        assert_eq!(config.processing.on_record_error, RecordErrorPolicy::Skip);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_yaml() {
        let yaml = "mapping:\n  file: towers.csv\n  delimiter: ';'\nlog:\n  level: debug\n";
        let config = KqiConfig::parse(yaml, Path::new("kqi.yml")).unwrap();
        assert_eq!(config.mapping.file, PathBuf::from("towers.csv"));
        assert_eq!(config.mapping.delimiter, ';');
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_unknown_extension() {
        assert!(KqiConfig::parse("", Path::new("kqi.ini")).is_err());
    }

    #[test]
    fn test_missing_default_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kqi.toml");
        assert_eq!(KqiConfig::load(&path, false).unwrap(), KqiConfig::default());
        assert!(KqiConfig::load(&path, true).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = KqiConfig::default();
        config.apply(Overrides {
            input: Some(PathBuf::from("in")),
            on_record_error: Some(RecordErrorPolicy::Skip),
            keep_extracted: true,
            ..Overrides::default()
        });
        assert_eq!(config.input.folder, PathBuf::from("in"));
        assert_eq!(config.mapping.file, PathBuf::from("mapping.csv"));
        assert_eq!(config.processing.on_record_error, RecordErrorPolicy::Skip);
        assert!(config.output.keep_extracted);
    }

    #[test]
    fn test_delimiter_validation() {
        assert_eq!(delimiter_byte('|').unwrap(), b'|');
        let mut config = KqiConfig::default();
        config.input.delimiter = 'é';
        assert!(config.validate().is_err());
    }
}
