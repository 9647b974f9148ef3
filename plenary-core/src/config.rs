use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Default value functions for serde
fn default_input_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/plenary-minutes.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_workers() -> usize {
    1
}

fn default_progress_interval() -> usize {
    500 // files between progress lines
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the downloaded XML tree, one subdirectory per electoral period
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    /// Destination of the normalized table
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Optional JSON report listing every file that failed extraction
    #[serde(default)]
    pub failure_report: Option<PathBuf>,
    /// Field delimiter of the output table (single ASCII character)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Number of extraction threads; 1 keeps the run single-threaded
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Print a progress line every N files (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    /// Treat a run that produced no records as an error instead of writing a header-only table
    #[serde(default)]
    pub fail_on_empty: bool,
}

/// Where a loaded [`PipelineConfig`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read and validated from the given file
    File,
    /// No file was given
    Defaults,
    /// A file was given but could not be loaded
    FallbackDefaults,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_path: default_output_path(),
            failure_report: None,
            delimiter: default_delimiter(),
            workers: default_workers(),
            progress_interval: default_progress_interval(),
            fail_on_empty: false,
        }
    }
}

impl PipelineConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        Self::load_with_source(path).0
    }

    /// Like [`load_with_fallback`](Self::load_with_fallback), also reporting where the values came from
    pub fn load_with_source(path: Option<&str>) -> (Self, ConfigSource) {
        match path {
            Some(p) => match Self::load_from_file(p) {
                Ok(config) => (config, ConfigSource::File),
                Err(e) => {
                    eprintln!("⚠️  Failed to load config from {}: {}, using defaults", p, e);
                    (Self::default(), ConfigSource::FallbackDefaults)
                }
            },
            None => (Self::default(), ConfigSource::Defaults),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.workers == 0 {
            return Err(anyhow!("workers must be at least 1"));
        }
        Ok(())
    }

    /// The delimiter as the single byte the table writer needs
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter {
            '"' | '\n' | '\r' => Err(anyhow!(
                "delimiter {:?} would break row quoting",
                self.delimiter
            )),
            c if c.is_ascii() => Ok(c as u8),
            c => Err(anyhow!("delimiter {:?} is not a single ASCII character", c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.output_path, PathBuf::from("data/plenary-minutes.csv"));
        assert_eq!(config.delimiter_byte().unwrap(), b',');
        assert_eq!(config.workers, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: PipelineConfig = serde_yaml::from_str(
            "input_dir: /srv/bundestag\ndelimiter: \"\\t\"\nworkers: 4\n",
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("/srv/bundestag"));
        assert_eq!(config.delimiter_byte().unwrap(), b'\t');
        assert_eq!(config.workers, 4);
        assert_eq!(config.progress_interval, 500);
        assert!(config.failure_report.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = PipelineConfig {
            delimiter: 'ä',
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            delimiter: '"',
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            workers: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_with_fallback_on_missing_file() {
        let config = PipelineConfig::load_with_fallback(Some("/nonexistent/pipeline.yaml"));
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_config_source_tells_fallback_from_file() {
        let (_, source) = PipelineConfig::load_with_source(None);
        assert_eq!(source, ConfigSource::Defaults);

        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("pipeline.yaml");
        std::fs::write(&good, "workers: 6\n").unwrap();
        let (config, source) = PipelineConfig::load_with_source(good.to_str());
        assert_eq!(source, ConfigSource::File);
        assert_eq!(config.workers, 6);

        let bad = dir.path().join("broken.yaml");
        std::fs::write(&bad, "workers: [not, a, number]\n").unwrap();
        let (config, source) = PipelineConfig::load_with_source(bad.to_str());
        assert_eq!(source, ConfigSource::FallbackDefaults);
        assert_eq!(config.workers, 1);

        let invalid = dir.path().join("invalid.yaml");
        std::fs::write(&invalid, "workers: 0\n").unwrap();
        let (_, source) = PipelineConfig::load_with_source(invalid.to_str());
        assert_eq!(source, ConfigSource::FallbackDefaults);
    }
}
