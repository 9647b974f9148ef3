// All core functionality is in plenary-minutes-core
// This CLI acts as a thin wrapper around the core library

use std::path::PathBuf;

// Re-export core types for convenience
pub use plenary_minutes_core::*;

/// Command-line values that take precedence over the loaded config file
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub failures: Option<PathBuf>,
    pub workers: Option<usize>,
    pub delimiter: Option<char>,
    pub fail_on_empty: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(input) = &self.input {
            config.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(failures) = &self.failures {
            config.failure_report = Some(failures.clone());
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if self.fail_on_empty {
            config.fail_on_empty = true;
        }
        config
    }
}

/// Status line describing which config a run is using
pub fn config_banner(source: ConfigSource, path: Option<&str>) -> String {
    match (source, path) {
        (ConfigSource::File, Some(p)) => format!("📋 Loaded config from: {}", p),
        (ConfigSource::FallbackDefaults, Some(p)) => {
            format!("📋 Using default config ({} could not be loaded)", p)
        }
        _ => "📋 Using default config".to_string(),
    }
}
