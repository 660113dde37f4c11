//! Configuration management for the synthesis pipeline.
//!
//! Loads config from YAML files in standard locations; the CI
//! environment variables (S3_BUCKET_NAME, AWS_REGION, OUTPUT_NAME,
//! POLLY_VOICE_ID) override whatever the file says.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::voice::Voice;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub voice: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voice: "Joanna".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    pub prefix: String,
    /// Fixed object name. When non-empty, every run writes the same key
    /// (`{prefix}/{output_name}`) regardless of the source file.
    pub output_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: "audio".into(),
            output_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory prefix changed files must live under.
    pub dir: String,
    /// Extensions (without dot) accepted by the change detector.
    pub extensions: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: "text".into(),
            extensions: vec!["txt".into(), "md".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub results_file: PathBuf,
    /// Local directory for the MP3 copies kept as CI artifacts.
    pub audio_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_file: PathBuf::from("conversion-results.json"),
            audio_dir: PathBuf::from("audio"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aws: AwsConfig,
    pub synthesis: SynthesisConfig,
    pub storage: StorageConfig,
    pub content: ContentConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from YAML file, then apply environment overrides.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./polly-pipeline.yaml
    /// 2. ~/.config/polly-pipeline/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let mut config = Self::load_file(path);
        config.apply_env();
        config
    }

    fn load_file(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir()
                    .ok()
                    .map(|d| d.join("polly-pipeline.yaml")),
                dirs::home_dir().map(|h| h.join(".config/polly-pipeline/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(bucket) = std::env::var("S3_BUCKET_NAME") {
            self.storage.bucket = bucket;
        }
        if let Ok(region) = std::env::var("AWS_REGION") {
            self.aws.region = region;
        }
        if let Ok(name) = std::env::var("OUTPUT_NAME") {
            self.storage.output_name = name;
        }
        if let Ok(voice) = std::env::var("POLLY_VOICE_ID") {
            self.synthesis.voice = voice;
        }
    }

    /// Default voice for runs that don't pass one on the command line.
    pub fn default_voice(&self) -> Voice {
        match Voice::parse(&self.synthesis.voice) {
            Some(voice) => voice,
            None => {
                tracing::warn!(
                    "Unknown voice '{}', using {}",
                    self.synthesis.voice,
                    Voice::default()
                );
                Voice::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ci_conventions() {
        let config = Config::default();
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.storage.prefix, "audio");
        assert!(config.storage.output_name.is_empty());
        assert_eq!(config.content.dir, "text");
        assert_eq!(config.default_voice(), Voice::Joanna);
    }

    #[test]
    fn unknown_voice_falls_back_to_default() {
        let mut config = Config::default();
        config.synthesis.voice = "Ivy".into();
        assert_eq!(config.default_voice(), Voice::Joanna);
    }

    #[test]
    fn yaml_sections_deserialize_with_partial_content() {
        let config: Config = serde_yml::from_str(
            "storage:\n  bucket: my-bucket\nsynthesis:\n  voice: Brian\n",
        )
        .unwrap();
        assert_eq!(config.storage.bucket, "my-bucket");
        assert_eq!(config.default_voice(), Voice::Brian);
        // untouched sections keep their defaults
        assert_eq!(
            config.report.results_file,
            PathBuf::from("conversion-results.json")
        );
    }
}
