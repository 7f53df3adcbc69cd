//! Shared configuration loader for moleco.
//!
//! `defaults/moleco.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MolecoConfig`].
//!
//! Color ranges are validated while deserializing: an inverted range, or one that
//! leaves OkLCh's domain, fails the build rather than producing odd colors later.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use moleco::moleco::pipeline::Options;
use moleco::{ColorOptions, ParseOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/moleco.default.toml");

/// Top-level configuration consumed by moleco applications.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MolecoConfig {
    pub parsing: ParseOptions,
    pub color: ColorOptions,
}

impl MolecoConfig {
    /// Pipeline options carried by this configuration.
    pub fn options(&self) -> Options {
        Options {
            parsing: self.parsing.clone(),
            color: self.color,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for command-line settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MolecoConfig, ConfigError> {
        self.builder.build()?.try_deserialize::<MolecoConfig>()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MolecoConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.parsing.strict_version_check);
        assert_eq!(config.color, ColorOptions::default());
        assert_eq!(config.options(), Options::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parsing.strict_version_check", false)
            .expect("override to apply")
            .set_override("color.chroma.max", 0.12)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(!config.parsing.strict_version_check);
        assert_eq!(config.color.chroma().max, 0.12);
        assert_eq!(config.color.chroma().min, 0.09);
    }

    #[test]
    fn rejects_inverted_ranges() {
        let error = Loader::new()
            .set_override("color.lightness.min", 0.9)
            .expect("override to apply")
            .build()
            .unwrap_err();
        assert!(error.to_string().contains("lightness"));
    }

    #[test]
    fn layers_files_over_defaults() {
        let path = std::env::temp_dir().join(format!("moleco-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).expect("temp file");
        writeln!(file, "[color]\nlightness = {{ min = 0.5, max = 0.6 }}").expect("write");

        let config = Loader::new().with_file(&path).build().expect("config to build");
        std::fs::remove_file(&path).ok();
        assert_eq!(config.color.lightness().min, 0.5);
        assert!(config.parsing.strict_version_check);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/moleco.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.color, ColorOptions::default());
    }
}
