//! Shared configuration loader for the rib toolchain.
//!
//! `defaults/rib.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`RibConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/rib.default.toml");

/// Top-level configuration consumed by rib applications.
#[derive(Debug, Clone, Deserialize)]
pub struct RibConfig {
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
    pub limits: LimitsConfig,
    pub lexer: LexerConfig,
}

/// How the output pipeline is assembled.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub preset: Preset,
    pub pretty_print: bool,
    pub indent_string: String,
    pub encoding: Encoding,
}

/// Named stage orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Default,
    Strict,
    Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    Ascii,
    Binary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

/// Resource bounds enforced while lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    pub max_array_len: usize,
    pub max_string_len: usize,
    pub max_array_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LexerConfig {
    pub filter: FilterKind,
    pub bloom_bits: usize,
    pub bloom_hashes: u32,
}

/// Which vocabulary pre-filter the lexer screens command names with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    Bloom,
    Exact,
}

/// Builds a [`RibConfig`] from `rib.default.toml` plus any user layers.
///
/// Later layers win key by key, so a file only needs the keys it changes.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file that must exist; `build` fails otherwise.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Layer a TOML file if present, e.g. a per-project `rib.toml`.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    /// Set one dotted key such as `pipeline.preset` above every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers and deserialize; unknown presets or encodings are errors here.
    pub fn build(self) -> Result<RibConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<RibConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.pipeline.preset, Preset::Default);
        assert!(config.pipeline.pretty_print);
        assert_eq!(config.pipeline.indent_string, "    ");
        assert_eq!(config.pipeline.encoding, Encoding::Ascii);
        assert_eq!(config.limits.max_array_depth, 1);
        assert_eq!(config.lexer.filter, FilterKind::Bloom);
        assert_eq!(config.lexer.bloom_hashes, 3);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("pipeline.preset", "strict")
            .expect("override to apply")
            .set_override("lexer.filter", "exact")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.pipeline.preset, Preset::Strict);
        assert_eq!(config.lexer.filter, FilterKind::Exact);
    }

    #[test]
    fn layers_user_file_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[limits]\nmax_string_len = 16").expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.limits.max_string_len, 16);
        // Untouched keys keep their defaults
        assert_eq!(config.limits.max_array_depth, 1);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here/rib.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.pipeline.preset, Preset::Default);
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new()
            .with_file("/definitely/not/here/rib.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn unknown_preset_fails_at_build() {
        let result = Loader::new()
            .set_override("pipeline.preset", "lavish")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}
