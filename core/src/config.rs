use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Location of the generator configuration relative to the site directory.
pub const CONFIG_FILE: &str = "config/generator.toml";

/// Points awarded per gram occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub title: i64,
    pub content: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { title: 2, content: 1 }
    }
}

/// On-disk encoding of the inverted index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    Binary,
    #[default]
    Json,
    Toml,
}

impl IndexFormat {
    pub const ALL: [IndexFormat; 3] = [IndexFormat::Binary, IndexFormat::Json, IndexFormat::Toml];

    pub fn extension(self) -> &'static str {
        match self {
            IndexFormat::Binary => "bin",
            IndexFormat::Json => "json",
            IndexFormat::Toml => "toml",
        }
    }

    pub fn file_name(self) -> String {
        format!("indexes.{}", self.extension())
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Infer the format of an index file from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| IndexError::Config(format!("unrecognized index file {}", path.display())))
    }
}

impl fmt::Display for IndexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexFormat::Binary => "binary",
            IndexFormat::Json => "json",
            IndexFormat::Toml => "toml",
        })
    }
}

impl FromStr for IndexFormat {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(IndexFormat::Binary),
            "json" => Ok(IndexFormat::Json),
            "toml" => Ok(IndexFormat::Toml),
            other => Err(IndexError::Config(format!(
                "unknown index format {other:?} (expected binary, json or toml)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexFileConfig {
    pub format: IndexFormat,
}

/// Settings fixed for one index build; `n` must match at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub enabled: bool,
    pub n: usize,
    pub point: ScoreWeights,
    pub file: IndexFileConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { enabled: true, n: 2, point: ScoreWeights::default(), file: IndexFileConfig::default() }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(IndexError::Config("indexes.n must be at least 1".into()));
        }
        Ok(())
    }

    pub fn format(&self) -> IndexFormat {
        self.file.format
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Site-wide configuration read from `config/generator.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub host: String,
    pub port: u16,
    pub indexes: IndexConfig,
    pub search: SearchConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8080,
            indexes: IndexConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load the configuration of the site rooted at `directory`.
    /// A site without a config file runs on defaults.
    pub fn load<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let file = directory.as_ref().join(CONFIG_FILE);
        let config = match std::fs::read_to_string(&file) {
            Ok(text) => Self::parse(&text)
                .map_err(|e| IndexError::Config(format!("{}: {e}", file.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(file = %file.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(IndexError::io(file, e)),
        };
        config.indexes.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn generated_dir<P: AsRef<Path>>(directory: P) -> PathBuf {
        directory.as_ref().join("generated")
    }

    pub fn documents_dir<P: AsRef<Path>>(directory: P) -> PathBuf {
        directory.as_ref().join("temporary").join("documents")
    }
}
