pub mod toml_config;

use serde::{Deserialize, Serialize};

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use toml_config::TomlConfig;

pub const DEFAULT_OUTPUT_PATH: &str = "./out";
pub const DEFAULT_OUTPUT_FILE: &str = "deck.csv";
pub const DEFAULT_EXTENSION: &str = "txt";

#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(
    feature = "cli",
    command(
        name = "versedeck",
        about = "Builds a spaced-repetition flashcard deck from song lyric files"
    )
)]
pub struct CliConfig {
    /// Directory containing one plain-text lyric file per song
    pub source_dir: String,

    #[cfg_attr(feature = "cli", arg(long, help = "TOML configuration file"))]
    pub config: Option<String>,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Directory the deck CSV is written to")
    )]
    pub output_path: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "File name of the deck CSV"))]
    pub output_file: Option<String>,

    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', help = "File extensions treated as songs")
    )]
    pub extensions: Vec<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Log CPU and memory statistics per phase")
    )]
    pub monitor: bool,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "List the songs that would be processed, write nothing")
    )]
    pub dry_run: bool,
}

/// Settings the pipeline actually runs with, resolved from all sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub source_dir: String,
    pub output_path: String,
    pub output_file: String,
    pub extensions: Vec<String>,
    pub deck_name: Option<String>,
    pub monitor: bool,
}

impl EffectiveConfig {
    /// Command-line values win over the configuration file, which wins over
    /// the built-in defaults.
    pub fn merge(cli: &CliConfig, file: Option<&TomlConfig>) -> Self {
        let output_path = cli
            .output_path
            .clone()
            .or_else(|| file.and_then(|f| f.output_path().map(str::to_string)))
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        let output_file = cli
            .output_file
            .clone()
            .or_else(|| file.and_then(|f| f.output_filename().map(str::to_string)))
            .or_else(|| file.map(|f| f.default_filename()))
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());

        let extensions = if !cli.extensions.is_empty() {
            cli.extensions.clone()
        } else {
            file.and_then(|f| f.extensions().map(<[String]>::to_vec))
                .unwrap_or_else(|| vec![DEFAULT_EXTENSION.to_string()])
        };

        Self {
            source_dir: cli.source_dir.clone(),
            output_path,
            output_file,
            extensions,
            deck_name: file.map(|f| f.deck.name.clone()),
            monitor: cli.monitor || file.map(|f| f.monitoring_enabled()).unwrap_or(false),
        }
    }
}

impl ConfigProvider for EffectiveConfig {
    fn source_dir(&self) -> &str {
        &self.source_dir
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Validate for EffectiveConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("source_dir", &self.source_dir)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_filename("output_file", &self.output_file)?;
        validation::validate_extension_list("extensions", &self.extensions)?;
        Ok(())
    }
}
