use crate::utils::error::{DeckError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub deck: DeckConfig,
    pub source: Option<SourceConfig>,
    pub output: Option<OutputConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DeckError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DeckError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOME})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("deck.name", &self.deck.name)?;

        if let Some(extensions) = self.extensions() {
            crate::utils::validation::validate_extension_list("source.extensions", extensions)?;
        }

        if let Some(path) = self.output_path() {
            crate::utils::validation::validate_path("output.path", path)?;
        }

        if let Some(filename) = self.output_filename() {
            crate::utils::validation::validate_filename("output.filename", filename)?;
        }

        Ok(())
    }

    pub fn extensions(&self) -> Option<&[String]> {
        self.source
            .as_ref()
            .and_then(|source| source.extensions.as_deref())
    }

    /// 取得輸出路徑
    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|output| output.path.as_deref())
    }

    pub fn output_filename(&self) -> Option<&str> {
        self.output
            .as_ref()
            .and_then(|output| output.filename.as_deref())
    }

    /// File name used when [output] gives none: the deck name itself.
    pub fn default_filename(&self) -> String {
        format!("{}.csv", self.deck.name.trim())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
