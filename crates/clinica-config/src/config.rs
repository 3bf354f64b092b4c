//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use clinica_core::{OutputFormat, DEFAULT_FALLBACK_TAG, HOURS_CATEGORY, SERVICE_CATEGORY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub tagging: TaggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values that would make extraction meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("extraction.anchor", &self.extraction.anchor),
            ("extraction.stop_phrase", &self.extraction.stop_phrase),
            ("extraction.initial_marker", &self.extraction.initial_marker),
            ("tagging.fallback_tag", &self.tagging.fallback_tag),
            ("tagging.service_category", &self.tagging.service_category),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }
        if self.sources.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "sources.timeout_seconds must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Category keyword file, falling back to the one next to the config.
    pub fn categories_path(&self) -> Option<PathBuf> {
        match &self.sources.categories_file {
            Some(path) => Some(PathBuf::from(shellexpand::tilde(path).into_owned())),
            None => AppPaths::new().map(|p| p.categories_file),
        }
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Clinica Configuration

[sources]
# Page with the department working hours
hours_url = "https://clinica.chitgma.ru/informatsiya-po-otdeleniyu-9"

# Price list PDF
price_list_url = "https://clinica.chitgma.ru/images/Preyskurant/2025/1DP.pdf"

# Pre-extracted table grid (JSON pages -> tables -> rows -> cells).
# When set, it is used instead of reading the PDF.
# price_grid_file = "~/prices.json"

# Category keywords (defaults to medical_service_categories.json next to this file)
# categories_file = "~/medical_service_categories.json"

# Request timeout in seconds
timeout_seconds = 60

user_agent = "clinica/0.1"

[extraction]
# Text that starts the working-hours block
anchor = "Режим работы отделения:"

# Paragraph text that ends the working-hours block
stop_phrase = "Предварительная запись"

# A price row with a blank name repeats the previous service,
# with initial_marker replaced by followup_marker
initial_marker = "первичный"
followup_marker = "повторный"

# Rows with more empty cells than this are treated as noise
max_empty_fields = 2

[tagging]
# Tag for services that match no category
fallback_tag = "other"

service_category = "service"
hours_category = "working_hours"
hours_tag = "working_hours"

# Emit working-hours records alongside services in `clinica process`
include_hours = true

[output]
# json, jsonl, text, or columns (texts/metadatas arrays)
format = "json"
pretty = true
"#
        .to_string()
    }

    /// Starter category keyword file written by `clinica init`.
    pub fn default_categories_string() -> String {
        r#"{
  "medical_service_categories": {
    "консультации": "приём, прием, консультация, осмотр",
    "диагностика": "узи, рентген, мрт, томография, экг, эхокг, холтер",
    "анализы": "анализ, кровь, крови, моча, мочи, мазок, посев",
    "кардиология": "кардиолог, экг, эхокг, холтер",
    "неврология": "невролог, энцефалограф",
    "гинекология": "гинеколог, кольпоскоп",
    "хирургия": "хирург, удаление, вскрытие, перевязка",
    "процедуры": "инъекция, капельн, массаж, физиотерап"
  }
}
"#
        .to_string()
    }
}

/// Where the source documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub hours_url: String,
    pub price_list_url: String,
    pub price_grid_file: Option<String>,
    pub categories_file: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            hours_url: "https://clinica.chitgma.ru/informatsiya-po-otdeleniyu-9".to_string(),
            price_list_url: "https://clinica.chitgma.ru/images/Preyskurant/2025/1DP.pdf"
                .to_string(),
            price_grid_file: None,
            categories_file: None,
            timeout_seconds: 60,
            user_agent: "clinica/0.1".to_string(),
        }
    }
}

/// Document extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub anchor: String,
    pub stop_phrase: String,
    pub initial_marker: String,
    pub followup_marker: String,
    pub max_empty_fields: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            anchor: "Режим работы отделения:".to_string(),
            stop_phrase: "Предварительная запись".to_string(),
            initial_marker: "первичный".to_string(),
            followup_marker: "повторный".to_string(),
            max_empty_fields: 2,
        }
    }
}

/// Category tagging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    pub fallback_tag: String,
    pub service_category: String,
    pub hours_category: String,
    pub hours_tag: String,
    pub include_hours: bool,
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            fallback_tag: DEFAULT_FALLBACK_TAG.to_string(),
            service_category: SERVICE_CATEGORY.to_string(),
            hours_category: HOURS_CATEGORY.to_string(),
            hours_tag: HOURS_CATEGORY.to_string(),
            include_hours: true,
        }
    }
}

/// Output rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.anchor, "Режим работы отделения:");
        assert_eq!(config.extraction.max_empty_fields, 2);
        assert_eq!(config.tagging.fallback_tag, "other");
        assert_eq!(config.tagging.service_category, "service");
    }

    #[test]
    fn test_default_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.timeout_seconds, 60);
        assert!(config.sources.price_grid_file.is_none());
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [tagging]
            fallback_tag = "другое"

            [output]
            format = "jsonl"
            "#
        )
        .unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();

        assert_eq!(config.tagging.fallback_tag, "другое");
        assert_eq!(config.output.format, OutputFormat::Jsonl);
        // Defaults should still work
        assert_eq!(config.extraction.followup_marker, "повторный");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.extraction.stop_phrase, "Предварительная запись");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[extraction]\nanchor = \"  \"").unwrap();

        let err = Config::load_from(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.sources.price_grid_file = Some("/tmp/grid.json".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sources.price_grid_file.as_deref(), Some("/tmp/grid.json"));
    }

    #[test]
    fn test_explicit_categories_path() {
        let mut config = Config::default();
        config.sources.categories_file = Some("/etc/cats.json".into());
        assert_eq!(config.categories_path(), Some(PathBuf::from("/etc/cats.json")));
    }

    #[test]
    fn test_categories_path_expands_home() {
        let mut config = Config::default();
        config.sources.categories_file = Some("~/cats.json".into());
        let path = config.categories_path().unwrap();
        assert!(path.ends_with("cats.json"));
        assert!(!path.starts_with("~"));

        config.sources.categories_file = Some("~".into());
        assert_ne!(config.categories_path(), Some(PathBuf::from("~")));
    }
}
