use crate::error::{Result, ValidationError};
use crate::operations::budget::DEFAULT_WARNING_PERCENT;
use clap::Parser;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "expman.toml";
const ENV_PREFIX: &str = "EXPMAN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    pub owner: String,
    pub currency_symbol: String,
    pub language: Language,
    pub theme: Theme,
    pub budget_warning_percent: u32,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "expenses.db".to_string(),
            owner: "local".to_string(),
            currency_symbol: "Kz".to_string(),
            language: Language::En,
            theme: Theme::Light,
            budget_warning_percent: DEFAULT_WARNING_PERCENT,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Falls back to `INFO` when the configured level is not recognised.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, Default, Parser)]
#[command(name = "expman", about = "Track income, expenses and budgets")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override the SQLite database path.
    #[arg(long)]
    pub database: Option<String>,
    /// Override the owner whose records are shown.
    #[arg(long)]
    pub owner: Option<String>,
    /// Override the log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    resolve(Args::parse())
}

/// Layers the config file, `EXPMAN_*` environment variables and CLI flags,
/// later sources winning.
pub fn resolve(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;
    let mut app_config: AppConfig = settings.try_deserialize()?;

    if let Some(database) = args.database {
        app_config.database_path = database;
    }
    if let Some(owner) = args.owner {
        app_config.owner = owner;
    }
    if let Some(log_level) = args.log_level {
        app_config.log_level = log_level;
    }

    app_config.owner = app_config.owner.trim().to_string();
    if app_config.owner.is_empty() {
        return Err(ValidationError::MissingOwner.into());
    }
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_config(contents: &str) -> NamedTempFile {
        let mut tmp = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        write!(tmp, "{}", contents).expect("Failed to write test config");
        tmp
    }

    fn args_for(file: &NamedTempFile) -> Args {
        Args {
            config: Some(file.path().to_str().unwrap().to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let args = Args {
            config: Some("does-not-exist.toml".to_string()),
            ..Args::default()
        };
        let config = resolve(args).unwrap();
        assert_eq!(config.currency_symbol, "Kz");
        assert_eq!(config.budget_warning_percent, 80);
        assert_eq!(config.language, Language::En);
    }

    #[test]
    fn test_file_values_are_loaded() {
        let tmp = write_temp_config(
            r#"
owner = "alice"
currency_symbol = "€"
language = "pt"
theme = "dark"
budget_warning_percent = 90
"#,
        );
        let config = resolve(args_for(&tmp)).unwrap();
        assert_eq!(config.owner, "alice");
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.language, Language::Pt);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.budget_warning_percent, 90);
        assert_eq!(config.database_path, "expenses.db");
    }

    #[test]
    fn test_cli_overrides_file() {
        let tmp = write_temp_config("owner = \"alice\"\ndatabase_path = \"a.db\"\n");
        let args = Args {
            database: Some("b.db".to_string()),
            owner: Some("bob".to_string()),
            ..args_for(&tmp)
        };
        let config = resolve(args).unwrap();
        assert_eq!(config.owner, "bob");
        assert_eq!(config.database_path, "b.db");
    }

    #[test]
    fn test_blank_owner_rejected() {
        let tmp = write_temp_config("owner = \"  \"\n");
        let result = resolve(args_for(&tmp));
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::MissingOwner))
        ));
    }

    #[test]
    fn test_invalid_language_is_config_error() {
        let tmp = write_temp_config("language = \"klingon\"\n");
        assert!(matches!(resolve(args_for(&tmp)), Err(AppError::Config(_))));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["expman", "--owner", "carol", "--log-level", "debug"]).unwrap();
        assert_eq!(args.owner.as_deref(), Some("carol"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_tracing_level_fallback() {
        let mut config = AppConfig::default();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
        config.log_level = "debug".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
        config.log_level = "loud".to_string();
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
    }
}
