use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use interview_core::SelectionPolicy;
use interview_core::model::CompletionPolicy;
use interview_core::selection::DEFAULT_TECHNICAL_QUOTA;
use services::InterviewSettings;

/// Prefix for environment overrides, e.g. `INTERVIEW__SELECTION__TECHNICAL_QUOTA`.
const ENV_PREFIX: &str = "INTERVIEW";

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SelectionConfig {
    pub technical_quota: usize,
    pub backfill_basic: bool,
    pub require_full: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            technical_quota: DEFAULT_TECHNICAL_QUOTA,
            backfill_basic: false,
            require_full: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CompletionConfig {
    pub require_all_questions_complete: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            require_all_questions_complete: true,
        }
    }
}

impl AppConfig {
    /// Load the optional TOML file at `path`, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be parsed, or a value
    /// has the wrong type.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    #[must_use]
    pub fn interview_settings(&self) -> InterviewSettings {
        InterviewSettings {
            selection: SelectionPolicy {
                technical_quota: self.selection.technical_quota,
                backfill_basic: self.selection.backfill_basic,
                require_full: self.selection.require_full,
            },
            completion: CompletionPolicy {
                require_all_questions_complete: self.completion.require_all_questions_complete,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_toml(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load("/nonexistent/interview-config.toml").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.interview_settings(), InterviewSettings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_toml(
            "interview-partial",
            "[selection]\ntechnical_quota = 3\nbackfill_basic = true\n",
        );
        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.selection.technical_quota, 3);
        assert!(config.selection.backfill_basic);
        assert!(!config.selection.require_full);
        assert!(config.completion.require_all_questions_complete);

        let settings = config.interview_settings();
        assert_eq!(settings.selection.full_size(), 4);
    }

    #[test]
    fn completion_table_can_relax_policy() {
        let path = temp_toml(
            "interview-completion",
            "[completion]\nrequire_all_questions_complete = false\n",
        );
        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(
            !config
                .interview_settings()
                .completion
                .require_all_questions_complete
        );
    }

    #[test]
    fn malformed_value_is_rejected() {
        let path = temp_toml("interview-bad", "[selection]\ntechnical_quota = \"many\"\n");
        let result = AppConfig::load(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
