use crate::features::FeatureSettings;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_CSV_NAME: &str = "features.csv";

/// Distinguishes runtime behavior for different stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub dataset: DatasetConfig,
    pub features: FeatureSettings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let input_path = non_empty_var("CSV_PATH").map(PathBuf::from);
        let output_dir = non_empty_var("CSV_DIR").map(PathBuf::from);
        let output_name = non_empty_var("OUTPUT_CSV_NAME")
            .unwrap_or_else(|| DEFAULT_OUTPUT_CSV_NAME.to_string());

        let mut features = FeatureSettings::default();
        if let Some(raw) = non_empty_var("CLAIM_LOOKBACK_DAYS") {
            features.claim_lookback_days = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::InvalidLookback { value: raw })?;
        }

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            dataset: DatasetConfig {
                input_path,
                output_dir,
                output_name,
            },
            features,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Where the applicant CSV is read from and the feature CSV is written to.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub input_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub output_name: String,
}

impl DatasetConfig {
    pub fn input_path(&self) -> Result<&Path, ConfigError> {
        self.input_path
            .as_deref()
            .ok_or(ConfigError::Missing { key: "CSV_PATH" })
    }

    pub fn output_dir(&self) -> Result<&Path, ConfigError> {
        self.output_dir
            .as_deref()
            .ok_or(ConfigError::Missing { key: "CSV_DIR" })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing { key: &'static str },
    InvalidLookback { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { key } => write!(f, "{key} must be set"),
            ConfigError::InvalidLookback { value } => write!(
                f,
                "CLAIM_LOOKBACK_DAYS must be a positive integer, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
