use thiserror::Error;

pub mod app_config;
pub mod automations;
pub mod config;
pub mod contacts;
pub mod import;

pub use app_config::AppConfig;
pub use automations::Automation;
pub use config::{load_app_config, load_app_config_from_env};
pub use contacts::{Contact, RawContact};
pub use import::{ImportError, ImportErrorCode, ValidationSummary};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
