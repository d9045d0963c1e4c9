// quick-common/src/error.rs
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum QuickError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("YAML Parsing Error: {0}")]
    Yaml(#[from] Arc<serde_yaml::Error>),

    #[error("Invalid search pattern: {0}")]
    Regex(#[from] Arc<regex::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("The package index is missing. Please execute `quick sync` to fetch the packages list first.")]
    NotSynced,

    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("{0} is not installed.")]
    NotInstalled(String),

    #[error("FetchError: Failed to fetch '{url}': {reason}")]
    FetchError { url: String, reason: String },

    #[error("Hash mismatch for {}: expected {expected}, got {actual}", path.display())]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Extraction of {} failed: {reason}", archive.display())]
    ExtractionFailed { archive: PathBuf, reason: String },

    #[error("Installation of {name} failed: {reason}")]
    InstallFailed { name: String, reason: String },

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Parsing Error in {0}: {1}")]
    Parse(&'static str, String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl QuickError {
    pub fn fetch(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        QuickError::FetchError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn extraction(archive: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        QuickError::ExtractionFailed {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for QuickError {
    fn from(err: std::io::Error) -> Self {
        QuickError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for QuickError {
    fn from(err: reqwest::Error) -> Self {
        QuickError::Http(Arc::new(err))
    }
}

impl From<serde_yaml::Error> for QuickError {
    fn from(err: serde_yaml::Error) -> Self {
        QuickError::Yaml(Arc::new(err))
    }
}

impl From<regex::Error> for QuickError {
    fn from(err: regex::Error) -> Self {
        QuickError::Regex(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, QuickError>;
