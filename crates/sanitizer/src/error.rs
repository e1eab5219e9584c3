//! Errors surfaced by the sanitizer and by policy loading.

use std::fmt;
use std::io;

use html::{ConfigError, ScanError};

#[derive(Debug)]
pub enum SanitizeError {
    /// A markup or style unit did not fit the configured limits.
    Scan(ScanError),
    Io(io::Error),
    Config(ConfigError),
}

impl fmt::Display for SanitizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizeError::Scan(err) => write!(f, "scan failed: {err}"),
            SanitizeError::Io(err) => write!(f, "i/o error: {err}"),
            SanitizeError::Config(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl std::error::Error for SanitizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SanitizeError::Scan(err) => Some(err),
            SanitizeError::Io(err) => Some(err),
            SanitizeError::Config(err) => Some(err),
        }
    }
}

impl From<ScanError> for SanitizeError {
    fn from(err: ScanError) -> Self {
        SanitizeError::Scan(err)
    }
}

impl From<io::Error> for SanitizeError {
    fn from(err: io::Error) -> Self {
        SanitizeError::Io(err)
    }
}

impl From<ConfigError> for SanitizeError {
    fn from(err: ConfigError) -> Self {
        SanitizeError::Config(err)
    }
}

#[derive(Debug)]
pub enum PolicyError {
    Toml(toml::de::Error),
    /// A table entry names a tag, attribute or property the name tables do
    /// not know.
    UnknownName { table: &'static str, name: String },
    /// An allowed URL scheme that is not a valid scheme name.
    InvalidScheme(String),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::Toml(err) => write!(f, "policy is not valid TOML: {err}"),
            PolicyError::UnknownName { table, name } => {
                write!(f, "unknown name `{name}` in [{table}]")
            }
            PolicyError::InvalidScheme(scheme) => write!(f, "invalid url scheme `{scheme}`"),
        }
    }
}

impl std::error::Error for PolicyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PolicyError::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for PolicyError {
    fn from(err: toml::de::Error) -> Self {
        PolicyError::Toml(err)
    }
}
