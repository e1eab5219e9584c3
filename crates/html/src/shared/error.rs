//! Errors surfaced by the scanners and their configuration.

use std::fmt;

/// Smallest `max_runs` a scanner accepts.
pub const MIN_RUNS: usize = 16;

/// A scanner could not make progress within its configured limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanError {
    /// A single indivisible unit needs more runs than `max_runs` allows.
    CapacityExceeded { offset: usize, max_runs: usize },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::CapacityExceeded { offset, max_runs } => write!(
                f,
                "token at offset {offset} cannot be completed within {max_runs} runs"
            ),
        }
    }
}

impl std::error::Error for ScanError {}

/// Invalid scanner configuration; reported before any input is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    WindowTooSmall { window: usize, min: usize },
    RunLimitTooSmall { max_runs: usize, min: usize },
    InitialRunsAboveLimit { initial: usize, max_runs: usize },
    ZeroLimit { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::WindowTooSmall { window, min } => {
                write!(f, "window of {window} characters is below the minimum of {min}")
            }
            ConfigError::RunLimitTooSmall { max_runs, min } => {
                write!(f, "max_runs {max_runs} is below the minimum of {min}")
            }
            ConfigError::InitialRunsAboveLimit { initial, max_runs } => {
                write!(f, "initial_runs {initial} exceeds max_runs {max_runs}")
            }
            ConfigError::ZeroLimit { name } => write!(f, "{name} must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Shared checks for run-arena limits.
pub fn validate_runs(initial: usize, max_runs: usize) -> Result<(), ConfigError> {
    if max_runs < MIN_RUNS {
        return Err(ConfigError::RunLimitTooSmall {
            max_runs,
            min: MIN_RUNS,
        });
    }
    if initial > max_runs {
        return Err(ConfigError::InitialRunsAboveLimit { initial, max_runs });
    }
    Ok(())
}

pub fn validate_window(window: usize) -> Result<(), ConfigError> {
    if window < super::buffer::MIN_WINDOW {
        return Err(ConfigError::WindowTooSmall {
            window,
            min: super::buffer::MIN_WINDOW,
        });
    }
    Ok(())
}

pub fn validate_limit(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroLimit { name });
    }
    Ok(())
}
