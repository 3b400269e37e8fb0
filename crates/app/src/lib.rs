//! LED bank application
//!
//! The controller which drives the channel bank over a [`Transport`], records the sent
//! packets and replays them back.

use std::{fmt::Display, path::PathBuf, time::Duration};

pub use ledbank_core as core;
pub use ledbank_core::{Error as LedbankError, Result as LedbankResult, Severity, Transport};

pub use crate::{
    command::{Command, Selection},
    controller::{BulkSend, Controller, Mode},
    pacer::{CancelToken, Pacer, ThreadPacer},
    recorder::SessionRecorder,
    replay::ReplayPlayer,
};

mod command;
mod controller;
mod pacer;
mod recorder;
mod replay;

/// Default ceiling file name.
pub const DEFAULT_CONFIG_PATH: &str = "led_config.cfg";
/// Default pause between bulk send iterations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// A global application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Ceiling file used by `save` and `load` without an explicit path.
    pub config_path: PathBuf,
    /// Pause after each packet of a bulk send.
    pub interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Human readable outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub severity: Severity,
    pub message: String,
}

impl Report {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl From<LedbankError> for Report {
    fn from(err: LedbankError) -> Self {
        Self {
            severity: err.severity(),
            message: err.to_string(),
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}
