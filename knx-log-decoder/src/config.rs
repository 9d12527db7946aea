//! Monitor configuration types
//!
//! This module defines the minimal configuration needed by the decoder library.
//! Connection targets and logging are handled by the application layer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the telegram monitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Optional ETS group address export used for names and datapoint types
    #[serde(default)]
    pub group_file: Option<PathBuf>,

    /// Stop after this many telegrams (default: run until the bus fails)
    #[serde(default)]
    pub max_telegrams: Option<usize>,
}

impl MonitorConfig {
    /// Create a new monitor configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the group address file
    pub fn with_group_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.group_file = Some(path.into());
        self
    }

    /// Builder method: limit the number of telegrams processed
    pub fn with_max_telegrams(mut self, count: usize) -> Self {
        self.max_telegrams = Some(count);
        self
    }

    /// Check if another telegram should be processed after `processed` ones
    pub fn should_continue(&self, processed: usize) -> bool {
        match self.max_telegrams {
            Some(limit) => processed < limit,
            None => true,
        }
    }
}
