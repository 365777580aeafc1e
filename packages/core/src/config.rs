//! Console configuration
//!
//! All fields use `#[serde(default)]` so a partial (or missing) config file
//! still deserializes to sensible values.
//!
//! Config files use snake_case keys (`error_policy`), like other local settings
//! files. Records and patches exchanged with a store use camelCase
//! (`parentId`) because that is the backend wire format.

use crate::operations::ErrorPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Broadcast capacity for batch progress events.
///
/// A batch emits `n + 2` events for `n` selected ids; subscribers that fall
/// further behind than this miss events but still get the final report.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Runtime settings for a `CatalogConsole`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// What a batch does when one store call fails
    pub error_policy: ErrorPolicy,

    /// Pre-sort fetched records by `sort_order` before building the tree
    pub sort_by_sort_order: bool,

    /// Drop expanded ids that disappeared from the collection on refresh
    pub prune_expansion_on_refresh: bool,

    /// Fail a refresh on the first invalid record instead of dropping it
    pub strict_validation: bool,

    /// Capacity of the batch event broadcast channel
    pub event_channel_capacity: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::ContinueOnError,
            sort_by_sort_order: true,
            prune_expansion_on_refresh: true,
            strict_validation: false,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl ConsoleConfig {
    /// Parse from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let config: ConsoleConfig =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults if it does not exist
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {:?}: {}", path, e))?;
        Self::from_json_str(&contents)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}
