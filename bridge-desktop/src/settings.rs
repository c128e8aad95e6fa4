//! JSON File Configuration
//!
//! Adapter settings ship as a flat JSON object next to the application.
//! String values are used as-is; numbers and booleans are stringified;
//! nested values are ignored.

use async_trait::async_trait;
use bridge_traits::{
    config::{ConfigurationSource, RemoteConfigSource, RemoteConfiguration, Settings},
    error::{BridgeError, Result},
};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a file, mapping "not found" to `None`.
async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(BridgeError::Io(err)),
    }
}

fn flatten(values: serde_json::Map<String, Value>) -> Settings {
    values
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    debug!(key = %key, "Skipping nested configuration value");
                    return None;
                }
            };
            Some((key, value))
        })
        .collect()
}

/// Adapter settings loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileConfigSource {
    path: PathBuf,
}

impl JsonFileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigurationSource for JsonFileConfigSource {
    async fn load(&self) -> Result<Option<Settings>> {
        let Some(contents) = read_optional(&self.path).await? else {
            debug!(path = ?self.path, "Configuration file not found");
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(values) => Ok(Some(flatten(values))),
            _ => Err(BridgeError::OperationFailed(format!(
                "Configuration file {} is not a JSON object",
                self.path.display()
            ))),
        }
    }
}

/// Remote configuration read from a local JSON file.
///
/// A missing file yields an empty configuration so the config-dependent
/// phase still runs.
#[derive(Debug, Clone)]
pub struct JsonFileRemoteConfig {
    path: PathBuf,
}

impl JsonFileRemoteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RemoteConfigSource for JsonFileRemoteConfig {
    async fn fetch(&self) -> Result<RemoteConfiguration> {
        match read_optional(&self.path).await? {
            Some(contents) => RemoteConfiguration::from_json(&contents),
            None => Ok(RemoteConfiguration::default()),
        }
    }
}
