use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ResolutionError;

const REGISTRY_DIR_NAME: &str = ".unity_skills";
const REGISTRY_FILE_NAME: &str = "registry.json";

/// Returns `~/.unity_skills/registry.json`, or `None` when no home directory
/// is configured.
pub fn default_registry_path() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"].iter().find_map(|variable| {
        let value = std::env::var(variable).ok()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(
            PathBuf::from(trimmed)
                .join(REGISTRY_DIR_NAME)
                .join(REGISTRY_FILE_NAME),
        )
    })
}

#[derive(Debug, Clone, Deserialize)]
struct RegistryEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    port: Option<Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
/// A running editor instance as recorded by the editor itself.
pub struct InstanceRecord {
    pub path: String,
    pub id: String,
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Read-only snapshot of the instance registry, ordered by project path.
pub struct InstanceRegistry {
    records: Vec<InstanceRecord>,
}

impl InstanceRegistry {
    pub fn load(path: &Path) -> Result<Self, ResolutionError> {
        if !path.exists() {
            return Err(ResolutionError::RegistryMissing {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ResolutionError::RegistryRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ResolutionError::RegistryParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses the registry document. Records without a usable port are
    /// skipped so they never shadow or break resolution of the others.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let entries: BTreeMap<String, Value> = serde_json::from_str(raw)?;
        let records = entries
            .into_iter()
            .filter_map(|(path, raw_entry)| {
                let entry = match serde_json::from_value::<RegistryEntry>(raw_entry) {
                    Ok(entry) => entry,
                    Err(error) => {
                        tracing::debug!(
                            path = %path,
                            error = %error,
                            "skipping unreadable registry record"
                        );
                        return None;
                    }
                };
                let Some(port) = entry.port.as_ref().and_then(registry_port) else {
                    tracing::debug!(
                        path = %path,
                        "skipping registry record without a usable port"
                    );
                    return None;
                };
                Some(InstanceRecord {
                    path,
                    id: entry.id.unwrap_or_default(),
                    name: entry.name.unwrap_or_default(),
                    port,
                })
            })
            .collect();
        Ok(Self { records })
    }

    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    /// Resolves an instance id or name to its port.
    ///
    /// Id matches are checked across every record before any name match, and
    /// a shared name resolves to the record with the lowest project path.
    pub fn resolve(&self, target: &str) -> Result<u16, ResolutionError> {
        let target = target.trim();
        let no_match = || ResolutionError::NoMatch {
            target: target.to_string(),
        };
        if target.is_empty() {
            return Err(no_match());
        }

        self.records
            .iter()
            .find(|record| record.id == target)
            .or_else(|| self.records.iter().find(|record| record.name == target))
            .map(|record| record.port)
            .ok_or_else(no_match)
    }
}

fn registry_port(value: &Value) -> Option<u16> {
    let port = match value {
        Value::Number(number) => number.as_u64().and_then(|port| u16::try_from(port).ok()),
        Value::String(text) => text.trim().parse::<u16>().ok(),
        _ => None,
    };
    port.filter(|port| *port != 0)
}

/// Loads the registry at `registry_path` and resolves `target` in one step.
pub fn resolve_target(registry_path: &Path, target: &str) -> Result<u16, ResolutionError> {
    let port = InstanceRegistry::load(registry_path)?.resolve(target)?;
    tracing::debug!(target_token = target, port, "resolved editor instance");
    Ok(port)
}
