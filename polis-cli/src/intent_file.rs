use polis_core::{Intent, IntentKey, IntentSpec, PolisError};
use serde::{Deserialize, Serialize};

/// On-disk shape of an intent-source file: a flat list of named specs.
/// The real controller's declarative-object store is out of scope; this
/// is the file-backed stand-in the CLI reads to seed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentFileEntry {
    pub namespace: String,
    pub name: String,
    #[serde(flatten)]
    pub spec: IntentSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentFile {
    pub intents: Vec<IntentFileEntry>,
}

impl IntentFile {
    pub fn load_from_file(path: &str) -> Result<Self, PolisError> {
        let content = std::fs::read_to_string(path).map_err(PolisError::Io)?;

        if path.ends_with(".yaml") || path.ends_with(".yml") {
            serde_yaml::from_str(&content)
                .map_err(|e| PolisError::Config(format!("failed to parse YAML: {}", e)))
        } else if path.ends_with(".toml") {
            toml::from_str(&content).map_err(|e| PolisError::Config(format!("failed to parse TOML: {}", e)))
        } else if path.ends_with(".json") {
            serde_json::from_str(&content).map_err(PolisError::Serialization)
        } else {
            Err(PolisError::Config(format!(
                "unsupported intent file format: {}",
                path
            )))
        }
    }

    pub fn into_intents(self) -> Vec<Intent> {
        self.intents
            .into_iter()
            .map(|entry| Intent::new(IntentKey::new(entry.namespace, entry.name), entry.spec))
            .collect()
    }

    /// Shape-validates every entry, returning the first failure prefixed
    /// with the offending intent's key.
    pub fn validate(&self) -> Result<(), String> {
        for entry in &self.intents {
            entry
                .spec
                .validate_shape()
                .map_err(|reason| format!("{}/{}: {}", entry.namespace, entry.name, reason))?;
        }
        Ok(())
    }
}
