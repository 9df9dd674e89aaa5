use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

pub fn from_yaml_str<T: DeserializeOwned>(yaml: &str) -> anyhow::Result<T> {
    Ok(serde_yml::from_str(yaml)?)
}

/// Reads and deserializes a YAML file.
pub fn load_yaml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> anyhow::Result<T> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    from_yaml_str(&yaml).with_context(|| format!("failed to parse {}", path.display()))
}
