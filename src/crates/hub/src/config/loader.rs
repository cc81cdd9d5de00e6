//! YAML configuration loader with include and environment variable support
//!
//! - `$include: other.yaml` replaces a mapping with the named file's content
//!   (resolved relative to the including file)
//! - `${ENV_VAR}` and `${ENV_VAR:default}` are expanded inside strings
//! - [`load_layered_yaml_config`] applies [`deep_merge`] to stack files,
//!   later ones winning

use crate::{HubError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Includes deeper than this are treated as a cycle.
const MAX_INCLUDE_DEPTH: usize = 16;

/// Load a YAML file, resolving includes and expanding variables.
pub fn load_yaml_file<P: AsRef<Path>>(path: P) -> Result<YamlValue> {
    load_with_depth(path.as_ref(), 0)
}

/// Load a YAML file and deserialize it into `T`.
pub fn load_yaml_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let yaml = load_yaml_file(path)?;
    let json = yaml_to_json(&yaml)?;

    serde_json::from_value(json)
        .map_err(|e| HubError::Config(format!("Failed to deserialize configuration: {}", e)))
}

/// Load several YAML files, merge each over the previous one, and
/// deserialize the result into `T`.
pub fn load_layered_yaml_config<T: DeserializeOwned, P: AsRef<Path>>(paths: &[P]) -> Result<T> {
    let mut merged = YamlValue::Mapping(Default::default());
    for path in paths {
        deep_merge(&mut merged, &load_yaml_file(path)?);
    }
    let json = yaml_to_json(&merged)?;

    serde_json::from_value(json)
        .map_err(|e| HubError::Config(format!("Failed to deserialize configuration: {}", e)))
}

fn load_with_depth(path: &Path, depth: usize) -> Result<YamlValue> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(HubError::Config(format!(
            "Includes nested too deeply at {:?}",
            path
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| HubError::Config(format!("Failed to read YAML file {:?}: {}", path, e)))?;

    // An empty document is an empty mapping, so every section falls back to defaults.
    let mut value: YamlValue = if content.trim().is_empty() {
        YamlValue::Mapping(Default::default())
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| HubError::Config(format!("Failed to parse YAML file {:?}: {}", path, e)))?
    };

    let base_dir = path
        .parent()
        .ok_or_else(|| HubError::Config(format!("Invalid file path {:?}", path)))?;

    process_includes(&mut value, base_dir, depth)?;
    expand_variables(&mut value);

    Ok(value)
}

fn process_includes(value: &mut YamlValue, base_dir: &Path, depth: usize) -> Result<()> {
    match value {
        YamlValue::Mapping(map) => {
            if let Some(YamlValue::String(include)) = map.get("$include") {
                let include_path = base_dir.join(include);
                *value = load_with_depth(&include_path, depth + 1)?;
                return Ok(());
            }

            for (_, v) in map.iter_mut() {
                process_includes(v, base_dir, depth)?;
            }
        }
        YamlValue::Sequence(seq) => {
            for item in seq.iter_mut() {
                process_includes(item, base_dir, depth)?;
            }
        }
        _ => {}
    }

    Ok(())
}

fn expand_variables(value: &mut YamlValue) {
    match value {
        YamlValue::String(s) => {
            if let Some(expanded) = expand_env_in_string(s) {
                *s = expanded;
            }
        }
        YamlValue::Mapping(map) => {
            for (_, v) in map.iter_mut() {
                expand_variables(v);
            }
        }
        YamlValue::Sequence(seq) => {
            for item in seq.iter_mut() {
                expand_variables(item);
            }
        }
        _ => {}
    }
}

fn env_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([^:}]+)(?::([^}]*))?\}").ok())
        .as_ref()
}

/// Expand `${VAR}` / `${VAR:default}`; `None` when the string has no references.
fn expand_env_in_string(s: &str) -> Option<String> {
    if !s.contains("${") {
        return None;
    }

    let expanded = env_pattern()?.replace_all(s, |caps: &regex::Captures| {
        let default = caps.get(2).map_or("", |m| m.as_str());
        env::var(&caps[1]).unwrap_or_else(|_| default.to_string())
    });
    Some(expanded.into_owned())
}

/// Convert YAML to JSON for deserialization through serde_json.
fn yaml_to_json(yaml: &YamlValue) -> Result<JsonValue> {
    match yaml {
        YamlValue::Null => Ok(JsonValue::Null),
        YamlValue::Bool(b) => Ok(JsonValue::Bool(*b)),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(JsonValue::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(JsonValue::Number(u.into()))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(JsonValue::Number)
                    .ok_or_else(|| HubError::Config(format!("Invalid number: {}", n)))
            }
        }
        YamlValue::String(s) => Ok(JsonValue::String(s.clone())),
        YamlValue::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json)
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array),
        YamlValue::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    YamlValue::String(s) => s.clone(),
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Bool(b) => b.to_string(),
                    _ => return Err(HubError::Config("Map keys must be scalars".to_string())),
                };
                json_map.insert(key, yaml_to_json(v)?);
            }
            Ok(JsonValue::Object(json_map))
        }
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}

/// Merge `other` into `base`: mappings merge key by key, anything else is
/// replaced.
pub fn deep_merge(base: &mut YamlValue, other: &YamlValue) {
    match (base, other) {
        (YamlValue::Mapping(base_map), YamlValue::Mapping(other_map)) => {
            for (key, other_value) in other_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, other_value),
                    None => {
                        base_map.insert(key.clone(), other_value.clone());
                    }
                }
            }
        }
        (base, other) => *base = other.clone(),
    }
}
