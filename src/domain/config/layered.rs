// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The two-level service file: a `common` record plus per-environment overlays.

use crate::domain::config::service::ServiceConfig;
use crate::shared::error::{ConvertError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LayeredConfig {
    pub common: Value,
    pub environments: IndexMap<String, Value>,
}

impl LayeredConfig {
    /// Load a service file, falling back to `<path>.yml` when the exact path is absent.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let resolved = if path.exists() {
            path.to_path_buf()
        } else {
            let mut with_ext = path.as_os_str().to_owned();
            with_ext.push(".yml");
            PathBuf::from(with_ext)
        };

        let content = read_to_string(&resolved).map_err(|e| {
            ConvertError::config_error(format!(
                "Failed to read service file {}: {}",
                resolved.display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Environment names in declaration order.
    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    /// Keys of `container.env_vars` declared by one environment overlay.
    pub fn env_var_keys(&self, environment: &str) -> Vec<String> {
        self.environments
            .get(environment)
            .and_then(|overlay| overlay.get("container"))
            .and_then(|container| container.get("env_vars"))
            .and_then(Value::as_mapping)
            .map(|vars| vars.keys().filter_map(key_to_string).collect())
            .unwrap_or_default()
    }

    /// Deep-merge the named overlay onto `common` and parse the result.
    pub fn resolve(&self, environment: &str) -> Result<ServiceConfig> {
        let overlay = self.environments.get(environment).ok_or_else(|| {
            ConvertError::config_error(format!(
                "Environment '{}' is not declared (available: {})",
                environment,
                self.environment_names().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let mut merged = match &self.common {
            Value::Null => Value::Mapping(Mapping::new()),
            common => common.clone(),
        };
        deep_merge(&mut merged, overlay);

        ServiceConfig::from_value(merged)
    }
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Merge `overlay` into `base`.
///
/// Mappings merge key by key, sequences are unioned with base order kept and
/// new overlay items appended, any other overlay value replaces the base.
/// A null overlay value never clears what the base holds.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        if !overlay_value.is_null() {
                            base_map.insert(key.clone(), overlay_value.clone());
                        }
                    }
                }
            }
        }
        (Value::Sequence(base_seq), Value::Sequence(overlay_seq)) => {
            for item in overlay_seq {
                if !base_seq.contains(item) {
                    base_seq.push(item.clone());
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
