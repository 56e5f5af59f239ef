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

//! Typed view of one resolved environment record of an nmesos service file.
//!
//! Every field is optional: the structural validator reports what is missing,
//! the builders only read what is there.

use crate::shared::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// Ordered string map, used for labels and env vars.
pub type ScalarMap = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub container: ContainerConfig,
    pub resources: ResourcesConfig,
    pub singularity: SingularityConfig,
    pub executor: ExecutorConfig,
    pub k8s: K8sConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub image: Option<String>,
    pub ports: Option<Vec<i32>>,
    #[serde(deserialize_with = "deserialize_scalar_map")]
    pub labels: ScalarMap,
    #[serde(deserialize_with = "deserialize_optional_scalar_map")]
    pub env_vars: Option<ScalarMap>,
    pub command: Option<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub deploy_freeze: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub kubernetes_unfreeze: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourcesConfig {
    pub cpus: Option<f64>,
    pub memory_mb: Option<u64>,
    pub instances: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SingularityConfig {
    pub schedule: Option<String>,
    pub deploy_instance_count_per_step: Option<i32>,
    pub deploy_step_wait_time_ms: Option<u64>,
    pub healthcheck_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    #[serde(deserialize_with = "deserialize_scalar_map")]
    pub env_vars: ScalarMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct K8sConfig {
    pub namespace: Option<String>,
    pub service_account_name: Option<String>,
    pub node_selector_name: Option<String>,
    pub workload_type: Option<String>,
}

impl ServiceConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_yaml::from_value(value)?)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.container.labels.get(key).map(String::as_str)
    }

    pub fn env_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.container
            .env_vars
            .iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn executor_var(&self, key: &str) -> Option<&str> {
        self.executor.env_vars.get(key).map(String::as_str)
    }
}

/// Renders a YAML scalar the way it reads in the source file.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn to_scalar_map<E: serde::de::Error>(
    raw: IndexMap<String, Value>,
) -> std::result::Result<ScalarMap, E> {
    raw.into_iter()
        .map(|(key, value)| match scalar_to_string(&value) {
            Some(s) => Ok((key, s)),
            None => Err(E::custom(format!("value of '{}' must be a scalar", key))),
        })
        .collect()
}

fn deserialize_scalar_map<'de, D>(deserializer: D) -> std::result::Result<ScalarMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    to_scalar_map::<D::Error>(raw.unwrap_or_default())
}

fn deserialize_optional_scalar_map<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<ScalarMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.map(to_scalar_map::<D::Error>).transpose()
}

// Anything other than null, false or an empty string counts as set.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let config = ServiceConfig::from_yaml_str(
            r#"
container:
  image: quay.io/shimmur/chopper
  ports: [8088]
  labels:
    ServiceName: chopper
    ServicePort_8088: 10007
  env_vars:
    BEOWULF: hrunting
    ENABLED: true
resources:
  cpus: 1
  memoryMb: 256
  instances: 2
singularity:
  deployInstanceCountPerStep: 1
  deployStepWaitTimeMs: 1000
  healthcheckUri: /health-check
  autoAdvanceDeploySteps: true
k8s:
  workload_type: statefulset
"#,
        )
        .unwrap();

        assert_eq!(config.container.image.as_deref(), Some("quay.io/shimmur/chopper"));
        assert_eq!(config.label("ServicePort_8088"), Some("10007"));
        assert_eq!(config.resources.cpus, Some(1.0));
        assert_eq!(config.resources.memory_mb, Some(256));
        assert_eq!(config.singularity.deploy_step_wait_time_ms, Some(1000));
        assert_eq!(config.k8s.workload_type.as_deref(), Some("statefulset"));

        let vars: Vec<_> = config.env_vars().collect();
        assert_eq!(vars, vec![("BEOWULF", "hrunting"), ("ENABLED", "true")]);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let config = ServiceConfig::from_yaml_str("container:\n  labels:\n    ServiceName: x\n").unwrap();

        assert!(config.container.env_vars.is_none());
        assert!(config.container.ports.is_none());
        assert!(!config.container.deploy_freeze);
        assert_eq!(config.env_vars().count(), 0);
    }

    #[test]
    fn test_deploy_freeze_flag_truthiness() {
        let frozen = ServiceConfig::from_yaml_str("container:\n  deploy_freeze: yes please\n").unwrap();
        assert!(frozen.container.deploy_freeze);

        let thawed = ServiceConfig::from_yaml_str("container:\n  deploy_freeze: false\n").unwrap();
        assert!(!thawed.container.deploy_freeze);
    }

    #[test]
    fn test_nested_env_value_is_rejected() {
        let result = ServiceConfig::from_yaml_str("container:\n  env_vars:\n    BAD:\n      nested: 1\n");
        assert!(result.is_err());
    }
}
