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

//! Site conventions baked into every generated manifest: sidecar images,
//! syslog relay target, default node group.

use crate::infrastructure::constants::*;
use crate::shared::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::read_to_string;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Conventions {
    pub vault_init_image: String,
    pub vault_var_path: String,
    pub logproxy_image: String,
    pub logproxy_log_host: String,
    pub new_relic_account: String,
    pub new_relic_license_ref: String,
    pub default_node_group: String,
    pub deployer_notifier_image: String,
    pub image_pull_secret: String,
    pub tool_version: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            vault_init_image: DEFAULT_VAULT_INIT_IMAGE.to_string(),
            vault_var_path: DEFAULT_VAULT_VAR_PATH.to_string(),
            logproxy_image: DEFAULT_LOGPROXY_IMAGE.to_string(),
            logproxy_log_host: DEFAULT_LOGPROXY_LOG_HOST.to_string(),
            new_relic_account: DEFAULT_NEW_RELIC_ACCOUNT.to_string(),
            new_relic_license_ref: DEFAULT_NEW_RELIC_LICENSE_REF.to_string(),
            default_node_group: DEFAULT_NODE_GROUP.to_string(),
            deployer_notifier_image: DEFAULT_DEPLOYER_NOTIFIER_IMAGE.to_string(),
            image_pull_secret: DEFAULT_IMAGE_PULL_SECRET.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Conventions {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            ConvertError::config_error(format!(
                "Failed to read conventions file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Path of the env file the vault-init container writes into the shared volume.
    pub fn vault_env_file(&self) -> String {
        format!(
            "{}/{}",
            self.vault_var_path.trim_end_matches('/'),
            VAULT_ENV_FILE_NAME
        )
    }

    /// Apply `-D key=value` properties. Unknown keys are rejected.
    pub fn apply_overrides(&mut self, properties: &HashMap<String, String>) -> Result<()> {
        for (key, value) in properties {
            let slot = match key.as_str() {
                "vault.init-image" => &mut self.vault_init_image,
                "vault.var-path" => &mut self.vault_var_path,
                "logproxy.image" => &mut self.logproxy_image,
                "logproxy.log-host" => &mut self.logproxy_log_host,
                "newrelic.account" => &mut self.new_relic_account,
                "newrelic.license-ref" => &mut self.new_relic_license_ref,
                "node.default-group" => &mut self.default_node_group,
                "deployer-notifier.image" => &mut self.deployer_notifier_image,
                "image.pull-secret" => &mut self.image_pull_secret,
                "tool.version" => &mut self.tool_version,
                other => {
                    return Err(ConvertError::config_error(format!(
                        "Unknown convention property '{}'",
                        other
                    )))
                }
            };
            *slot = value.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_historical_values() {
        let conventions = Conventions::default();
        assert_eq!(conventions.vault_init_image, "quay.io/shimmur/vault-init:3ffae66");
        assert_eq!(conventions.default_node_group, "eks-default-node-group");
        assert_eq!(conventions.vault_env_file(), "/vault/.init-env");
    }

    #[test]
    fn test_partial_toml_keeps_remaining_defaults() {
        let conventions = Conventions::from_toml_str(
            r#"
logproxy-image = "registry.local/logproxy:1"
vault-var-path = "/secrets/"
"#,
        )
        .unwrap();

        assert_eq!(conventions.logproxy_image, "registry.local/logproxy:1");
        assert_eq!(conventions.vault_env_file(), "/secrets/.init-env");
        assert_eq!(conventions.new_relic_account, DEFAULT_NEW_RELIC_ACCOUNT);
    }

    #[test]
    fn test_apply_overrides() {
        let mut conventions = Conventions::default();
        let mut properties = HashMap::new();
        properties.insert("node.default-group".to_string(), "batch".to_string());
        properties.insert("tool.version".to_string(), "9.9.9".to_string());

        conventions.apply_overrides(&properties).unwrap();
        assert_eq!(conventions.default_node_group, "batch");
        assert_eq!(conventions.tool_version, "9.9.9");

        properties.insert("no.such.key".to_string(), "x".to_string());
        let err = conventions.apply_overrides(&properties).unwrap_err();
        assert!(err.to_string().contains("no.such.key"));
    }
}
