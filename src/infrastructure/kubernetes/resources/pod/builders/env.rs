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

//! Environment variable builders for the main, vault-init and
//! deployer-notifier containers.

use crate::infrastructure::constants::DEPLOYER_NOTIFIER_FORWARDED_VAR;
use crate::infrastructure::kubernetes::resources::pod::ConfigAccessor;
use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, ObjectFieldSelector};

fn env_var(name: impl Into<String>, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.into(),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn field_ref_var(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Env of the main application container.
pub struct EnvironmentBuilder<'a> {
    accessor: &'a ConfigAccessor<'a>,
    statefulset_hostname: bool,
}

impl<'a> EnvironmentBuilder<'a> {
    pub fn new(accessor: &'a ConfigAccessor<'a>) -> Self {
        Self {
            accessor,
            statefulset_hostname: false,
        }
    }

    /// Expose the pod name as `KUBERNETES_STATEFULSET_HOSTNAME` so peers know their ordinal.
    pub fn with_statefulset_hostname(mut self) -> Self {
        self.statefulset_hostname = true;
        self
    }

    pub fn build(self) -> Vec<EnvVar> {
        let mut env_vars: Vec<EnvVar> = self
            .accessor
            .plain_vars()
            .into_iter()
            .map(|(name, value)| env_var(name, value))
            .collect();

        if self.statefulset_hostname {
            env_vars.push(field_ref_var("KUBERNETES_STATEFULSET_HOSTNAME", "metadata.name"));
        }

        // legacy vars still read by some services
        env_vars.push(env_var("SERVICE_NAME", self.accessor.service_name()));
        env_vars.push(env_var("SERVICE_VERSION", self.accessor.params.tag.clone()));
        env_vars
    }
}

/// Env handed to vault-init: every vault reference plus the file it materializes them into.
pub fn build_vault_env(accessor: &ConfigAccessor<'_>) -> Vec<EnvVar> {
    let mut env_vars: Vec<EnvVar> = accessor
        .vault_vars()
        .into_iter()
        .map(|(name, value)| env_var(name, value))
        .collect();

    env_vars.push(env_var("FILENAME", accessor.conventions.vault_env_file()));

    if accessor.needs_logproxy() {
        env_vars.push(env_var(
            "NEW_RELIC_LICENSE_KEY",
            accessor.conventions.new_relic_license_ref.clone(),
        ));
    }

    env_vars
}

pub fn build_deployer_notifier_env(accessor: &ConfigAccessor<'_>) -> Vec<EnvVar> {
    let mut env_vars: Vec<EnvVar> = accessor
        .matching_var(DEPLOYER_NOTIFIER_FORWARDED_VAR)
        .into_iter()
        .map(|(name, value)| env_var(name, value))
        .collect();

    env_vars.extend([
        env_var("SERVICE_NAME", accessor.service_name()),
        env_var("ENVIRONMENT", accessor.params.environment.clone()),
        env_var("CONTAINER_IMAGE", accessor.image()),
        env_var("RELEASE", accessor.params.tag.clone()),
        env_var("DEPLOY_USER", accessor.params.username.clone()),
    ]);

    env_vars
}
