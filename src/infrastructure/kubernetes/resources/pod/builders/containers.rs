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

//! Sidecar and init containers plus the pod-level pieces every workload shares.

use super::env::{build_deployer_notifier_env, build_vault_env};
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::pod::ConfigAccessor;
use k8s_openapi::api::core::v1::{
    Affinity, Capabilities, Container, ContainerPort, EmptyDirVolumeSource, EnvVar,
    LocalObjectReference, PodAffinityTerm, PodAntiAffinity, SecurityContext, Volume, VolumeMount,
    WeightedPodAffinityTerm,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};

pub fn vault_volume() -> Volume {
    Volume {
        name: VOLUME_NAME_VAULT_VARS.to_string(),
        empty_dir: Some(EmptyDirVolumeSource::default()),
        ..Default::default()
    }
}

pub fn vault_volume_mount(accessor: &ConfigAccessor<'_>) -> VolumeMount {
    VolumeMount {
        name: VOLUME_NAME_VAULT_VARS.to_string(),
        mount_path: accessor.conventions.vault_var_path.clone(),
        ..Default::default()
    }
}

pub fn image_pull_secrets(accessor: &ConfigAccessor<'_>) -> Vec<LocalObjectReference> {
    vec![LocalObjectReference {
        name: accessor.conventions.image_pull_secret.clone(),
    }]
}

pub fn vault_init_container(accessor: &ConfigAccessor<'_>) -> Container {
    Container {
        name: CONTAINER_NAME_VAULT_INIT.to_string(),
        image: Some(accessor.conventions.vault_init_image.clone()),
        volume_mounts: Some(vec![vault_volume_mount(accessor)]),
        env: Some(build_vault_env(accessor)),
        command: Some(vec![VAULT_INIT_COMMAND.to_string()]),
        ..Default::default()
    }
}

pub fn deployer_notifier_container(accessor: &ConfigAccessor<'_>) -> Container {
    Container {
        name: CONTAINER_NAME_DEPLOYER_NOTIFIER.to_string(),
        image: Some(accessor.conventions.deployer_notifier_image.clone()),
        env: Some(build_deployer_notifier_env(accessor)),
        ..Default::default()
    }
}

/// Log relay sidecar, present only when the service needs it.
pub fn logproxy_container(accessor: &ConfigAccessor<'_>) -> Option<Container> {
    if !accessor.needs_logproxy() {
        return None;
    }

    Some(Container {
        name: CONTAINER_NAME_LOGPROXY.to_string(),
        image: Some(accessor.conventions.logproxy_image.clone()),
        volume_mounts: Some(vec![vault_volume_mount(accessor)]),
        security_context: Some(SecurityContext {
            capabilities: Some(Capabilities {
                add: Some(vec![CAPABILITY_NET_ADMIN.to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        }),
        env: Some(vec![
            EnvVar {
                name: "NEW_RELIC_ACCOUNT".to_string(),
                value: Some(accessor.conventions.new_relic_account.clone()),
                ..Default::default()
            },
            EnvVar {
                name: "LOGHOST".to_string(),
                value: Some(accessor.conventions.logproxy_log_host.clone()),
                ..Default::default()
            },
        ]),
        ..Default::default()
    })
}

/// The application container without probes or command; callers fill those in.
pub fn main_container(accessor: &ConfigAccessor<'_>, env: Vec<EnvVar>) -> Container {
    Container {
        name: accessor.app_name(),
        image: Some(accessor.image()),
        resources: accessor.resources(),
        env: Some(env),
        volume_mounts: Some(vec![vault_volume_mount(accessor)]),
        ..Default::default()
    }
}

/// `port-<i>` entries from `container.ports`.
pub fn container_ports(accessor: &ConfigAccessor<'_>) -> Option<Vec<ContainerPort>> {
    let ports = accessor.config.container.ports.as_ref()?;
    if ports.is_empty() {
        return None;
    }

    Some(
        ports
            .iter()
            .enumerate()
            .map(|(i, port)| ContainerPort {
                name: Some(format!("port-{}", i)),
                container_port: *port,
                ..Default::default()
            })
            .collect(),
    )
}

/// Soft preference against co-scheduling pods of the same service on one host.
pub fn anti_affinity(accessor: &ConfigAccessor<'_>) -> Affinity {
    Affinity {
        pod_anti_affinity: Some(PodAntiAffinity {
            preferred_during_scheduling_ignored_during_execution: Some(vec![
                WeightedPodAffinityTerm {
                    weight: ANTI_AFFINITY_WEIGHT,
                    pod_affinity_term: PodAffinityTerm {
                        label_selector: Some(LabelSelector {
                            match_expressions: Some(vec![LabelSelectorRequirement {
                                key: LABEL_SERVICE_NAME.to_string(),
                                operator: "In".to_string(),
                                values: Some(vec![accessor.service_name()]),
                            }]),
                            ..Default::default()
                        }),
                        topology_key: TOPOLOGY_KEY_HOSTNAME.to_string(),
                        ..Default::default()
                    },
                },
            ]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{Conventions, GenerationParams, ServiceConfig};

    #[test]
    fn test_logproxy_only_for_appsignal_services() {
        let plain = ServiceConfig::from_yaml_str("container:\n  env_vars:\n    A: b\n").unwrap();
        let elixir =
            ServiceConfig::from_yaml_str("container:\n  env_vars:\n    APPSIGNAL_PUSH_API_KEY: k\n")
                .unwrap();
        let params = GenerationParams::new("v1", "dev");
        let conventions = Conventions::default();

        assert!(logproxy_container(&ConfigAccessor::new(&plain, &params, &conventions)).is_none());

        let sidecar = logproxy_container(&ConfigAccessor::new(&elixir, &params, &conventions))
            .expect("sidecar");
        assert_eq!(sidecar.image.as_deref(), Some(DEFAULT_LOGPROXY_IMAGE));
        let added = sidecar
            .security_context
            .and_then(|ctx| ctx.capabilities)
            .and_then(|caps| caps.add)
            .unwrap_or_default();
        assert_eq!(added, vec!["NET_ADMIN"]);
        assert_eq!(sidecar.env.map(|env| env.len()), Some(2));
    }

    #[test]
    fn test_container_ports_are_named_by_index() {
        let config = ServiceConfig::from_yaml_str("container:\n  ports: [8088, 9000]\n").unwrap();
        let params = GenerationParams::new("v1", "dev");
        let conventions = Conventions::default();
        let ports = container_ports(&ConfigAccessor::new(&config, &params, &conventions)).unwrap();

        assert_eq!(ports[1].name.as_deref(), Some("port-1"));
        assert_eq!(ports[1].container_port, 9000);
    }

    #[test]
    fn test_vault_init_runs_init_command() {
        let config = ServiceConfig::default();
        let params = GenerationParams::new("v1", "dev");
        let conventions = Conventions::default();
        let init = vault_init_container(&ConfigAccessor::new(&config, &params, &conventions));

        assert_eq!(init.command, Some(vec!["/vault-init".to_string()]));
        assert_eq!(init.volume_mounts.unwrap()[0].mount_path, "/vault");
    }
}
