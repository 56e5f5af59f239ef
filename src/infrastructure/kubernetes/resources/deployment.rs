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

use crate::domain::workload::WorkloadKind;
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::manifest::Manifest;
use crate::infrastructure::kubernetes::resources::pod::builders::containers::*;
use crate::infrastructure::kubernetes::resources::pod::{
    ConfigAccessor, EnvironmentBuilder, HttpProbes, ManifestBuilder,
};
use crate::shared::error::Result;
use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment,
};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::{info, warn};

pub struct DeploymentBuilder<'a> {
    accessor: ConfigAccessor<'a>,
}

impl<'a> DeploymentBuilder<'a> {
    pub fn new(accessor: ConfigAccessor<'a>) -> Self {
        Self { accessor }
    }

    pub fn build(&self) -> Result<Option<Deployment>> {
        if !self.is_active() {
            return Ok(None);
        }

        info!("Generating deployment...");

        let accessor = &self.accessor;
        let params = accessor.params;

        let mut main = main_container(accessor, EnvironmentBuilder::new(accessor).build());
        main.ports = container_ports(accessor);
        main.command = params
            .command_override
            .as_deref()
            .map(|command| command.split_whitespace().map(str::to_string).collect());

        if params.enable_probes {
            if let Some(probes) = HttpProbes::derive(accessor)? {
                probes.attach(&mut main, true);
            }
        }

        let mut containers = vec![main];
        containers.extend(logproxy_container(accessor));

        let mut labels = accessor.workload_labels();
        if accessor.sidecar_discovery_disabled() {
            labels.insert(LABEL_SIDECAR_DISCOVER.to_string(), "false".to_string());
        }
        if accessor.temporary() {
            labels.insert(LABEL_TEMPORARY_DEPLOYMENT.to_string(), "true".to_string());
        }

        let mut pod_labels = accessor.pod_labels();
        pod_labels.insert(LABEL_PROXY_MODE.to_string(), accessor.proxy_mode());

        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some(accessor.app_name()),
                namespace: accessor.namespace(),
                labels: Some(labels),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: accessor.replicas(),
                strategy: Some(DeploymentStrategy {
                    type_: Some(STRATEGY_TYPE_ROLLING_UPDATE.to_string()),
                    rolling_update: Some(RollingUpdateDeployment {
                        max_surge: accessor
                            .config
                            .singularity
                            .deploy_instance_count_per_step
                            .map(IntOrString::Int),
                        max_unavailable: Some(IntOrString::Int(0)),
                    }),
                }),
                min_ready_seconds: accessor.min_ready_seconds(),
                selector: LabelSelector {
                    match_labels: Some(accessor.selector_labels()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(pod_labels),
                        annotations: Some(accessor.tail_logs_annotation()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        affinity: Some(anti_affinity(accessor)),
                        image_pull_secrets: Some(image_pull_secrets(accessor)),
                        init_containers: Some(vec![
                            deployer_notifier_container(accessor),
                            vault_init_container(accessor),
                        ]),
                        containers,
                        volumes: Some(vec![vault_volume()]),
                        node_selector: Some(accessor.node_selector()),
                        service_account_name: accessor.service_account(),
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        let service_name = accessor.service_name();
        info!("Generated Kubernetes Deployment for '{}' service", service_name);
        if accessor.temporary() {
            warn!(
                "Temporary service mode enabled, please make sure to delete '{}' service once you have finished",
                service_name
            );
        }

        Ok(Some(deployment))
    }
}

impl ManifestBuilder for DeploymentBuilder<'_> {
    fn kind(&self) -> &'static str {
        "Deployment"
    }

    fn accessor(&self) -> &ConfigAccessor<'_> {
        &self.accessor
    }

    fn is_active(&self) -> bool {
        self.accessor.workload_kind() == WorkloadKind::Deployment
    }

    fn build_manifest(&self) -> Result<Option<Manifest>> {
        Ok(self.build()?.map(Manifest::Deployment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{Conventions, GenerationParams, ServiceConfig};

    const CONFIG: &str = r#"
container:
  image: quay.io/shimmur/chopper
  ports: [8088]
  labels:
    ServiceName: chopper_api
    Environment: dev
    HealthCheck: HttpGet
    HealthCheckArgs: "http://{{ host }}:{{ tcp 10007 }}/alive"
    ServicePort_8088: 10007
  env_vars:
    PLAIN: value
    SECRET: vault://secret/app?key=token
resources:
  cpus: 0.5
  memoryMb: 256
  instances: 3
singularity:
  deployInstanceCountPerStep: 2
  deployStepWaitTimeMs: 400000
  healthcheckUri: /ready
"#;

    fn build(params: GenerationParams) -> Deployment {
        let config = ServiceConfig::from_yaml_str(CONFIG).unwrap();
        let conventions = Conventions::default();
        DeploymentBuilder::new(ConfigAccessor::new(&config, &params, &conventions))
            .build()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_rolling_update_and_replicas() {
        let deployment = build(GenerationParams::new("abc123", "dev"));
        let spec = deployment.spec.unwrap();

        assert_eq!(spec.replicas, Some(3));
        assert_eq!(spec.min_ready_seconds, Some(2));
        let rolling = spec.strategy.unwrap().rolling_update.unwrap();
        assert_eq!(rolling.max_surge, Some(IntOrString::Int(2)));
        assert_eq!(rolling.max_unavailable, Some(IntOrString::Int(0)));

        let selector = spec.selector.match_labels.unwrap();
        assert_eq!(selector.len(), 2);
        assert_eq!(selector["ServiceName"], "chopper_api");
    }

    #[test]
    fn test_replica_override_wins() {
        let deployment = build(GenerationParams::new("abc123", "dev").with_instance_replicas(Some(7)));
        assert_eq!(deployment.spec.unwrap().replicas, Some(7));
    }

    #[test]
    fn test_pod_template() {
        let deployment = build(GenerationParams::new("abc123", "dev"));
        let template = deployment.spec.unwrap().template;

        let labels = template.metadata.as_ref().unwrap().labels.clone().unwrap();
        assert_eq!(labels["app"], "chopper-api");
        assert_eq!(labels["ProxyMode"], "http");
        assert_eq!(labels["release"], "abc123");

        let pod = template.spec.unwrap();
        let init_names: Vec<_> = pod.init_containers.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(init_names, vec!["deployer-notifier", "vault-init"]);
        assert_eq!(pod.containers.len(), 1);
        assert_eq!(pod.node_selector.unwrap()["Role"], "eks-default-node-group");

        let main = &pod.containers[0];
        assert_eq!(main.image.as_deref(), Some("quay.io/shimmur/chopper:abc123"));
        assert!(main.command.is_none());
        assert!(main.startup_probe.is_some());
        assert!(main.liveness_probe.is_some());
        assert!(main.readiness_probe.is_some());

        let resources = main.resources.clone().unwrap();
        let requests = resources.requests.unwrap();
        let limits = resources.limits.unwrap();
        assert_eq!(requests["cpu"].0, "500m");
        assert_eq!(limits["cpu"].0, "625m");
        assert_eq!(requests["memory"].0, "256Mi");
        assert_eq!(limits["memory"].0, "256Mi");
    }

    #[test]
    fn test_probes_can_be_disabled_and_command_overridden() {
        let deployment = build(
            GenerationParams::new("abc123", "dev")
                .with_probes(false)
                .with_command_override(Some("bin/run  --migrate".to_string())),
        );
        let pod = deployment.spec.unwrap().template.spec.unwrap();
        let main = &pod.containers[0];

        assert!(main.startup_probe.is_none());
        assert!(main.liveness_probe.is_none());
        assert_eq!(
            main.command,
            Some(vec!["bin/run".to_string(), "--migrate".to_string()])
        );
    }

    #[test]
    fn test_temporary_mode_labels() {
        let deployment = build(GenerationParams::new("abc123", "dev").with_temporary_service_mode(true));
        let labels = deployment.metadata.labels.unwrap();

        assert_eq!(deployment.metadata.name.as_deref(), Some("temporary-chopper-api"));
        assert_eq!(labels["ServiceName"], "temporary_chopper_api");
        assert_eq!(labels["TemporaryDeployment"], "true");
        assert_eq!(labels["SidecarDiscover"], "false");
    }

    #[test]
    fn test_inactive_for_scheduled_jobs() {
        let config = ServiceConfig::from_yaml_str("singularity:\n  schedule: \"* * * * *\"\n").unwrap();
        let params = GenerationParams::new("abc123", "dev");
        let conventions = Conventions::default();
        let builder = DeploymentBuilder::new(ConfigAccessor::new(&config, &params, &conventions));

        assert!(builder.build_manifest().unwrap().is_none());
    }
}
