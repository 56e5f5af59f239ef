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
    ConfigAccessor, EnvironmentBuilder, ManifestBuilder,
};
use crate::shared::error::Result;
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, JobSpec, JobTemplateSpec};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::info;

/// Scheduled job: one vault-init init container, no probes, no affinity.
pub struct CronJobBuilder<'a> {
    accessor: ConfigAccessor<'a>,
}

impl<'a> CronJobBuilder<'a> {
    /// Temporary-service mode never applies to scheduled jobs.
    pub fn new(accessor: ConfigAccessor<'a>) -> Self {
        Self {
            accessor: accessor.permanent(),
        }
    }

    pub fn build(&self) -> Result<Option<CronJob>> {
        if !self.is_active() {
            return Ok(None);
        }

        info!("Generating cron job...");

        let accessor = &self.accessor;
        let config = accessor.config;

        let mut main = main_container(accessor, EnvironmentBuilder::new(accessor).build());
        main.command = config
            .container
            .command
            .as_deref()
            .map(|command| command.split_whitespace().map(str::to_string).collect());

        let mut containers = vec![main];
        containers.extend(logproxy_container(accessor));

        let mut labels = accessor.workload_labels();
        if accessor.sidecar_discovery_disabled() {
            labels.insert(LABEL_SIDECAR_DISCOVER.to_string(), "false".to_string());
        }

        let cronjob = CronJob {
            metadata: ObjectMeta {
                name: Some(accessor.app_name()),
                namespace: accessor.namespace(),
                labels: Some(labels),
                annotations: Some(accessor.tail_logs_annotation()),
                ..Default::default()
            },
            spec: Some(CronJobSpec {
                schedule: config.singularity.schedule.clone().unwrap_or_default(),
                job_template: JobTemplateSpec {
                    spec: Some(JobSpec {
                        ttl_seconds_after_finished: Some(CRONJOB_TTL_SECONDS_AFTER_FINISHED),
                        template: PodTemplateSpec {
                            spec: Some(PodSpec {
                                image_pull_secrets: Some(image_pull_secrets(accessor)),
                                init_containers: Some(vec![vault_init_container(accessor)]),
                                containers,
                                volumes: Some(vec![vault_volume()]),
                                restart_policy: Some(RESTART_POLICY_ON_FAILURE.to_string()),
                                node_selector: Some(accessor.node_selector()),
                                service_account_name: accessor.service_account(),
                                ..Default::default()
                            }),
                            ..Default::default()
                        },
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        info!(
            "Generated Kubernetes cronjob for '{}' service",
            accessor.service_name()
        );

        Ok(Some(cronjob))
    }
}

impl ManifestBuilder for CronJobBuilder<'_> {
    fn kind(&self) -> &'static str {
        "CronJob"
    }

    fn accessor(&self) -> &ConfigAccessor<'_> {
        &self.accessor
    }

    fn is_active(&self) -> bool {
        self.accessor.workload_kind() == WorkloadKind::CronJob
    }

    fn build_manifest(&self) -> Result<Option<Manifest>> {
        Ok(self.build()?.map(Manifest::CronJob))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{Conventions, GenerationParams, ServiceConfig};
    use k8s_openapi::api::core::v1::EnvVar;

    fn plain(name: &str, value: &str) -> EnvVar {
        EnvVar {
            name: name.to_string(),
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_scheduled_job() {
        let config = ServiceConfig::from_yaml_str(
            r#"
resources:
  cpus: 0.5
  memoryMb: 256
container:
  image: quay.io/shimmur/report
  command: mix run   reports.exs
  labels:
    ServiceName: x
  env_vars:
    K: v
singularity:
  schedule: "0 16 * * *"
"#,
        )
        .unwrap();
        let params = GenerationParams::new("t1", "dev").with_temporary_service_mode(true);
        let conventions = Conventions::default();
        let cronjob = CronJobBuilder::new(ConfigAccessor::new(&config, &params, &conventions))
            .build()
            .unwrap()
            .unwrap();

        assert_eq!(cronjob.metadata.name.as_deref(), Some("x"));
        let labels = cronjob.metadata.labels.unwrap();
        assert!(!labels.contains_key("SidecarDiscover"));
        assert_eq!(
            cronjob.metadata.annotations.unwrap()["community.com/TailLogs"],
            "false"
        );

        let spec = cronjob.spec.unwrap();
        assert_eq!(spec.schedule, "0 16 * * *");
        let job = spec.job_template.spec.unwrap();
        assert_eq!(job.ttl_seconds_after_finished, Some(100));

        let pod = job.template.spec.unwrap();
        assert_eq!(pod.restart_policy.as_deref(), Some("OnFailure"));
        assert!(pod.affinity.is_none());
        let init = pod.init_containers.unwrap();
        assert_eq!(init.len(), 1);
        assert_eq!(init[0].name, "vault-init");

        assert_eq!(pod.containers.len(), 1);
        let main = &pod.containers[0];
        assert_eq!(
            main.env.clone().unwrap(),
            vec![plain("K", "v"), plain("SERVICE_NAME", "x"), plain("SERVICE_VERSION", "t1")]
        );
        assert_eq!(
            main.command,
            Some(vec!["mix".to_string(), "run".to_string(), "reports.exs".to_string()])
        );
        assert!(main.liveness_probe.is_none());

        let resources = main.resources.clone().unwrap();
        assert_eq!(resources.requests.unwrap()["memory"].0, "256Mi");
        assert_eq!(resources.limits.unwrap()["memory"].0, "256Mi");
    }
}
