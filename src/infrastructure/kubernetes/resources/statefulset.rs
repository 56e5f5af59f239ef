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
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec, StatefulSetUpdateStrategy};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use tracing::info;

pub struct StatefulSetBuilder<'a> {
    accessor: ConfigAccessor<'a>,
}

impl<'a> StatefulSetBuilder<'a> {
    /// Temporary-service mode never applies to stateful sets.
    pub fn new(accessor: ConfigAccessor<'a>) -> Self {
        Self {
            accessor: accessor.permanent(),
        }
    }

    pub fn build(&self) -> Result<Option<StatefulSet>> {
        if !self.is_active() {
            return Ok(None);
        }

        info!("Generating statefulset...");

        let accessor = &self.accessor;

        let env = EnvironmentBuilder::new(accessor)
            .with_statefulset_hostname()
            .build();
        let mut main = main_container(accessor, env);
        main.ports = container_ports(accessor);

        // probes are not gated by enable_probes here and there is no startup probe
        if let Some(probes) = HttpProbes::derive(accessor)? {
            probes.attach(&mut main, false);
        }

        let mut containers = vec![main];
        containers.extend(logproxy_container(accessor));

        let statefulset = StatefulSet {
            metadata: ObjectMeta {
                name: Some(accessor.app_name()),
                namespace: accessor.namespace(),
                labels: Some(accessor.workload_labels()),
                ..Default::default()
            },
            spec: Some(StatefulSetSpec {
                service_name: accessor.service_name(),
                replicas: accessor.replicas(),
                update_strategy: Some(StatefulSetUpdateStrategy {
                    type_: Some(STRATEGY_TYPE_ROLLING_UPDATE.to_string()),
                    ..Default::default()
                }),
                min_ready_seconds: accessor.min_ready_seconds(),
                selector: LabelSelector {
                    match_labels: Some(accessor.selector_labels()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(accessor.pod_labels()),
                        annotations: Some(accessor.tail_logs_annotation()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        affinity: Some(anti_affinity(accessor)),
                        image_pull_secrets: Some(image_pull_secrets(accessor)),
                        init_containers: Some(vec![vault_init_container(accessor)]),
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

        info!(
            "Generated Kubernetes StatefulSet for '{}' service",
            accessor.service_name()
        );

        Ok(Some(statefulset))
    }
}

impl ManifestBuilder for StatefulSetBuilder<'_> {
    fn kind(&self) -> &'static str {
        "StatefulSet"
    }

    fn accessor(&self) -> &ConfigAccessor<'_> {
        &self.accessor
    }

    fn is_active(&self) -> bool {
        self.accessor.workload_kind() == WorkloadKind::StatefulSet
    }

    fn build_manifest(&self) -> Result<Option<Manifest>> {
        Ok(self.build()?.map(Manifest::StatefulSet))
    }
}
