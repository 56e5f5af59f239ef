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

use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::manifest::Manifest;
use crate::infrastructure::kubernetes::resources::pod::{ConfigAccessor, ManifestBuilder};
use crate::shared::error::{ConvertError, Result};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::info;

pub struct ServiceBuilder<'a> {
    accessor: ConfigAccessor<'a>,
}

impl<'a> ServiceBuilder<'a> {
    pub fn new(accessor: ConfigAccessor<'a>) -> Self {
        Self { accessor }
    }

    pub fn build(&self) -> Result<Option<Service>> {
        if !self.is_active() {
            return Ok(None);
        }

        info!("Generating service...");

        let accessor = &self.accessor;
        let service = Service {
            metadata: ObjectMeta {
                name: Some(accessor.app_name()),
                namespace: accessor.namespace(),
                labels: Some(accessor.identity_labels()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                selector: Some(accessor.selector_labels()),
                ports: Some(self.build_ports()?),
                type_: Some(SERVICE_TYPE_NODE_PORT.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        info!(
            "Generated Kubernetes Service for '{}' service",
            accessor.service_name()
        );

        Ok(Some(service))
    }

    /// One NodePort entry per `ServicePort_<containerPort>` label, in label order.
    fn build_ports(&self) -> Result<Vec<ServicePort>> {
        self.accessor
            .config
            .container
            .labels
            .iter()
            .filter(|(key, _)| key.contains(LABEL_SERVICE_PORT_PREFIX))
            .enumerate()
            .map(|(i, (key, value))| -> Result<ServicePort> {
                let invalid = || ConvertError::invalid_port(key.as_str(), value.as_str());
                let port: i32 = value.trim().parse().map_err(|_| invalid())?;
                if !(1..=65535).contains(&port) {
                    return Err(invalid());
                }
                let node_port = NODE_PORT_OFFSET.checked_add(port).ok_or_else(invalid)?;
                let target = key.rsplit('_').next().unwrap_or_default();
                let target_port: i32 = target
                    .parse()
                    .map_err(|_| ConvertError::invalid_port(key.as_str(), target))?;

                Ok(ServicePort {
                    name: Some(format!("port-{}", i)),
                    protocol: Some("TCP".to_string()),
                    port,
                    target_port: Some(IntOrString::Int(target_port)),
                    node_port: Some(node_port),
                    ..Default::default()
                })
            })
            .collect()
    }
}

impl ManifestBuilder for ServiceBuilder<'_> {
    fn kind(&self) -> &'static str {
        "Service"
    }

    fn accessor(&self) -> &ConfigAccessor<'_> {
        &self.accessor
    }

    fn is_active(&self) -> bool {
        self.accessor.is_service() && !self.accessor.temporary()
    }

    fn build_manifest(&self) -> Result<Option<Manifest>> {
        Ok(self.build()?.map(Manifest::Service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{Conventions, GenerationParams, ServiceConfig};

    const CONFIG: &str = r#"
container:
  labels:
    ServiceName: chopper_api
    ServicePort_8088: 10007
    ServicePort_9000: 10008
k8s:
  namespace: payments
"#;

    #[test]
    fn test_node_port_service() {
        let config = ServiceConfig::from_yaml_str(CONFIG).unwrap();
        let params = GenerationParams::new("v1", "dev").with_username("beowulf");
        let conventions = Conventions::default();
        let service = ServiceBuilder::new(ConfigAccessor::new(&config, &params, &conventions))
            .build()
            .unwrap()
            .unwrap();

        assert_eq!(service.metadata.name.as_deref(), Some("chopper-api"));
        assert_eq!(service.metadata.namespace.as_deref(), Some("payments"));
        let labels = service.metadata.labels.unwrap();
        assert_eq!(labels["DeployUser"], "beowulf");
        assert!(!labels.contains_key("release"));

        let spec = service.spec.unwrap();
        assert_eq!(spec.type_.as_deref(), Some("NodePort"));
        let ports = spec.ports.unwrap();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].name.as_deref(), Some("port-0"));
        assert_eq!(ports[0].port, 10007);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(8088)));
        assert_eq!(ports[0].node_port, Some(30007));
        assert_eq!(ports[1].node_port, Some(30008));
    }

    #[test]
    fn test_no_service_without_port_labels() {
        let config = ServiceConfig::from_yaml_str("container:\n  labels:\n    ServiceName: x\n").unwrap();
        let params = GenerationParams::new("v1", "dev");
        let conventions = Conventions::default();
        let builder = ServiceBuilder::new(ConfigAccessor::new(&config, &params, &conventions));

        assert!(builder.build().unwrap().is_none());
    }

    #[test]
    fn test_temporary_mode_suppresses_service() {
        let config = ServiceConfig::from_yaml_str(CONFIG).unwrap();
        let params = GenerationParams::new("v1", "dev").with_temporary_service_mode(true);
        let conventions = Conventions::default();
        let builder = ServiceBuilder::new(ConfigAccessor::new(&config, &params, &conventions));

        assert!(builder.build_manifest().unwrap().is_none());
    }

    #[test]
    fn test_non_numeric_port_label() {
        let config =
            ServiceConfig::from_yaml_str("container:\n  labels:\n    ServicePort_8088: http\n").unwrap();
        let params = GenerationParams::new("v1", "dev");
        let conventions = Conventions::default();
        let err = ServiceBuilder::new(ConfigAccessor::new(&config, &params, &conventions))
            .build()
            .unwrap_err();

        assert!(matches!(err, ConvertError::InvalidPort { .. }));
    }

    #[test]
    fn test_out_of_range_port_label() {
        let params = GenerationParams::new("v1", "dev");
        let conventions = Conventions::default();

        for value in ["2147483000", "0", "-5", "65536"] {
            let yaml = format!("container:\n  labels:\n    ServicePort_8088: '{}'\n", value);
            let config = ServiceConfig::from_yaml_str(&yaml).unwrap();
            let err = ServiceBuilder::new(ConfigAccessor::new(&config, &params, &conventions))
                .build()
                .unwrap_err();

            match err {
                ConvertError::InvalidPort { label, value: rejected } => {
                    assert_eq!(label, "ServicePort_8088");
                    assert_eq!(rejected, value);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
