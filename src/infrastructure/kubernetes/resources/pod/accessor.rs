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

//! Field accessors shared by every manifest builder.
//!
//! `ConfigAccessor` bundles the resolved service record, the run parameters
//! and the site conventions, and derives names, resources, env partitions and
//! scheduling hints from them.

use crate::domain::config::{Conventions, GenerationParams, ServiceConfig};
use crate::domain::workload::{exposes_service, WorkloadKind};
use crate::infrastructure::constants::*;
use crate::shared::error::{ConvertError, Result};
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TCP_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w*tcp (\d+)").expect("tcp port pattern"));
static TEMPLATE_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{.*\}\}").expect("template pattern"));

/// `ServiceName` with every underscore turned into a hyphen.
pub fn app_name_for(service_name: &str) -> String {
    service_name.replace('_', "-")
}

/// Container port behind the health check.
///
/// `HealthCheckArgs` names a service port (`tcp 10007`); the
/// `ServicePort_<containerPort>` label whose value is that service port
/// yields the container port. When several labels carry the same value the
/// last one wins.
pub fn health_check_port(config: &ServiceConfig) -> Result<i32> {
    let args = config.label(LABEL_HEALTH_CHECK_ARGS).unwrap_or_default();
    let service_port = TCP_PORT
        .captures(args)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            ConvertError::health_check(format!(
                "no 'tcp <port>' in {} '{}'",
                LABEL_HEALTH_CHECK_ARGS, args
            ))
        })?;

    let (label, container_port) = config
        .container
        .labels
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(LABEL_SERVICE_PORT_PREFIX)
                .map(|port| (key, port, value))
        })
        .filter(|(_, _, value)| value.as_str() == service_port)
        .map(|(key, port, _)| (key, port))
        .last()
        .ok_or_else(|| {
            ConvertError::health_check(format!(
                "failed to find matching service port for health check port {}",
                service_port
            ))
        })?;

    container_port
        .parse()
        .map_err(|_| ConvertError::invalid_port(label.as_str(), container_port))
}

/// CPU request in millicores.
pub fn cpu_request_millis(cores: f64) -> i64 {
    (cores * 1000.0).round() as i64
}

/// CPU limit in millicores, the request plus fixed headroom.
pub fn cpu_limit_millis(request_millis: i64) -> i64 {
    (request_millis as f64 * CPU_LIMIT_HEADROOM).round() as i64
}

/// `minReadySeconds` derived from the rolling deploy step wait.
pub fn min_ready_seconds(step_wait_ms: u64) -> i32 {
    (step_wait_ms as f64 * MIN_READY_SCALE / 1000.0).floor() as i32
}

pub fn is_vault_reference(value: &str) -> bool {
    value.contains(VAULT_SCHEME)
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigAccessor<'a> {
    pub config: &'a ServiceConfig,
    pub params: &'a GenerationParams,
    pub conventions: &'a Conventions,
    temporary: bool,
}

impl<'a> ConfigAccessor<'a> {
    pub fn new(
        config: &'a ServiceConfig,
        params: &'a GenerationParams,
        conventions: &'a Conventions,
    ) -> Self {
        Self {
            config,
            params,
            conventions,
            temporary: params.temporary_service_mode,
        }
    }

    /// Same accessor with temporary-service mode ignored.
    pub fn permanent(self) -> Self {
        Self {
            temporary: false,
            ..self
        }
    }

    pub fn temporary(&self) -> bool {
        self.temporary
    }

    pub fn workload_kind(&self) -> WorkloadKind {
        WorkloadKind::classify(self.config)
    }

    pub fn is_service(&self) -> bool {
        exposes_service(self.config)
    }

    pub fn service_name(&self) -> String {
        let name = self.config.label(LABEL_SERVICE_NAME).unwrap_or_default();
        if self.temporary {
            format!("{}{}", TEMPORARY_SERVICE_PREFIX, name)
        } else {
            name.to_string()
        }
    }

    pub fn app_name(&self) -> String {
        app_name_for(&self.service_name())
    }

    /// `<container.image>:<tag>`
    pub fn image(&self) -> String {
        format!(
            "{}:{}",
            self.config.container.image.as_deref().unwrap_or_default(),
            self.params.tag
        )
    }

    pub fn resources(&self) -> Option<ResourceRequirements> {
        let mut requests = BTreeMap::new();
        let mut limits = BTreeMap::new();

        if let Some(cpus) = self.config.resources.cpus {
            let request = cpu_request_millis(cpus);
            requests.insert("cpu".to_string(), Quantity(format!("{}m", request)));
            limits.insert(
                "cpu".to_string(),
                Quantity(format!("{}m", cpu_limit_millis(request))),
            );
        }

        if let Some(memory_mb) = self.config.resources.memory_mb {
            let memory = Quantity(format!("{}Mi", memory_mb));
            requests.insert("memory".to_string(), memory.clone());
            limits.insert("memory".to_string(), memory);
        }

        if requests.is_empty() {
            return None;
        }

        Some(ResourceRequirements {
            requests: Some(requests),
            limits: Some(limits),
            ..Default::default()
        })
    }

    pub fn replicas(&self) -> Option<i32> {
        self.params
            .instance_replicas
            .or(self.config.resources.instances)
    }

    pub fn min_ready_seconds(&self) -> Option<i32> {
        self.config
            .singularity
            .deploy_step_wait_time_ms
            .map(min_ready_seconds)
    }

    /// Env vars whose value is a vault reference, in declaration order.
    pub fn vault_vars(&self) -> Vec<(&'a str, &'a str)> {
        self.config
            .env_vars()
            .filter(|(_, value)| is_vault_reference(value))
            .collect()
    }

    /// Env vars with literal values, in declaration order.
    pub fn plain_vars(&self) -> Vec<(&'a str, &'a str)> {
        self.config
            .env_vars()
            .filter(|(_, value)| !is_vault_reference(value))
            .collect()
    }

    pub fn matching_var(&self, key: &str) -> Option<(&'a str, &'a str)> {
        self.config.env_vars().find(|(name, _)| *name == key)
    }

    /// The log relay sidecar is injected when any env var key mentions APPSIGNAL.
    pub fn needs_logproxy(&self) -> bool {
        self.config
            .env_vars()
            .any(|(key, _)| key.contains(LOGPROXY_ENV_MARKER))
    }

    pub fn relay_syslog(&self) -> bool {
        let relay = self.config.executor_var(EXECUTOR_RELAY_SYSLOG).unwrap_or("false");
        let startup_only = self
            .config
            .executor_var(EXECUTOR_RELAY_SYSLOG_STARTUP_ONLY)
            .unwrap_or("false");
        relay == "true" && startup_only != "true"
    }

    pub fn namespace(&self) -> Option<String> {
        self.config.k8s.namespace.clone()
    }

    pub fn service_account(&self) -> Option<String> {
        self.config.k8s.service_account_name.clone()
    }

    pub fn node_selector(&self) -> BTreeMap<String, String> {
        let group = self
            .config
            .k8s
            .node_selector_name
            .clone()
            .unwrap_or_else(|| self.conventions.default_node_group.clone());
        BTreeMap::from([(NODE_SELECTOR_ROLE.to_string(), group)])
    }

    /// `"false"` in temporary-service mode, otherwise the label verbatim.
    pub fn sidecar_discovery(&self) -> Option<String> {
        if self.temporary {
            return Some("false".to_string());
        }
        self.config
            .label(LABEL_SIDECAR_DISCOVER)
            .map(str::to_string)
    }

    pub fn sidecar_discovery_disabled(&self) -> bool {
        self.sidecar_discovery().as_deref() == Some("false")
    }

    pub fn proxy_mode(&self) -> String {
        self.config
            .label(LABEL_PROXY_MODE)
            .unwrap_or(DEFAULT_PROXY_MODE)
            .to_string()
    }

    pub fn http_health_check(&self) -> bool {
        self.config.label(LABEL_HEALTH_CHECK) == Some(HEALTH_CHECK_HTTP_GET)
    }

    pub fn health_check_port(&self) -> Result<i32> {
        health_check_port(self.config)
    }

    /// Path component of `HealthCheckArgs` with template expressions stubbed out.
    pub fn liveness_path(&self) -> String {
        let args = self.config.label(LABEL_HEALTH_CHECK_ARGS).unwrap_or_default();
        let url = TEMPLATE_EXPR.replace(args, "example.com");
        uri_path(&url).to_string()
    }

    pub fn healthcheck_uri(&self) -> Option<String> {
        self.config.singularity.healthcheck_uri.clone()
    }

    /// Labels shared by every workload object.
    pub fn workload_labels(&self) -> BTreeMap<String, String> {
        let mut labels = self.identity_labels();
        labels.insert(LABEL_RELEASE.to_string(), self.params.tag.clone());
        labels
    }

    /// Labels of the Service object, which carries no release.
    pub fn identity_labels(&self) -> BTreeMap<String, String> {
        let mut labels = self.selector_labels();
        labels.insert(LABEL_DEPLOY_USER.to_string(), self.params.username.clone());
        labels.insert(
            LABEL_TOOL_VERSION.to_string(),
            self.conventions.tool_version.clone(),
        );
        labels
    }

    pub fn selector_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (LABEL_SERVICE_NAME.to_string(), self.service_name()),
            (LABEL_ENVIRONMENT.to_string(), self.params.environment.clone()),
        ])
    }

    pub fn pod_labels(&self) -> BTreeMap<String, String> {
        let mut labels = self.workload_labels();
        labels.insert(LABEL_APP.to_string(), self.app_name());
        labels
    }

    pub fn tail_logs_annotation(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            ANNOTATION_TAIL_LOGS.to_string(),
            self.relay_syslog().to_string(),
        )])
    }
}

fn uri_path(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(idx) => {
            let after_scheme = &url[idx + 3..];
            match after_scheme.find(['/', '?', '#']) {
                Some(end) => &after_scheme[end..],
                None => "",
            }
        }
        None => url,
    };
    match rest.find(['?', '#']) {
        Some(end) => &rest[..end],
        None => rest,
    }
}
