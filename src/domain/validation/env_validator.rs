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

//! Structural checks on one resolved environment record.

use super::Validate;
use crate::domain::config::ServiceConfig;
use crate::domain::workload::WorkloadKind;
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::pod::accessor::health_check_port;
use regex::Regex;
use std::sync::LazyLock;

static TEMPLATE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[{} ]+|tcp").expect("template noise pattern"));
static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([^@/?#]*@)?[^@/?#:\[\]]+").expect("http url pattern")
});

type FieldCheck = (&'static str, fn(&ServiceConfig) -> bool);

const LONG_RUNNING_REQUIRED: &[FieldCheck] = &[
    ("container.env_vars", |c| c.container.env_vars.is_some()),
    ("container.image", |c| filled(c.container.image.as_deref())),
    ("container.labels.HealthCheck", |c| filled(c.label(LABEL_HEALTH_CHECK))),
    ("container.labels.ServiceName", |c| filled(c.label(LABEL_SERVICE_NAME))),
    ("container.labels.Environment", |c| filled(c.label(LABEL_ENVIRONMENT))),
    ("container.ports", |c| c.container.ports.is_some()),
    ("resources.cpus", |c| c.resources.cpus.is_some()),
    ("resources.instances", |c| c.resources.instances.is_some()),
    ("resources.memoryMb", |c| c.resources.memory_mb.is_some()),
    ("singularity.deployInstanceCountPerStep", |c| {
        c.singularity.deploy_instance_count_per_step.is_some()
    }),
    ("singularity.deployStepWaitTimeMs", |c| {
        c.singularity.deploy_step_wait_time_ms.is_some()
    }),
];

const SCHEDULED_JOB_REQUIRED: &[FieldCheck] = &[
    ("singularity.schedule", |c| filled(c.singularity.schedule.as_deref())),
    ("container.image", |c| filled(c.container.image.as_deref())),
    ("container.labels.ServiceName", |c| filled(c.label(LABEL_SERVICE_NAME))),
    ("container.labels.Environment", |c| filled(c.label(LABEL_ENVIRONMENT))),
    ("resources.cpus", |c| c.resources.cpus.is_some()),
    ("resources.memoryMb", |c| c.resources.memory_mb.is_some()),
];

fn filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

pub struct EnvValidator<'a> {
    config: &'a ServiceConfig,
}

impl<'a> EnvValidator<'a> {
    pub fn new(config: &'a ServiceConfig) -> Self {
        Self { config }
    }

    fn missing(&self, checks: &[FieldCheck]) -> Vec<String> {
        checks
            .iter()
            .filter(|(_, present)| !present(self.config))
            .map(|(path, _)| format!("{} is missing", path))
            .collect()
    }

    fn validate_service(&self) -> Vec<String> {
        let mut errors = self.missing(LONG_RUNNING_REQUIRED);
        if let Some(error) = self.validate_health_check() {
            errors.push(error);
        }
        errors
    }

    fn validate_statefulset(&self) -> Vec<String> {
        self.missing(LONG_RUNNING_REQUIRED)
    }

    fn validate_scheduled_job(&self) -> Vec<String> {
        let mut errors = self.missing(SCHEDULED_JOB_REQUIRED);
        if filled(self.config.label(LABEL_HEALTH_CHECK)) {
            errors.push(format!(
                "container.labels.{} must not be set for scheduled jobs",
                LABEL_HEALTH_CHECK
            ));
        }
        errors
    }

    fn validate_health_check(&self) -> Option<String> {
        // an empty value is already reported by the checklist
        let health_check = self
            .config
            .label(LABEL_HEALTH_CHECK)
            .filter(|value| !value.is_empty())?;

        if health_check != HEALTH_CHECK_HTTP_GET && health_check != HEALTH_CHECK_ALWAYS_SUCCESSFUL {
            return Some(format!(
                "container.labels.{} must be either {} or {} for services",
                LABEL_HEALTH_CHECK, HEALTH_CHECK_HTTP_GET, HEALTH_CHECK_ALWAYS_SUCCESSFUL
            ));
        }

        if health_check == HEALTH_CHECK_HTTP_GET {
            let Some(args) = self.config.label(LABEL_HEALTH_CHECK_ARGS) else {
                return Some(format!(
                    "container.labels.{} must be defined for HTTP health checks",
                    LABEL_HEALTH_CHECK_ARGS
                ));
            };

            if !is_sidecar_http_url(args) {
                return Some(format!(
                    "container.labels.{} must be a valid Sidecar-style HTTP or HTTPS URL",
                    LABEL_HEALTH_CHECK_ARGS
                ));
            }

            if let Err(err) = health_check_port(self.config) {
                return Some(err.to_string());
            }
        }

        None
    }
}

/// `http://{{ host }}:{{ tcp 10007 }}/health-check` is valid once the
/// template braces, spaces and the `tcp` token are stripped.
fn is_sidecar_http_url(args: &str) -> bool {
    let stripped = TEMPLATE_NOISE.replace_all(args, "");
    HTTP_URL.is_match(&stripped)
}

impl Validate for EnvValidator<'_> {
    fn name(&self) -> &'static str {
        "env"
    }

    fn validate(&self) -> Vec<String> {
        if self.config.container.deploy_freeze && !self.config.container.kubernetes_unfreeze {
            return vec!["container.deploy_freeze prevents deployment".to_string()];
        }

        match WorkloadKind::classify(self.config) {
            WorkloadKind::CronJob => self.validate_scheduled_job(),
            WorkloadKind::StatefulSet => self.validate_statefulset(),
            WorkloadKind::Deployment => self.validate_service(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(yaml: &str) -> Vec<String> {
        let config = ServiceConfig::from_yaml_str(yaml).unwrap();
        EnvValidator::new(&config).validate()
    }

    #[test]
    fn test_deploy_freeze_short_circuits() {
        let errors = validate("container:\n  deploy_freeze: true\n");
        assert_eq!(errors, vec!["container.deploy_freeze prevents deployment"]);
    }

    #[test]
    fn test_kubernetes_unfreeze_lifts_freeze() {
        let errors = validate("container:\n  deploy_freeze: true\n  kubernetes_unfreeze: true\n");
        assert!(errors.iter().all(|e| !e.contains("deploy_freeze")));
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_service_reports_every_missing_field() {
        let errors = validate("container:\n  labels:\n    ServicePort_8800: '4000'\n");
        assert_eq!(errors.len(), 11);
        assert!(errors.contains(&"singularity.deployStepWaitTimeMs is missing".to_string()));
        assert!(errors.contains(&"container.labels.HealthCheck is missing".to_string()));
    }

    #[test]
    fn test_statefulset_uses_the_service_checklist() {
        let errors = validate(
            "container:\n  labels:\n    HealthCheck: bad thing\nk8s:\n  workload_type: statefulset\n",
        );
        // no health check type validation for statefulsets
        assert_eq!(errors.len(), 10);
    }

    #[test]
    fn test_unknown_health_check_type() {
        let errors = validate("container:\n  labels:\n    HealthCheck: bad thing\n");
        let health: Vec<_> = errors.iter().filter(|e| e.contains("HealthCheck must be either")).collect();
        assert_eq!(health.len(), 1);
    }

    #[test]
    fn test_http_get_with_sidecar_style_args() {
        let errors = validate(
            r#"
container:
  labels:
    HealthCheck: HttpGet
    HealthCheckArgs: "http://{{ host }}:{{ tcp 10007 }}/health-check"
    ServicePort_8088: 10007
"#,
        );
        assert!(errors.iter().all(|e| !e.contains("HealthCheck")));
        assert!(errors.iter().all(|e| !e.starts_with("Health check error")));
    }

    #[test]
    fn test_http_get_without_tcp_port_token() {
        let errors = validate(
            r#"
container:
  labels:
    HealthCheck: HttpGet
    HealthCheckArgs: "http://{{ host }}:10007/health"
    ServicePort_8088: 10007
"#,
        );
        assert!(errors
            .iter()
            .any(|e| e.starts_with("Health check error: no 'tcp <port>' in HealthCheckArgs")));
    }

    #[test]
    fn test_http_get_with_unmapped_tcp_port() {
        let errors = validate(
            r#"
container:
  labels:
    HealthCheck: HttpGet
    HealthCheckArgs: "http://{{ host }}:{{ tcp 10009 }}/health"
    ServicePort_8088: 10007
"#,
        );
        assert!(errors.contains(
            &"Health check error: failed to find matching service port for health check port 10009"
                .to_string()
        ));
    }

    #[test]
    fn test_blank_health_check_reported_once() {
        let errors = validate("container:\n  labels:\n    HealthCheck:\n");
        let health: Vec<_> = errors.iter().filter(|e| e.contains("HealthCheck")).collect();
        assert_eq!(health, vec!["container.labels.HealthCheck is missing"]);
    }

    #[test]
    fn test_http_get_without_args() {
        let errors = validate("container:\n  labels:\n    HealthCheck: HttpGet\n");
        assert!(errors.iter().any(|e| e.contains("HealthCheckArgs must be defined")));
    }

    #[test]
    fn test_http_get_with_invalid_args() {
        let errors = validate(
            "container:\n  labels:\n    HealthCheck: HttpGet\n    HealthCheckArgs: yo yo yo this is invalid\n",
        );
        let health: Vec<_> = errors.iter().filter(|e| e.contains("HealthCheck")).collect();
        assert_eq!(health.len(), 1);
        assert!(health[0].contains("HealthCheckArgs must be a valid Sidecar-style"));
    }

    #[test]
    fn test_scheduled_job_checklist() {
        let errors = validate("singularity:\n  schedule: anything\n");
        assert_eq!(errors.len(), 5);
        assert!(!errors.contains(&"singularity.schedule is missing".to_string()));
    }

    #[test]
    fn test_scheduled_job_rejects_health_check() {
        let errors = validate(
            r#"
singularity:
  schedule: anything
container:
  image: test:123
  labels:
    HealthCheck: HttpGet
    ServiceName: test-service
    Environment: dev
resources:
  cpus: 0.1
  memoryMb: 3
"#,
        );
        assert_eq!(
            errors,
            vec!["container.labels.HealthCheck must not be set for scheduled jobs"]
        );
    }

    #[test]
    fn test_sidecar_url_check() {
        assert!(is_sidecar_http_url("https://{{ host }}:{{ tcp 443 }}/status"));
        assert!(!is_sidecar_http_url("ftp://{{ host }}/status"));
        assert!(!is_sidecar_http_url("http:///no-host"));
    }
}
