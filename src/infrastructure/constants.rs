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

/// Default convention values, overridable through `Conventions`
pub const DEFAULT_VAULT_INIT_IMAGE: &str = "quay.io/shimmur/vault-init:3ffae66";
pub const DEFAULT_VAULT_VAR_PATH: &str = "/vault";
pub const DEFAULT_LOGPROXY_IMAGE: &str = "quay.io/shimmur/logproxy:4fa0022-local-build";
pub const DEFAULT_LOGPROXY_LOG_HOST: &str = "syslog.uw2.prod.sms.community";
pub const DEFAULT_NEW_RELIC_ACCOUNT: &str = "2192796";
pub const DEFAULT_NEW_RELIC_LICENSE_REF: &str = "vault://secret/infra/newrelic?key=license";
pub const DEFAULT_NODE_GROUP: &str = "eks-default-node-group";
pub const DEFAULT_DEPLOYER_NOTIFIER_IMAGE: &str = "quay.io/shimmur/deploy-notifier:c18d11c";
pub const DEFAULT_IMAGE_PULL_SECRET: &str = "privaterepoauth";

/// Input labels read from `container.labels`
pub const LABEL_SERVICE_NAME: &str = "ServiceName";
pub const LABEL_ENVIRONMENT: &str = "Environment";
pub const LABEL_HEALTH_CHECK: &str = "HealthCheck";
pub const LABEL_HEALTH_CHECK_ARGS: &str = "HealthCheckArgs";
pub const LABEL_SIDECAR_DISCOVER: &str = "SidecarDiscover";
pub const LABEL_PROXY_MODE: &str = "ProxyMode";
pub const LABEL_SERVICE_PORT_PREFIX: &str = "ServicePort_";

/// Labels written onto generated manifests
pub const LABEL_APP: &str = "app";
pub const LABEL_RELEASE: &str = "release";
pub const LABEL_DEPLOY_USER: &str = "DeployUser";
pub const LABEL_TOOL_VERSION: &str = "NmesosK8sVersion";
pub const LABEL_TEMPORARY_DEPLOYMENT: &str = "TemporaryDeployment";
pub const ANNOTATION_TAIL_LOGS: &str = "community.com/TailLogs";

/// Health check kinds accepted in the `HealthCheck` label
pub const HEALTH_CHECK_HTTP_GET: &str = "HttpGet";
pub const HEALTH_CHECK_ALWAYS_SUCCESSFUL: &str = "AlwaysSuccessful";

/// Workload type override value in `k8s.workload_type`
pub const WORKLOAD_TYPE_STATEFULSET: &str = "statefulset";

/// Temporary service mode
pub const TEMPORARY_SERVICE_PREFIX: &str = "temporary_";

/// Default proxy mode when `ProxyMode` is not labelled
pub const DEFAULT_PROXY_MODE: &str = "http";

/// Env var key substring marking a service that needs the log relay sidecar
pub const LOGPROXY_ENV_MARKER: &str = "APPSIGNAL";

/// Env var forwarded from the service to the deployer-notifier
pub const DEPLOYER_NOTIFIER_FORWARDED_VAR: &str = "APPSIGNAL_APP_NAME";

/// Vault value scheme
pub const VAULT_SCHEME: &str = "vault://";
pub const VAULT_ENV_FILE_NAME: &str = ".init-env";

/// Container names
pub const CONTAINER_NAME_VAULT_INIT: &str = "vault-init";
pub const CONTAINER_NAME_LOGPROXY: &str = "logproxy";
pub const CONTAINER_NAME_DEPLOYER_NOTIFIER: &str = "deployer-notifier";
pub const VAULT_INIT_COMMAND: &str = "/vault-init";

/// Volume names
pub const VOLUME_NAME_VAULT_VARS: &str = "vault-vars";

/// Probe timings
pub const STARTUP_INITIAL_DELAY: i32 = 10;
pub const STARTUP_FAILURE_THRESHOLD: i32 = 50;
pub const STARTUP_PERIOD: i32 = 1;
pub const LIVENESS_PERIOD: i32 = 10;
pub const READINESS_PERIOD: i32 = 3;

/// Resource headroom applied on top of the CPU request
pub const CPU_LIMIT_HEADROOM: f64 = 1.25;

/// Converts `deployStepWaitTimeMs` into `minReadySeconds`
pub const MIN_READY_SCALE: f64 = 0.005;

/// Service node ports are offset from the exposed port
pub const NODE_PORT_OFFSET: i32 = 20000;

/// CronJob cleanup
pub const CRONJOB_TTL_SECONDS_AFTER_FINISHED: i32 = 100;

/// Restart policy
pub const RESTART_POLICY_ON_FAILURE: &str = "OnFailure";

/// Deployment strategy
pub const STRATEGY_TYPE_ROLLING_UPDATE: &str = "RollingUpdate";

/// Service type
pub const SERVICE_TYPE_NODE_PORT: &str = "NodePort";

/// Node selector key
pub const NODE_SELECTOR_ROLE: &str = "Role";

/// Affinity
pub const TOPOLOGY_KEY_HOSTNAME: &str = "kubernetes.io/hostname";
pub const ANTI_AFFINITY_WEIGHT: i32 = 100;

/// Security capability granted to the log relay sidecar
pub const CAPABILITY_NET_ADMIN: &str = "NET_ADMIN";

/// Executor env vars controlling syslog relay
pub const EXECUTOR_RELAY_SYSLOG: &str = "EXECUTOR_RELAY_SYSLOG";
pub const EXECUTOR_RELAY_SYSLOG_STARTUP_ONLY: &str = "EXECUTOR_RELAY_SYSLOG_STARTUP_ONLY";
