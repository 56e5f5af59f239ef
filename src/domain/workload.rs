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

use crate::domain::config::ServiceConfig;
use crate::infrastructure::constants::{LABEL_SERVICE_PORT_PREFIX, WORKLOAD_TYPE_STATEFULSET};
use std::fmt;

/// The single workload a service file maps to.
///
/// Precedence is `CronJob` > `StatefulSet` > `Deployment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    CronJob,
    StatefulSet,
    Deployment,
}

impl WorkloadKind {
    pub fn classify(config: &ServiceConfig) -> Self {
        if is_scheduled(config) {
            WorkloadKind::CronJob
        } else if config.k8s.workload_type.as_deref() == Some(WORKLOAD_TYPE_STATEFULSET) {
            WorkloadKind::StatefulSet
        } else {
            WorkloadKind::Deployment
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::CronJob => "CronJob",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::Deployment => "Deployment",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_scheduled(config: &ServiceConfig) -> bool {
    config
        .singularity
        .schedule
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty())
}

/// A config exposes a Service iff some label key carries the `ServicePort_` prefix.
pub fn exposes_service(config: &ServiceConfig) -> bool {
    config
        .container
        .labels
        .keys()
        .any(|key| key.contains(LABEL_SERVICE_PORT_PREFIX))
}
