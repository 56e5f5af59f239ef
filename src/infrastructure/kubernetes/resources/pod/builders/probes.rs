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
use crate::infrastructure::kubernetes::resources::pod::ConfigAccessor;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::{Container, HTTPGetAction, Probe};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// HTTP probes derived from the `HttpGet` health check.
///
/// Startup and readiness hit `healthcheckUri`; liveness hits the path of
/// `HealthCheckArgs`. All three share the mapped container port.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpProbes {
    pub startup: Probe,
    pub liveness: Probe,
    pub readiness: Probe,
}

impl HttpProbes {
    /// `None` unless the service declares an `HttpGet` health check.
    pub fn derive(accessor: &ConfigAccessor<'_>) -> Result<Option<Self>> {
        if !accessor.http_health_check() {
            return Ok(None);
        }

        let port = accessor.health_check_port()?;
        let uri = accessor.healthcheck_uri();

        Ok(Some(Self {
            startup: Probe {
                http_get: Some(http_get(port, uri.clone())),
                initial_delay_seconds: Some(STARTUP_INITIAL_DELAY),
                failure_threshold: Some(STARTUP_FAILURE_THRESHOLD),
                period_seconds: Some(STARTUP_PERIOD),
                ..Default::default()
            },
            liveness: Probe {
                http_get: Some(http_get(port, Some(accessor.liveness_path()))),
                period_seconds: Some(LIVENESS_PERIOD),
                ..Default::default()
            },
            readiness: Probe {
                http_get: Some(http_get(port, uri)),
                period_seconds: Some(READINESS_PERIOD),
                ..Default::default()
            },
        }))
    }

    pub fn attach(self, container: &mut Container, with_startup: bool) {
        if with_startup {
            container.startup_probe = Some(self.startup);
        }
        container.liveness_probe = Some(self.liveness);
        container.readiness_probe = Some(self.readiness);
    }
}

fn http_get(port: i32, path: Option<String>) -> HTTPGetAction {
    HTTPGetAction {
        port: IntOrString::Int(port),
        path,
        ..Default::default()
    }
}
