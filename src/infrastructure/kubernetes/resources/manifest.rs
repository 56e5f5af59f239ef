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

use crate::shared::error::Result;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// One generated Kubernetes object.
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    Service(Service),
    Deployment(Deployment),
    CronJob(CronJob),
    StatefulSet(StatefulSet),
}

impl Manifest {
    pub fn kind(&self) -> &'static str {
        match self {
            Manifest::Service(_) => "Service",
            Manifest::Deployment(_) => "Deployment",
            Manifest::CronJob(_) => "CronJob",
            Manifest::StatefulSet(_) => "StatefulSet",
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Manifest::Service(s) => &s.metadata,
            Manifest::Deployment(d) => &d.metadata,
            Manifest::CronJob(c) => &c.metadata,
            Manifest::StatefulSet(s) => &s.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// YAML body without a leading document separator.
    pub fn to_yaml(&self) -> Result<String> {
        let yaml = match self {
            Manifest::Service(s) => serde_yaml::to_string(s)?,
            Manifest::Deployment(d) => serde_yaml::to_string(d)?,
            Manifest::CronJob(c) => serde_yaml::to_string(c)?,
            Manifest::StatefulSet(s) => serde_yaml::to_string(s)?,
        };
        Ok(yaml)
    }
}

/// Renders each manifest as `---\n<yaml>` and joins them with newlines.
pub fn render_documents(manifests: &[Manifest]) -> Result<String> {
    let documents = manifests
        .iter()
        .map(|m| m.to_yaml().map(|yaml| format!("---\n{}", yaml)))
        .collect::<Result<Vec<_>>>()?;
    Ok(documents.join("\n"))
}
