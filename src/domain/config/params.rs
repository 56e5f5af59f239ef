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

/// Per-run inputs that are not part of the service file.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Image tag, also written as the `release` label and `SERVICE_VERSION`
    pub tag: String,
    pub environment: String,
    pub username: String,
    pub instance_replicas: Option<i32>,
    pub command_override: Option<String>,
    pub enable_probes: bool,
    pub temporary_service_mode: bool,
}

impl GenerationParams {
    pub fn new(tag: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            environment: environment.into(),
            username: "unknown".to_string(),
            instance_replicas: None,
            command_override: None,
            enable_probes: true,
            temporary_service_mode: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_instance_replicas(mut self, replicas: Option<i32>) -> Self {
        self.instance_replicas = replicas;
        self
    }

    pub fn with_command_override(mut self, command: Option<String>) -> Self {
        self.command_override = command;
        self
    }

    pub fn with_probes(mut self, enabled: bool) -> Self {
        self.enable_probes = enabled;
        self
    }

    pub fn with_temporary_service_mode(mut self, enabled: bool) -> Self {
        self.temporary_service_mode = enabled;
        self
    }
}
