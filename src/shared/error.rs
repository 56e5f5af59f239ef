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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid YAML: {}", .0.join("\n                "))]
    ValidationError(Vec<String>),

    #[error("Health check error: {0}")]
    HealthCheck(String),

    #[error("Invalid port for label '{label}': '{value}'")]
    InvalidPort { label: String, value: String },

    #[error("{command} failed: {message}")]
    Kubectl { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConvertError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn health_check(context: impl Into<String>) -> Self {
        Self::HealthCheck(context.into())
    }

    pub fn invalid_port(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidPort {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn kubectl(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Kubectl {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Messages carried by a validation failure, empty for every other kind.
    pub fn validation_messages(&self) -> &[String] {
        match self {
            Self::ValidationError(errors) => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_joins_every_message() {
        let err = ConvertError::ValidationError(vec![
            "container.image is missing".to_string(),
            "resources.cpus is missing".to_string(),
        ]);

        let rendered = err.to_string();
        assert!(rendered.starts_with("Invalid YAML: container.image is missing"));
        assert!(rendered.contains("resources.cpus is missing"));
        assert_eq!(err.validation_messages().len(), 2);
    }

    #[test]
    fn test_kubectl_error_is_verbatim() {
        let err = ConvertError::kubectl("kubectl apply", "error: the server doesn't have a resource type");
        assert_eq!(
            err.to_string(),
            "kubectl apply failed: error: the server doesn't have a resource type"
        );
        assert!(err.validation_messages().is_empty());
    }
}
