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

//! Cross-environment consistency of `container.env_vars` keys.

use super::Validate;
use crate::domain::config::LayeredConfig;

pub struct Validator<'a> {
    config: &'a LayeredConfig,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a LayeredConfig) -> Self {
        Self { config }
    }

    /// Compares adjacent environments in declaration order and stops at the
    /// first pair that disagrees.
    fn env_diff(&self) -> Vec<String> {
        let environments: Vec<&str> = self.config.environment_names().collect();

        for pair in environments.windows(2) {
            let (env_a, env_b) = (pair[0], pair[1]);
            let a_vars = self.config.env_var_keys(env_a);
            let b_vars = self.config.env_var_keys(env_b);

            let mut errors = Vec::new();

            let a_only = keys_missing_from(&a_vars, &b_vars);
            if !a_only.is_empty() {
                errors.push(format!(
                    "Mismatch in env_vars {} vs {}: {} missing {:?}",
                    env_a, env_b, env_b, a_only
                ));
            }

            let b_only = keys_missing_from(&b_vars, &a_vars);
            if !b_only.is_empty() {
                errors.push(format!(
                    "Mismatch in env_vars {} vs {}: {} missing {:?}",
                    env_b, env_a, env_a, b_only
                ));
            }

            if !errors.is_empty() {
                return errors;
            }
        }

        Vec::new()
    }
}

fn keys_missing_from<'k>(keys: &'k [String], other: &[String]) -> Vec<&'k str> {
    keys.iter()
        .filter(|key| !other.contains(*key))
        .map(String::as_str)
        .collect()
}

impl Validate for Validator<'_> {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn validate(&self) -> Vec<String> {
        if self.config.environments.is_empty() {
            return vec!["no environments configured".to_string()];
        }
        self.env_diff()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(yaml: &str) -> Vec<String> {
        let config = LayeredConfig::from_yaml_str(yaml).unwrap();
        Validator::new(&config).validate()
    }

    #[test]
    fn test_no_environments() {
        assert_eq!(validate("common: {}\n"), vec!["no environments configured"]);
    }

    #[test]
    fn test_matching_keys_are_valid() {
        let errors = validate(
            r#"
environments:
  dev:
    container:
      env_vars: {A: "1", B: "2"}
  prod:
    container:
      env_vars: {B: "3", A: "4"}
"#,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_key_missing_from_second_environment() {
        let errors = validate(
            r#"
environments:
  dev:
    container:
      env_vars: {A: "1", B: "2"}
  prod:
    container:
      env_vars: {A: "1"}
"#,
        );
        assert_eq!(errors, vec![r#"Mismatch in env_vars dev vs prod: prod missing ["B"]"#]);
    }

    #[test]
    fn test_both_directions_reported_for_first_pair_only() {
        let errors = validate(
            r#"
environments:
  dev:
    container:
      env_vars: {A: "1"}
  staging:
    container:
      env_vars: {B: "1"}
  prod:
    container:
      env_vars: {C: "1"}
"#,
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("staging missing [\"A\"]"));
        assert!(errors[1].contains("dev missing [\"B\"]"));
        assert!(errors.iter().all(|e| !e.contains("prod")));
    }
}
