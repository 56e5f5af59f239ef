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

use crate::domain::config::{Conventions, GenerationParams, LayeredConfig, ServiceConfig};
use crate::domain::validation::{EnvValidator, Validate, Validator};
use crate::infrastructure::kubernetes::resources::{
    render_documents, ConfigAccessor, CronJobBuilder, DeploymentBuilder, Manifest,
    ManifestBuilder, ServiceBuilder, StatefulSetBuilder,
};
use crate::shared::error::{ConvertError, Result};
use tracing::{debug, info};

/// Validates a layered service file for one environment and turns it into manifests.
pub struct ManifestGenerator<'a> {
    layered: &'a LayeredConfig,
    config: ServiceConfig,
    params: &'a GenerationParams,
    conventions: &'a Conventions,
}

impl<'a> ManifestGenerator<'a> {
    pub fn new(
        layered: &'a LayeredConfig,
        params: &'a GenerationParams,
        conventions: &'a Conventions,
    ) -> Result<Self> {
        let config = layered.resolve(&params.environment)?;
        Ok(Self {
            layered,
            config,
            params,
            conventions,
        })
    }

    fn accessor(&self) -> ConfigAccessor<'_> {
        ConfigAccessor::new(&self.config, self.params, self.conventions)
    }

    pub fn service_name(&self) -> String {
        self.accessor().service_name()
    }

    pub fn app_name(&self) -> String {
        self.accessor().app_name()
    }

    /// Runs every validator to completion and fails with all messages at once.
    pub fn validate(&self) -> Result<()> {
        let validators: Vec<Box<dyn Validate + '_>> = vec![
            Box::new(Validator::new(self.layered)),
            Box::new(EnvValidator::new(&self.config)),
        ];

        let mut errors = Vec::new();
        for validator in &validators {
            let found = validator.validate();
            debug!("{} reported {} problem(s)", validator.name(), found.len());
            errors.extend(found);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::ValidationError(errors))
        }
    }

    fn builders(&self) -> Vec<Box<dyn ManifestBuilder + '_>> {
        let accessor = self.accessor();
        vec![
            Box::new(ServiceBuilder::new(accessor)),
            Box::new(DeploymentBuilder::new(accessor)),
            Box::new(CronJobBuilder::new(accessor)),
            Box::new(StatefulSetBuilder::new(accessor)),
        ]
    }

    /// Manifests in fixed order: Service, Deployment, CronJob, StatefulSet.
    pub fn generate(&self) -> Result<Vec<Manifest>> {
        self.validate()?;

        info!(
            "Converting '{}' for environment '{}' at tag '{}'",
            self.service_name(),
            self.params.environment,
            self.params.tag
        );

        let mut manifests = Vec::new();
        for builder in self.builders() {
            match builder.build_manifest()? {
                Some(manifest) => manifests.push(manifest),
                None => debug!(
                    "Skipping {} for '{}'",
                    builder.kind(),
                    builder.accessor().service_name()
                ),
            }
        }

        Ok(manifests)
    }

    pub fn to_yaml(&self) -> Result<String> {
        render_documents(&self.generate()?)
    }
}
