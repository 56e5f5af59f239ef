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

//! Per-kind manifest builders

pub mod cronjob;
pub mod deployment;
pub mod manifest;
pub mod pod;
pub mod service;
pub mod statefulset;

pub use self::cronjob::CronJobBuilder;
pub use self::deployment::DeploymentBuilder;
pub use self::manifest::{render_documents, Manifest};
pub use self::pod::{ConfigAccessor, ManifestBuilder};
pub use self::service::ServiceBuilder;
pub use self::statefulset::StatefulSetBuilder;
