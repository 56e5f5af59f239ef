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

use crate::infrastructure::kubernetes::resources::manifest::Manifest;
use crate::infrastructure::kubernetes::resources::pod::ConfigAccessor;
use crate::shared::error::Result;

pub trait ManifestBuilder {
    fn kind(&self) -> &'static str;

    fn accessor(&self) -> &ConfigAccessor<'_>;

    /// Whether this builder produces anything for the current config.
    fn is_active(&self) -> bool;

    /// `Ok(None)` when the builder is not active.
    fn build_manifest(&self) -> Result<Option<Manifest>>;
}
