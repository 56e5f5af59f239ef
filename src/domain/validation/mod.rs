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

//! Pre-generation validation of service files

pub mod drift;
pub mod env_validator;

pub use self::drift::Validator;
pub use self::env_validator::EnvValidator;

/// A validation pass. Returns every problem found; empty means valid.
pub trait Validate {
    fn name(&self) -> &'static str;

    fn validate(&self) -> Vec<String>;
}
