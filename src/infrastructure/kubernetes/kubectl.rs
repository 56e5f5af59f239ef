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

use crate::shared::error::{ConvertError, Result};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Hands generated manifest text to a cluster.
#[async_trait::async_trait]
pub trait ClusterApplier: Send + Sync {
    async fn apply(&self, manifest: &str) -> Result<String>;

    async fn delete(&self, manifest: &str) -> Result<String>;

    /// Raw diff output; a pending change is not an error.
    async fn diff(&self, manifest: &str) -> Result<String>;
}

/// Runs `<path> --context <environment> -v=<level> <verb> -f -` with the manifest on stdin.
#[derive(Debug, Clone)]
pub struct KubectlWrapper {
    path: String,
    context: String,
    log_level: u8,
}

impl KubectlWrapper {
    pub fn new(path: impl Into<String>, context: impl Into<String>, log_level: u8) -> Self {
        Self {
            path: path.into(),
            context: context.into(),
            log_level,
        }
    }

    fn args(&self, verb: &str) -> Vec<String> {
        vec![
            "--context".to_string(),
            self.context.clone(),
            format!("-v={}", self.log_level),
            verb.to_string(),
            "-f".to_string(),
            "-".to_string(),
        ]
    }

    pub fn command_line(&self, verb: &str) -> String {
        format!("{} {}", self.path, self.args(verb).join(" "))
    }

    async fn run(&self, verb: &str, manifest: &str) -> Result<(Option<i32>, String)> {
        let command_line = self.command_line(verb);
        debug!("Running {}", command_line);

        let mut child = Command::new(&self.path)
            .args(self.args(verb))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConvertError::kubectl(&command_line, e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            // a closed pipe shows up as a non-zero exit below
            if let Err(e) = stdin.write_all(manifest.as_bytes()).await {
                debug!("Writing manifest to {} failed: {}", command_line, e);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ConvertError::kubectl(&command_line, e.to_string()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok((output.status.code(), text))
    }

    async fn run_checked(&self, verb: &str, manifest: &str) -> Result<String> {
        let (code, output) = self.run(verb, manifest).await?;
        if code != Some(0) || output.contains("error:") {
            return Err(ConvertError::kubectl(self.command_line(verb), output));
        }
        Ok(output)
    }
}

#[async_trait::async_trait]
impl ClusterApplier for KubectlWrapper {
    async fn apply(&self, manifest: &str) -> Result<String> {
        self.run_checked("apply", manifest).await
    }

    async fn delete(&self, manifest: &str) -> Result<String> {
        self.run_checked("delete", manifest).await
    }

    async fn diff(&self, manifest: &str) -> Result<String> {
        // kubectl diff exits 1 when there is a difference
        match self.run("diff", manifest).await? {
            (Some(0), output) | (Some(1), output) => Ok(output),
            (_, output) => Err(ConvertError::kubectl(self.command_line("diff"), output)),
        }
    }
}
