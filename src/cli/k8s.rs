//! Conversion commands

use crate::cli::display::{colorize_diff, ManifestRow, StatusIcon, TableRenderer};
use crate::domain::config::{Conventions, GenerationParams, LayeredConfig};
use crate::domain::ManifestGenerator;
use crate::infrastructure::kubernetes::resources::{render_documents, Manifest};
use crate::infrastructure::kubernetes::{ClusterApplier, KubectlWrapper};
use crate::shared::error::ConvertError;
use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser};
use colored::Colorize;
use std::collections::HashMap;

const ALL_KINDS: [&str; 4] = ["Service", "Deployment", "CronJob", "StatefulSet"];

/// Options shared by every sub-command
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// The YAML service file to convert (`.yml` is appended if the path does not exist)
    #[arg(long, short = 's', value_name = "PATH")]
    pub service_file: String,

    /// The Docker tag to deploy
    #[arg(long, short = 't')]
    pub tag: String,

    /// The name of the environment to run in; also used as the kubectl context
    #[arg(long, short = 'e', default_value = "dev")]
    pub environment: String,

    /// Only diff against the cluster instead of changing it
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub dry_run: bool,

    /// The path to the kubectl binary
    #[arg(long, default_value = "kubectl")]
    pub kubectl_path: String,

    /// Override kubectl -v=<level>
    #[arg(long, default_value_t = 0)]
    pub kubectl_log_level: u8,

    /// Override the instance replica count
    #[arg(long)]
    pub instance_replicas: Option<i32>,

    /// Override the container command (deployments only)
    #[arg(long)]
    pub command_override: Option<String>,

    /// Attach startup, readiness and liveness probes (deployments only);
    /// disable only for debugging, usually with --command-override
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub enable_probes: bool,

    /// Prefix the service name with `temporary_`, disable sidecar discovery,
    /// skip the Service object and label the deployment as temporary
    #[arg(long)]
    pub enable_temporary_service_mode: bool,

    /// Deploying user recorded in the DeployUser label
    /// If not specified, uses SUDO_USER, then USER
    #[arg(long)]
    pub user: Option<String>,

    /// TOML file overriding the site conventions (sidecar images, node group, ...)
    #[arg(long, value_name = "PATH")]
    pub conventions: Option<String>,

    /// Convention properties (-D key=value)
    ///
    /// Vault: vault.init-image, vault.var-path
    /// Log relay: logproxy.image, logproxy.log-host, newrelic.account, newrelic.license-ref
    /// Scheduling: node.default-group
    /// Other: deployer-notifier.image, image.pull-secret, tool.version
    ///
    /// Example: -Dnode.default-group=eks-batch-node-group
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

/// Generated manifests together with their rendered text
pub struct Conversion {
    pub service_name: String,
    pub manifests: Vec<Manifest>,
    pub yaml: String,
}

impl ConvertArgs {
    fn conventions(&self) -> anyhow::Result<Conventions> {
        let mut conventions = match &self.conventions {
            Some(path) => Conventions::from_file(path)
                .with_context(|| format!("Failed to load conventions from {}", path))?,
            None => Conventions::default(),
        };

        if !self.properties.is_empty() {
            let properties = parse_dynamic_configs(&self.properties).map_err(anyhow::Error::msg)?;
            conventions.apply_overrides(&properties)?;
        }

        Ok(conventions)
    }

    fn params(&self) -> GenerationParams {
        GenerationParams::new(&self.tag, &self.environment)
            .with_username(resolve_username(self.user.as_deref()))
            .with_instance_replicas(self.instance_replicas)
            .with_command_override(self.command_override.clone())
            .with_probes(self.enable_probes)
            .with_temporary_service_mode(self.enable_temporary_service_mode)
    }

    fn kubectl(&self) -> KubectlWrapper {
        KubectlWrapper::new(&self.kubectl_path, &self.environment, self.kubectl_log_level)
    }

    /// Load, validate and generate. Nothing is returned unless validation passes.
    pub fn convert(&self) -> anyhow::Result<Conversion> {
        eprintln!("{}", "-".repeat(80).green());
        eprintln!("{}", " nmesos -> Kubernetes conversion".green());
        eprintln!("{}", "-".repeat(80).green());
        eprintln!(
            "{}",
            format!(
                "Loading config '{}' for {}",
                self.service_file, self.environment
            )
            .blue()
        );

        let layered = LayeredConfig::from_file(&self.service_file)?;
        let conventions = self.conventions()?;
        let params = self.params();

        let generator = ManifestGenerator::new(&layered, &params, &conventions)?;
        let manifests = generator
            .generate()
            .map_err(|err| report_validation(&self.service_file, err))?;
        let yaml = render_documents(&manifests)?;

        Ok(Conversion {
            service_name: generator.service_name(),
            manifests,
            yaml,
        })
    }
}

/// Lists every validation problem on stderr and condenses them into one error.
fn report_validation(service_file: &str, err: ConvertError) -> anyhow::Error {
    let problems = err.validation_messages();
    if problems.is_empty() {
        return err.into();
    }

    for problem in problems {
        eprintln!("{} {}", StatusIcon::ERROR.red(), problem.red());
    }
    anyhow!(
        "'{}' failed validation with {} problem(s)",
        service_file,
        problems.len()
    )
}

impl Conversion {
    pub fn summary_rows(&self) -> Vec<ManifestRow> {
        ALL_KINDS
            .iter()
            .map(|kind| {
                let manifest = self.manifests.iter().find(|m| m.kind() == *kind);
                ManifestRow {
                    kind: kind.to_string(),
                    name: manifest.map(|m| m.name().to_string()),
                    namespace: manifest.and_then(|m| m.namespace().map(str::to_string)),
                }
            })
            .collect()
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PrintCommand {
    #[command(flatten)]
    pub args: ConvertArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ReleaseCommand {
    #[command(flatten)]
    pub args: ConvertArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    #[command(flatten)]
    pub args: ConvertArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ScaleCommand {
    #[command(flatten)]
    pub args: ConvertArgs,
}

impl PrintCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let conversion = self.args.convert()?;

        let renderer = TableRenderer::new();
        eprint!(
            "{}",
            renderer.render_manifest_summary(
                &conversion.service_name,
                &self.args.environment,
                &conversion.summary_rows()
            )
        );

        println!("{}", conversion.yaml);
        Ok(())
    }
}

impl ReleaseCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let conversion = self.args.convert()?;
        release(&self.args, &self.args.kubectl(), &conversion.yaml).await
    }
}

impl ScaleCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        if self.args.instance_replicas.is_none() {
            bail!("scale requires that --instance-replicas be set");
        }

        let conversion = self.args.convert()?;
        release(&self.args, &self.args.kubectl(), &conversion.yaml).await
    }
}

impl DeleteCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        if self.args.dry_run {
            bail!("{} Refusing to delete in dry-run mode", StatusIcon::ERROR);
        }

        let conversion = self.args.convert()?;
        let args = &self.args;

        println!(
            "{}",
            format!(
                "Deleting '{}' from '{}' with '{}'...\n",
                args.service_file, args.environment, args.kubectl_path
            )
            .blue()
        );

        let output = args.kubectl().delete(&conversion.yaml).await?;
        eprintln!("{}", output.yellow());
        eprintln!("{}", "Done.".green());

        Ok(())
    }
}

/// Diff in dry-run mode, otherwise apply.
async fn release(
    args: &ConvertArgs,
    applier: &dyn ClusterApplier,
    manifest: &str,
) -> anyhow::Result<()> {
    if args.dry_run {
        println!(
            "{}",
            format!(
                "Changes from '{}' to '{}' would be\n",
                args.service_file, args.environment
            )
            .blue()
        );

        let diff = colorize_diff(&applier.diff(manifest).await?);
        if diff.is_empty() {
            println!(
                "{}",
                "NONE\n\nThis usually means that you are not logged into K8s.\n".blue()
            );
        } else {
            println!("{}", diff);
        }

        eprintln!("{}", "Done.".green());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Deploying '{}' to '{}' with '{}'...\n",
            args.service_file, args.environment, args.kubectl_path
        )
        .blue()
    );

    let output = applier.apply(manifest).await?;
    eprintln!("{}", output.yellow());
    eprintln!("{}", "Done.".green());

    Ok(())
}

/// `--user`, then SUDO_USER, then USER, then "unknown".
fn resolve_username(explicit: Option<&str>) -> String {
    pick_username(
        explicit,
        std::env::var("SUDO_USER").ok().as_deref(),
        std::env::var("USER").ok().as_deref(),
    )
}

fn pick_username(explicit: Option<&str>, sudo_user: Option<&str>, user: Option<&str>) -> String {
    explicit
        .or(sudo_user)
        .or(user)
        .unwrap_or("unknown")
        .to_string()
}

/// Parse dynamic configuration properties from -D key=value format
fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>, String> {
    let mut map = HashMap::new();

    for config in configs {
        let Some((key, value)) = config.split_once('=') else {
            return Err(format!(
                "Invalid property format: '{}'. Expected 'key=value'",
                config
            ));
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Empty key in property: '{}'", config));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use crate::cli::commands::Commands;
    use crate::shared::error::Result as ConvertResult;

    #[test]
    fn test_parse_dynamic_configs() {
        let parsed = parse_dynamic_configs(&[
            "node.default-group=batch".to_string(),
            " tool.version = 1.2=3 ".to_string(),
        ])
        .unwrap();
        assert_eq!(parsed["node.default-group"], "batch");
        assert_eq!(parsed["tool.version"], "1.2=3");

        assert!(parse_dynamic_configs(&["novalue".to_string()]).is_err());
        assert!(parse_dynamic_configs(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_report_validation() {
        let err = ConvertError::ValidationError(vec![
            "container.image is missing".to_string(),
            "resources.cpus is missing".to_string(),
        ]);
        assert_eq!(
            report_validation("svc.yml", err).to_string(),
            "'svc.yml' failed validation with 2 problem(s)"
        );

        let err = ConvertError::health_check("no 'tcp <port>' in HealthCheckArgs ''");
        assert_eq!(
            report_validation("svc.yml", err).to_string(),
            "Health check error: no 'tcp <port>' in HealthCheckArgs ''"
        );
    }

    #[test]
    fn test_pick_username() {
        assert_eq!(pick_username(Some("cli"), Some("root"), Some("me")), "cli");
        assert_eq!(pick_username(None, Some("root"), Some("me")), "root");
        assert_eq!(pick_username(None, None, Some("me")), "me");
        assert_eq!(pick_username(None, None, None), "unknown");
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["nmesos-kube", "release", "-s", "svc.yml", "-t", "v1"]);
        let Commands::Release(cmd) = args.command else {
            panic!("expected release");
        };

        assert_eq!(cmd.args.environment, "dev");
        assert!(cmd.args.dry_run);
        assert!(cmd.args.enable_probes);
        assert!(!cmd.args.enable_temporary_service_mode);
        assert_eq!(cmd.args.kubectl_path, "kubectl");
        assert_eq!(cmd.args.kubectl_log_level, 0);
    }

    #[test]
    fn test_explicit_flags() {
        let args = CliArgs::parse_from([
            "nmesos-kube",
            "scale",
            "-s",
            "svc",
            "-t",
            "v1",
            "-e",
            "prod",
            "--dry-run",
            "false",
            "--instance-replicas",
            "4",
            "-Dnode.default-group=batch",
        ]);
        let Commands::Scale(cmd) = args.command else {
            panic!("expected scale");
        };

        assert!(!cmd.args.dry_run);
        assert_eq!(cmd.args.instance_replicas, Some(4));
        assert_eq!(cmd.args.properties, vec!["node.default-group=batch"]);
        assert_eq!(cmd.args.conventions().unwrap().default_node_group, "batch");
    }

    #[tokio::test]
    async fn test_delete_refuses_dry_run() {
        let args = CliArgs::parse_from(["nmesos-kube", "delete", "-s", "missing", "-t", "v1"]);
        let Commands::Delete(cmd) = args.command else {
            panic!("expected delete");
        };

        let err = cmd.execute().await.unwrap_err();
        assert!(err.to_string().contains("Refusing to delete in dry-run mode"));
    }

    #[tokio::test]
    async fn test_scale_requires_replicas() {
        let args = CliArgs::parse_from(["nmesos-kube", "scale", "-s", "missing", "-t", "v1"]);
        let Commands::Scale(cmd) = args.command else {
            panic!("expected scale");
        };

        let err = cmd.execute().await.unwrap_err();
        assert!(err.to_string().contains("--instance-replicas"));
    }

    struct RecordingApplier;

    #[async_trait::async_trait]
    impl ClusterApplier for RecordingApplier {
        async fn apply(&self, manifest: &str) -> ConvertResult<String> {
            Ok(format!("applied {}", manifest.len()))
        }

        async fn delete(&self, _manifest: &str) -> ConvertResult<String> {
            unreachable!()
        }

        async fn diff(&self, _manifest: &str) -> ConvertResult<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_release_uses_diff_in_dry_run() {
        let args = CliArgs::parse_from(["nmesos-kube", "release", "-s", "svc", "-t", "v1"]);
        let Commands::Release(cmd) = args.command else {
            panic!("expected release");
        };

        assert!(release(&cmd.args, &RecordingApplier, "kind: Service").await.is_ok());
    }
}
