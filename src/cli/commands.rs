// CLI command definitions

use super::k8s::{DeleteCommand, PrintCommand, ReleaseCommand, ScaleCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "nmesos-kube",
    version,
    about = "Convert nmesos service files into Kubernetes manifests",
    long_about = "Validates an nmesos service file for one environment, generates the Service, Deployment, CronJob or StatefulSet it describes and hands the result to kubectl"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the generated manifests
    Print(PrintCommand),

    /// Diff (dry run) or apply the generated manifests
    Release(ReleaseCommand),

    /// Delete the generated manifests from the cluster (requires --dry-run false)
    Delete(DeleteCommand),

    /// Release with an explicit --instance-replicas
    Scale(ScaleCommand),
}
