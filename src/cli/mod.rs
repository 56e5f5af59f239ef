//! Command line interface

pub mod commands;
pub mod display;
pub mod k8s;

pub use self::commands::{CliArgs, Commands};
