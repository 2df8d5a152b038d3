//! CLI module for edgestack
//!
//! Subcommands:
//! - `edgestack synth` - Write both stack templates and the manifest
//! - `edgestack validate` - Check a deployment config without synthesizing
//! - `edgestack list` - List the stacks an app synthesizes
//! - `edgestack show` - Print one stack's template

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::assembly::{OutputFormat, DEFAULT_OUTPUT_DIR};

mod commands;
mod display;

pub use commands::*;
pub use display::*;

#[derive(Parser, Debug)]
#[command(name = "edgestack")]
#[command(about = "Synthesize network and service stacks for a containerized web app")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a .env file loaded before the environment is resolved
    #[arg(long, value_name = "FILE", global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize the cloud assembly
    Synth(SynthArgs),

    /// Validate a deployment config
    Validate(ValidateArgs),

    /// List the stacks of an app
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Print a single stack template
    Show(ShowArgs),
}

/// Arguments for the synth command
#[derive(Parser, Debug)]
pub struct SynthArgs {
    /// Path to the deployment config (JSON, JSONC or YAML)
    pub config: PathBuf,

    /// Output directory for templates and manifest
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Template format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Lookup context file (default: edgestack.context.json next to the config)
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the deployment config
    pub config: PathBuf,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Path to the deployment config
    pub config: PathBuf,

    /// Lookup context file
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Path to the deployment config
    pub config: PathBuf,

    /// Stack name
    pub stack: String,

    /// Template format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Lookup context file
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_synth_defaults() {
        let cli = Cli::parse_from(["edgestack", "synth", "app.json"]);
        match cli.command {
            Commands::Synth(args) => {
                assert_eq!(args.config, PathBuf::from("app.json"));
                assert_eq!(args.output, PathBuf::from("cdk.out"));
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.context.is_none());
            }
            _ => panic!("Expected Synth command"),
        }
    }

    #[test]
    fn test_parse_synth_options() {
        let cli = Cli::parse_from([
            "edgestack",
            "synth",
            "app.yaml",
            "-o",
            "out",
            "--format",
            "yaml",
            "--context",
            "ctx.json",
        ]);
        match cli.command {
            Commands::Synth(args) => {
                assert_eq!(args.output, PathBuf::from("out"));
                assert_eq!(args.format, OutputFormat::Yaml);
                assert_eq!(args.context, Some(PathBuf::from("ctx.json")));
            }
            _ => panic!("Expected Synth command"),
        }
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::parse_from(["edgestack", "show", "app.json", "PostContainerStack"]);
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.stack, "PostContainerStack");
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_parse_list_alias() {
        let cli = Cli::parse_from(["edgestack", "ls", "app.json"]);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::parse_from([
            "edgestack",
            "validate",
            "app.json",
            "-vv",
            "--env-file",
            ".env",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.env_file, Some(PathBuf::from(".env")));
    }
}
