//! Command implementations for the CLI
//!
//! SBIO pattern: Commands return Results, printing is handled by the caller

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::app::App;
use crate::assembly::{render_template, AssemblyError, CloudAssembly, OutputFormat};
use crate::config::{
    environment_from_process, expand_path, load_deployment_file, ConfigError, DeploymentConfig,
};
use crate::lookup::{load_context_file, LookupError, DEFAULT_CONTEXT_FILE};
use crate::stacks::SynthError;

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Synthesis failed: {0}")]
    Synth(#[from] SynthError),

    #[error("{0}")]
    Assembly(#[from] AssemblyError),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

// ============================================================================
// App loading
// ============================================================================

/// Context file used when none is given: next to the config file
pub fn default_context_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_CONTEXT_FILE)
}

/// Build an [`App`] from a config file, the process environment and the
/// lookup context.
pub fn load_app(config_path: &Path, context_path: Option<&Path>) -> CommandResult<App> {
    let config_path = expand_path(config_path);
    let config = load_deployment_file(&config_path)?;
    let environment = environment_from_process(&config.env);

    let context_path = context_path
        .map(expand_path)
        .unwrap_or_else(|| default_context_path(&config_path));
    let context = load_context_file(&context_path)?;

    Ok(App::new(config, environment, context))
}

// ============================================================================
// Synth / List / Show
// ============================================================================

/// Summary of one synthesized stack
#[derive(Debug, Clone, PartialEq)]
pub struct StackInfo {
    pub name: String,
    pub environment: String,
    pub dependencies: Vec<String>,
    pub resources: usize,
    pub outputs: usize,
}

/// Per-stack summary rows for an assembly, in deploy order
pub fn stack_infos(assembly: &CloudAssembly) -> Vec<StackInfo> {
    assembly
        .stacks()
        .iter()
        .map(|stack| StackInfo {
            name: stack.name().to_string(),
            environment: assembly.environment().to_string(),
            dependencies: stack.dependencies().to_vec(),
            resources: stack.resources().len(),
            outputs: stack.outputs().len(),
        })
        .collect()
}

/// Result of a synth run
#[derive(Debug)]
pub struct SynthSummary {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub stacks: Vec<StackInfo>,
}

/// Synthesize and write the assembly
pub fn synth(app: &App, output_dir: &Path, format: OutputFormat) -> CommandResult<SynthSummary> {
    let assembly = app.synthesize()?;
    let output_dir = expand_path(output_dir);
    let files = assembly.write_to(&output_dir, format)?;
    Ok(SynthSummary {
        output_dir,
        files,
        stacks: stack_infos(&assembly),
    })
}

/// Synthesize without writing and return the stack summaries
pub fn list_stacks(app: &App) -> CommandResult<Vec<StackInfo>> {
    let assembly = app.synthesize()?;
    Ok(stack_infos(&assembly))
}

/// Render one stack's template
pub fn show_stack(app: &App, name: &str, format: OutputFormat) -> CommandResult<String> {
    let assembly = app.synthesize()?;
    let stack = assembly
        .stack(name)
        .ok_or_else(|| AssemblyError::UnknownStack(name.to_string()))?;
    Ok(render_template(stack, format)?)
}

// ============================================================================
// Validate
// ============================================================================

/// Result of validating a deployment config
#[derive(Debug)]
pub struct ValidationResult {
    pub valid: bool,
    pub config: Option<DeploymentConfig>,
    pub error: Option<String>,
}

/// Validate a deployment config file
pub fn validate_deployment_file(path: &Path) -> ValidationResult {
    match load_deployment_file(path) {
        Ok(config) => ValidationResult {
            valid: true,
            config: Some(config),
            error: None,
        },
        Err(e) => ValidationResult {
            valid: false,
            config: None,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    const CONFIG: &str = r#"{
        // demo application
        "application": "demo-app",
        "cidr": "10.0.0.0/24",
        "domain": "example.com",
        "port": 8501,
        "env": {"account": "123456789012", "region": "us-east-1"}
    }"#;

    fn write_app_dir(with_context: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.json"), CONFIG).unwrap();
        if with_context {
            let context = json!({
                "hosted-zone:account=123456789012:domainName=example.com:region=us-east-1":
                    {"Id": "/hostedzone/Z0EXAMPLE", "Name": "example.com."}
            });
            fs::write(dir.path().join(DEFAULT_CONTEXT_FILE), context.to_string()).unwrap();
        }
        dir
    }

    #[test]
    fn test_default_context_path() {
        assert_eq!(
            default_context_path(Path::new("/srv/app/app.json")),
            PathBuf::from("/srv/app/edgestack.context.json")
        );
    }

    #[test]
    fn test_list_stacks() {
        let dir = write_app_dir(true);
        let app = load_app(&dir.path().join("app.json"), None).unwrap();
        let stacks = list_stacks(&app).unwrap();

        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[0].name, "PreContainerStack");
        assert!(stacks[0].dependencies.is_empty());
        assert_eq!(stacks[1].dependencies, vec!["PreContainerStack".to_string()]);
        assert_eq!(stacks[1].environment, "aws://123456789012/us-east-1");
    }

    #[test]
    fn test_show_unknown_stack() {
        let dir = write_app_dir(true);
        let app = load_app(&dir.path().join("app.json"), None).unwrap();
        assert!(matches!(
            show_stack(&app, "NoSuchStack", OutputFormat::Json),
            Err(CommandError::Assembly(AssemblyError::UnknownStack(_)))
        ));
    }

    #[test]
    fn test_synth_without_context_fails() {
        let dir = write_app_dir(false);
        let app = load_app(&dir.path().join("app.json"), None).unwrap();
        let result = synth(&app, &dir.path().join("cdk.out"), OutputFormat::Json);
        assert!(matches!(
            result,
            Err(CommandError::Synth(SynthError::Lookup(
                LookupError::MissingHostedZone { .. }
            )))
        ));
        assert!(!dir.path().join("cdk.out").exists());
    }

    #[test]
    fn test_validation_result() {
        let dir = write_app_dir(false);
        let result = validate_deployment_file(&dir.path().join("app.json"));
        assert!(result.valid);
        assert_eq!(result.config.unwrap().application, "demo-app");

        fs::write(dir.path().join("bad.json"), r#"{"application": "Bad_Name"}"#).unwrap();
        let result = validate_deployment_file(&dir.path().join("bad.json"));
        assert!(!result.valid);
        assert!(result.error.is_some());
    }
}
