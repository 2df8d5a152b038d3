//! Cloud assembly: the synthesized stacks plus the manifest that tells the
//! provisioning engine how to deploy them.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Environment;
use crate::template::Stack;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_VERSION: &str = "36.0.0";
pub const STACK_ARTIFACT_TYPE: &str = "aws:cloudformation:stack";
pub const DEFAULT_OUTPUT_DIR: &str = "cdk.out";

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Failed to write assembly: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: String, message: String },

    #[error("Stack '{0}' is already part of the assembly")]
    DuplicateStack(String),

    #[error("Stack '{stack}' depends on '{dependency}', which must be added first")]
    MissingDependency { stack: String, dependency: String },

    #[error("No stack named '{0}' in the assembly")]
    UnknownStack(String),
}

/// Template output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

/// File name of a stack's template within the assembly directory
pub fn template_file_name(stack_name: &str, format: OutputFormat) -> String {
    format!("{}.template.{}", stack_name, format.extension())
}

/// Render a template document in the given format
pub fn render_template(stack: &Stack, format: OutputFormat) -> Result<String, AssemblyError> {
    let template = stack.to_template();
    let serialization = |message: String| AssemblyError::Serialization {
        what: format!("template for {}", stack.name()),
        message,
    };
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&template).map_err(|e| serialization(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&template).map_err(|e| serialization(e.to_string()))
        }
    }
}

/// Synthesized stacks in deploy order.
///
/// A stack can only be added once every stack it depends on is present, so
/// insertion order is always a valid deploy order.
#[derive(Debug, Clone)]
pub struct CloudAssembly {
    environment: Environment,
    stacks: Vec<Stack>,
}

impl CloudAssembly {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            stacks: Vec::new(),
        }
    }

    pub fn add_stack(&mut self, stack: Stack) -> Result<(), AssemblyError> {
        if self.stack(stack.name()).is_some() {
            return Err(AssemblyError::DuplicateStack(stack.name().to_string()));
        }
        if let Some(missing) = stack
            .dependencies()
            .iter()
            .find(|dep| self.stack(dep).is_none())
        {
            return Err(AssemblyError::MissingDependency {
                stack: stack.name().to_string(),
                dependency: missing.clone(),
            });
        }
        debug!(
            stack = %stack.name(),
            dependencies = ?stack.dependencies(),
            "added stack to assembly"
        );
        self.stacks.push(stack);
        Ok(())
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name() == name)
    }

    /// Stack names, dependencies first
    pub fn deploy_order(&self) -> Vec<&str> {
        self.stacks.iter().map(Stack::name).collect()
    }

    /// The assembly manifest. Template file names use `format`'s extension.
    pub fn manifest(&self, format: OutputFormat) -> Value {
        let artifacts: Map<String, Value> = self
            .stacks
            .iter()
            .map(|stack| {
                let artifact = json!({
                    "type": STACK_ARTIFACT_TYPE,
                    "environment": self.environment.to_string(),
                    "properties": {
                        "templateFile": template_file_name(stack.name(), format),
                    },
                    "dependencies": stack.dependencies(),
                });
                (stack.name().to_string(), artifact)
            })
            .collect();

        json!({
            "version": MANIFEST_VERSION,
            "artifacts": artifacts,
        })
    }

    // ========================================================================
    // I/O boundary
    // ========================================================================

    /// Write every template and the manifest into `dir`, creating it if
    /// needed. Returns the written paths, manifest last.
    pub fn write_to(
        &self,
        dir: &Path,
        format: OutputFormat,
    ) -> Result<Vec<PathBuf>, AssemblyError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.stacks.len() + 1);

        for stack in &self.stacks {
            let path = dir.join(template_file_name(stack.name(), format));
            fs::write(&path, render_template(stack, format)?)?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }

        let manifest = serde_json::to_string_pretty(&self.manifest(format)).map_err(|e| {
            AssemblyError::Serialization {
                what: "manifest".to_string(),
                message: e.to_string(),
            }
        })?;
        let manifest_path = dir.join(MANIFEST_FILE);
        fs::write(&manifest_path, manifest)?;
        written.push(manifest_path);

        info!(
            "Wrote {} stack(s) to {}",
            self.stacks.len(),
            dir.display()
        );
        Ok(written)
    }
}
