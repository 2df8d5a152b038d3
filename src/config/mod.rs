pub mod deployment;
pub mod environment;

pub use deployment::{
    parse_deployment_json, parse_deployment_yaml, strip_jsonc_comments, validate_deployment,
    DeploymentConfig, DeploymentError, EnvironmentConfig, StackNames,
};
pub use environment::{environment_from_process, load_env_file, resolve_environment, Environment};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors for file I/O operations (separate from pure parsing errors)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Deployment config error: {0}")]
    DeploymentError(#[from] DeploymentError),

    #[error("Failed to load env file {path}: {1}", path = .0.display())]
    EnvFile(PathBuf, String),
}

// ============================================================================
// SBIO: I/O wrapper - thin layer over pure functions
// ============================================================================

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// True if the path names a YAML document
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Load and validate a deployment config from disk.
/// `.yaml`/`.yml` files are read as YAML, everything else as JSONC.
pub fn load_deployment_file(path: &Path) -> Result<DeploymentConfig, ConfigError> {
    let path = expand_path(path);
    let content = std::fs::read_to_string(&path)?;
    let config = if is_yaml_path(&path) {
        DeploymentConfig::from_yaml(&content)?
    } else {
        DeploymentConfig::from_json(&content)?
    };
    Ok(config)
}
