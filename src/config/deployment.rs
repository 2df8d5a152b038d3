use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cidr::Ipv4Cidr;

pub const DEFAULT_PRE_CONTAINER_STACK: &str = "PreContainerStack";
pub const DEFAULT_POST_CONTAINER_STACK: &str = "PostContainerStack";

/// Must work as an ECR repository name, a task family prefix and a Cognito
/// domain prefix.
static APPLICATION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]{0,30}[a-z0-9]$").expect("valid regex"));

static DOMAIN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").expect("valid regex")
});

static STACK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("valid regex"));

/// Errors that can occur during deployment config parsing and validation
#[derive(Error, Debug, PartialEq)]
pub enum DeploymentError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid application name '{0}': use 2-32 lowercase letters, digits or '-', starting with a letter")]
    InvalidApplicationName(String),

    #[error("Invalid domain '{0}'")]
    InvalidDomain(String),

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid stack name '{0}'")]
    InvalidStackName(String),

    #[error("Stack name '{0}' is used for both phases")]
    DuplicateStackName(String),
}

/// Explicit target environment; unset fields fall back to the process environment
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Names of the two provisioning phases' stacks
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StackNames {
    #[serde(default = "default_pre_container")]
    pub pre_container: String,
    #[serde(default = "default_post_container")]
    pub post_container: String,
}

impl Default for StackNames {
    fn default() -> Self {
        Self {
            pre_container: default_pre_container(),
            post_container: default_post_container(),
        }
    }
}

fn default_pre_container() -> String {
    DEFAULT_PRE_CONTAINER_STACK.to_string()
}

fn default_post_container() -> String {
    DEFAULT_POST_CONTAINER_STACK.to_string()
}

/// The deployment configuration file structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeploymentConfig {
    /// Application name; also the registry name and DNS label
    pub application: String,
    /// VPC address block
    pub cidr: Ipv4Cidr,
    /// Parent DNS domain hosting `{application}.{domain}`
    pub domain: String,
    /// Container port served behind the load balancer
    pub port: u16,
    #[serde(default)]
    pub env: EnvironmentConfig,
    /// Skips the hosted zone lookup when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosted_zone_id: Option<String>,
    #[serde(default)]
    pub stacks: StackNames,
}

// ============================================================================
// SBIO: Pure parsing functions (no I/O)
// ============================================================================

/// Strip C-style comments from JSONC content.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            result.push(c);
            continue;
        }

        if !in_string && c == '/' {
            if chars.peek() == Some(&'/') {
                chars.next();
                for nc in chars.by_ref() {
                    if nc == '\n' {
                        result.push('\n');
                        break;
                    }
                }
                continue;
            } else if chars.peek() == Some(&'*') {
                chars.next();
                let mut prev = ' ';
                for nc in chars.by_ref() {
                    if prev == '*' && nc == '/' {
                        break;
                    }
                    prev = nc;
                }
                continue;
            }
        }

        result.push(c);
    }

    result
}

/// Parse JSONC content into a deployment config.
pub fn parse_deployment_json(content: &str) -> Result<DeploymentConfig, DeploymentError> {
    let stripped = strip_jsonc_comments(content);
    serde_json::from_str(&stripped).map_err(|e| DeploymentError::ParseError(e.to_string()))
}

/// Parse YAML content into a deployment config.
pub fn parse_deployment_yaml(content: &str) -> Result<DeploymentConfig, DeploymentError> {
    serde_yaml::from_str(content).map_err(|e| DeploymentError::ParseError(e.to_string()))
}

/// Validate a deployment config for consistency.
pub fn validate_deployment(config: &DeploymentConfig) -> Result<(), DeploymentError> {
    if !APPLICATION_NAME.is_match(&config.application) {
        return Err(DeploymentError::InvalidApplicationName(
            config.application.clone(),
        ));
    }

    if config.domain.len() > 253 || !DOMAIN_NAME.is_match(&config.domain) {
        return Err(DeploymentError::InvalidDomain(config.domain.clone()));
    }

    if config.port == 0 {
        return Err(DeploymentError::InvalidPort(config.port));
    }

    for name in [&config.stacks.pre_container, &config.stacks.post_container] {
        if !STACK_NAME.is_match(name) {
            return Err(DeploymentError::InvalidStackName(name.clone()));
        }
    }
    if config.stacks.pre_container == config.stacks.post_container {
        return Err(DeploymentError::DuplicateStackName(
            config.stacks.pre_container.clone(),
        ));
    }

    Ok(())
}

impl DeploymentConfig {
    /// Parse and validate from a JSONC string.
    pub fn from_json(content: &str) -> Result<Self, DeploymentError> {
        let config = parse_deployment_json(content)?;
        validate_deployment(&config)?;
        Ok(config)
    }

    /// Parse and validate from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, DeploymentError> {
        let config = parse_deployment_yaml(content)?;
        validate_deployment(&config)?;
        Ok(config)
    }

    /// Fully qualified name the service is published under
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.application, self.domain)
    }

    /// OAuth callback and default redirect for the app client
    pub fn redirect_uri(&self) -> String {
        format!("https://{}", self.fqdn())
    }
}
