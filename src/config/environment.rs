//! Target account and region resolution
//!
//! Explicit values from the deployment config win; otherwise the process
//! environment is consulted in the same order the CDK toolchain uses.

use std::fmt;
use std::path::Path;

use tracing::debug;

use super::deployment::EnvironmentConfig;
use super::ConfigError;

pub const ACCOUNT_VARIABLES: &[&str] = &["CDK_DEFAULT_ACCOUNT", "AWS_ACCOUNT_ID"];
pub const REGION_VARIABLES: &[&str] = &["CDK_DEFAULT_REGION", "AWS_REGION", "AWS_DEFAULT_REGION"];

pub const UNKNOWN_ACCOUNT: &str = "unknown-account";
pub const UNKNOWN_REGION: &str = "unknown-region";

/// Resolved deployment target. Either half may stay unresolved, in which
/// case the templates are environment-agnostic for that half.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            region: Some(region.into()),
        }
    }

    pub fn account_or_unknown(&self) -> &str {
        self.account.as_deref().unwrap_or(UNKNOWN_ACCOUNT)
    }

    pub fn region_or_unknown(&self) -> &str {
        self.region.as_deref().unwrap_or(UNKNOWN_REGION)
    }

    pub fn is_resolved(&self) -> bool {
        self.account.is_some() && self.region.is_some()
    }
}

/// Renders as `aws://{account}/{region}`
impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aws://{}/{}",
            self.account_or_unknown(),
            self.region_or_unknown()
        )
    }
}

// ============================================================================
// SBIO: Pure resolution (lookup is injected)
// ============================================================================

/// Resolve the environment from explicit config, then `lookup`.
pub fn resolve_environment<F>(explicit: &EnvironmentConfig, lookup: F) -> Environment
where
    F: Fn(&str) -> Option<String>,
{
    let first_set = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
    };

    let account = explicit
        .account
        .clone()
        .or_else(|| first_set(ACCOUNT_VARIABLES));
    let region = explicit
        .region
        .clone()
        .or_else(|| first_set(REGION_VARIABLES));

    Environment { account, region }
}

// ============================================================================
// I/O boundary functions
// ============================================================================

/// Resolve against the real process environment
pub fn environment_from_process(explicit: &EnvironmentConfig) -> Environment {
    let env = resolve_environment(explicit, |name| std::env::var(name).ok());
    debug!(environment = %env, "resolved target environment");
    env
}

/// Load a `.env` file into the process environment
pub fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path).map_err(|e| ConfigError::EnvFile(path.to_path_buf(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_cdk_variables_take_priority() {
        let env = resolve_environment(
            &EnvironmentConfig::default(),
            lookup(&[
                ("CDK_DEFAULT_ACCOUNT", "111111111111"),
                ("AWS_ACCOUNT_ID", "222222222222"),
                ("AWS_REGION", "us-east-2"),
            ]),
        );
        assert_eq!(env, Environment::new("111111111111", "us-east-2"));
        assert!(env.is_resolved());
    }

    #[test]
    fn test_explicit_config_wins() {
        let explicit = EnvironmentConfig {
            account: Some("333333333333".into()),
            region: None,
        };
        let env = resolve_environment(
            &explicit,
            lookup(&[
                ("CDK_DEFAULT_ACCOUNT", "111111111111"),
                ("CDK_DEFAULT_REGION", "ap-south-1"),
            ]),
        );
        assert_eq!(env, Environment::new("333333333333", "ap-south-1"));
    }

    #[test]
    fn test_blank_values_ignored() {
        let env = resolve_environment(
            &EnvironmentConfig::default(),
            lookup(&[("CDK_DEFAULT_REGION", "  "), ("AWS_DEFAULT_REGION", "eu-central-1")]),
        );
        assert_eq!(env.region.as_deref(), Some("eu-central-1"));
        assert!(env.account.is_none());
    }

    #[test]
    fn test_unresolved_display() {
        let env = Environment::default();
        assert_eq!(env.to_string(), "aws://unknown-account/unknown-region");
        assert!(!env.is_resolved());
    }
}
