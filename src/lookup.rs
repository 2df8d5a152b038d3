//! Hosted zone resolution
//!
//! The alias record and the certificate's DNS validation both need the id of
//! the public hosted zone for the configured domain. It comes from, in order:
//! an explicit `hosted-zone-id` in the deployment config, then a cached lookup
//! in the context file. Nothing is fetched from AWS; a miss is an error that
//! names the exact key to add. Context lookups need a resolved account and
//! region.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{DeploymentConfig, Environment};

/// Context file looked for next to the deployment config
pub const DEFAULT_CONTEXT_FILE: &str = "edgestack.context.json";

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

#[derive(Error, Debug, PartialEq)]
pub enum LookupError {
    #[error("Failed to read lookup context: {0}")]
    Io(String),

    #[error("Failed to parse lookup context: {0}")]
    Parse(String),

    #[error("No hosted zone for this domain: set \"hosted-zone-id\" or add context key \"{key}\"")]
    MissingHostedZone { key: String },

    #[error("Context entry \"{key}\" has no \"Id\" field")]
    MalformedEntry { key: String },

    #[error(
        "Cannot look up the hosted zone for {domain} without an account and region: \
         set \"env\" in the config, export CDK_DEFAULT_ACCOUNT/CDK_DEFAULT_REGION, \
         or set \"hosted-zone-id\""
    )]
    UnresolvedEnvironment { domain: String },
}

/// Cached lookup results keyed by lookup description
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LookupContext {
    entries: BTreeMap<String, Value>,
}

/// A resolved public hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

impl LookupContext {
    pub fn from_json(content: &str) -> Result<Self, LookupError> {
        serde_json::from_str(content).map_err(|e| LookupError::Parse(e.to_string()))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Context key for a hosted zone lookup
pub fn hosted_zone_key(env: &Environment, domain: &str) -> String {
    format!(
        "hosted-zone:account={}:domainName={}:region={}",
        env.account_or_unknown(),
        domain,
        env.region_or_unknown()
    )
}

/// Strip the `/hostedzone/` prefix Route 53 puts on zone ids
pub fn normalize_zone_id(id: &str) -> String {
    id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id).to_string()
}

fn zone_name(domain: &str) -> String {
    format!("{}.", domain.trim_end_matches('.'))
}

// ============================================================================
// SBIO: Pure resolution
// ============================================================================

/// Resolve the hosted zone for the configured domain.
pub fn resolve_hosted_zone(
    config: &DeploymentConfig,
    env: &Environment,
    context: &LookupContext,
) -> Result<HostedZone, LookupError> {
    if let Some(ref id) = config.hosted_zone_id {
        debug!(zone_id = %id, "using hosted zone id from config");
        return Ok(HostedZone {
            id: normalize_zone_id(id),
            name: zone_name(&config.domain),
        });
    }

    if !env.is_resolved() {
        return Err(LookupError::UnresolvedEnvironment {
            domain: config.domain.clone(),
        });
    }

    let key = hosted_zone_key(env, &config.domain);
    let entry = context
        .get(&key)
        .ok_or_else(|| LookupError::MissingHostedZone { key: key.clone() })?;
    let id = entry
        .get("Id")
        .and_then(Value::as_str)
        .ok_or_else(|| LookupError::MalformedEntry { key: key.clone() })?;
    let name = entry
        .get("Name")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| zone_name(&config.domain));

    debug!(%key, zone_id = %id, "resolved hosted zone from context");
    Ok(HostedZone {
        id: normalize_zone_id(id),
        name,
    })
}

// ============================================================================
// I/O boundary functions
// ============================================================================

/// Load a context file; a missing file is an empty context.
pub fn load_context_file(path: &Path) -> Result<LookupContext, LookupError> {
    if !path.exists() {
        info!("No lookup context at {}", path.display());
        return Ok(LookupContext::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| LookupError::Io(e.to_string()))?;
    LookupContext::from_json(&content)
}
