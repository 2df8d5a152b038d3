use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Template-unique resource name derived from a construct path.
///
/// The human-readable part is the alphanumeric characters of the path
/// components; the suffix is the first 8 hex digits of the SHA-256 of the
/// full path, so two paths that flatten to the same text still differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

/// CloudFormation caps logical ids at 255 characters
const MAX_HUMAN_LEN: usize = 255 - 8;

impl LogicalId {
    pub fn from_path(path: &[&str]) -> Self {
        let human: String = path
            .iter()
            .filter(|c| **c != "Resource")
            .flat_map(|c| c.chars())
            .filter(char::is_ascii_alphanumeric)
            .take(MAX_HUMAN_LEN)
            .collect();

        let digest = Sha256::digest(path.join("/").as_bytes());
        let hash = format!("{:X}", digest);
        LogicalId(format!("{}{}", human, &hash[..8]))
    }

    /// Split a `/`-separated construct path and derive its id
    pub fn from_path_str(path: &str) -> Self {
        let parts: Vec<&str> = path.split('/').collect();
        Self::from_path(&parts)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
