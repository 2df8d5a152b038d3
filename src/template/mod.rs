//! CloudFormation template model
//!
//! Stacks are built by declaring typed resources at construct paths. Values
//! that the provisioning engine resolves (`Ref`, `Fn::GetAtt`, imports) are
//! carried as [`Expr`]; nothing here talks to AWS.

pub mod assertions;
mod expr;
mod logical_id;
pub mod resources;
mod stack;

pub use expr::{Expr, Pseudo};
pub use logical_id::LogicalId;
pub use stack::{
    CfnResource, DeletionPolicy, Exported, Output, ResourceEntry, Stack, PATH_METADATA_KEY,
    TEMPLATE_FORMAT_VERSION,
};

use thiserror::Error;

/// Errors raised while declaring or rendering a stack
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Duplicate logical id: '{0}'")]
    DuplicateLogicalId(String),

    #[error("Duplicate output name: '{0}'")]
    DuplicateOutput(String),

    #[error("Resource '{0}' is not declared in this stack")]
    UnknownResource(String),

    #[error("'{from}' references '{to}', which is not declared in this stack")]
    DanglingReference { from: String, to: String },

    #[error("Invalid listener configuration: {0}")]
    InvalidListener(String),

    #[error("Failed to serialize resource properties: {0}")]
    Serialization(String),
}
