//! The two provisioning phases
//!
//! - [`network`]: VPC, ECS cluster and ECR repository (pre-container)
//! - [`service`]: Fargate service, load balancer, DNS, certificate and
//!   Cognito identity bundle (post-container)
//!
//! The phases communicate only through [`NetworkOutputs`] /
//! [`ServiceInputs`].

pub mod handles;
pub mod network;
pub mod service;

pub use handles::{
    ClusterHandle, NetworkOutputs, RepositoryHandle, ServiceInputs, ServiceInputsBuilder,
    VpcHandle,
};
pub use network::NetworkStack;
pub use service::ServiceStack;

use thiserror::Error;

use crate::cidr::CidrError;
use crate::lookup::LookupError;
use crate::template::TemplateError;

/// Errors that abort a synthesis
#[derive(Error, Debug, PartialEq)]
pub enum SynthError {
    #[error("Unresolved {0} handle: the pre-container stack must be synthesized first")]
    UnresolvedHandle(&'static str),

    #[error("The {handle} handle comes from stack '{producer}', which is not part of this app")]
    UnknownProducer { handle: String, producer: String },

    #[error("Subnet allocation failed: {0}")]
    Cidr(#[from] CidrError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Assembly error: {0}")]
    Assembly(String),
}
