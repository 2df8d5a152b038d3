//! edgestack: synthesize the CloudFormation stacks that host a containerized
//! web application behind HTTPS, in two deployable phases.
//!
//! - Pre-container: VPC, ECS cluster and ECR repository ([`stacks::network`])
//! - Post-container: Fargate service, ALB, DNS, certificate and Cognito
//!   ([`stacks::service`])
//!
//! Nothing here calls AWS. The output is a cloud assembly directory that a
//! provisioning engine deploys.

pub mod app;
pub mod assembly;
pub mod cidr;
pub mod cli;
pub mod config;
pub mod lookup;
pub mod stacks;
pub mod template;

pub use app::App;
pub use assembly::{CloudAssembly, OutputFormat};
pub use config::DeploymentConfig;
