//! Two-phase synthesis entry point
//!
//! [`App`] fixes the global parameters (deployment config, target
//! environment, cached lookups) and synthesizes the pre-container stack
//! followed by the post-container stack into one [`CloudAssembly`].

use tracing::info;

use crate::assembly::CloudAssembly;
use crate::config::{DeploymentConfig, Environment};
use crate::lookup::{resolve_hosted_zone, LookupContext};
use crate::stacks::{NetworkStack, ServiceInputs, ServiceStack, SynthError};

pub struct App {
    config: DeploymentConfig,
    environment: Environment,
    context: LookupContext,
}

impl App {
    pub fn new(config: DeploymentConfig, environment: Environment, context: LookupContext) -> Self {
        Self {
            config,
            environment,
            context,
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Synthesize both phases.
    ///
    /// The service stack only ever sees handles produced by the network stack
    /// of this same app; the assembly records the stack dependency.
    pub fn synthesize(&self) -> Result<CloudAssembly, SynthError> {
        info!(
            "Synthesizing {} for {} ({})",
            self.config.application,
            self.config.fqdn(),
            self.environment
        );

        let network = NetworkStack::synthesize(&self.config)?;
        let outputs = network.outputs.clone();
        let inputs = ServiceInputs::builder()
            .vpc(outputs.vpc)
            .cluster(outputs.cluster)
            .repository(outputs.repository)
            .build()?;
        ensure_known_producers(&inputs, &[network.stack.name()])?;

        let zone = resolve_hosted_zone(&self.config, &self.environment, &self.context)?;
        let service = ServiceStack::synthesize(&self.config, &inputs, &zone)?;

        let mut assembly = CloudAssembly::new(self.environment.clone());
        for stack in [network.stack, service.stack] {
            assembly
                .add_stack(stack)
                .map_err(|e| SynthError::Assembly(e.to_string()))?;
        }
        Ok(assembly)
    }
}

/// Reject handles whose producing stack is not one of `known`
pub fn ensure_known_producers(inputs: &ServiceInputs, known: &[&str]) -> Result<(), SynthError> {
    for (handle, producer) in inputs.producers() {
        if !known.contains(&producer) {
            return Err(SynthError::UnknownProducer {
                handle: handle.to_string(),
                producer: producer.to_string(),
            });
        }
    }
    Ok(())
}
