//! Handles passed from the pre-container phase to the post-container phase
//!
//! Every value inside a handle is an [`Exported`], which only
//! [`Stack::export`](crate::template::Stack::export) can create. Holding a
//! handle therefore means the producing stack has already been synthesized.

use crate::cidr::Ipv4Cidr;
use crate::template::Exported;

use super::SynthError;

#[derive(Debug, Clone, PartialEq)]
pub struct VpcHandle {
    pub vpc_id: Exported,
    pub cidr: Ipv4Cidr,
    pub public_subnets: Vec<Exported>,
    pub private_subnets: Vec<Exported>,
}

impl VpcHandle {
    pub fn producer(&self) -> &str {
        self.vpc_id.producer()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterHandle {
    pub cluster_name: Exported,
    pub cluster_arn: Exported,
}

impl ClusterHandle {
    pub fn producer(&self) -> &str {
        self.cluster_name.producer()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryHandle {
    pub repository_name: String,
    pub repository_arn: Exported,
    pub repository_uri: Exported,
}

impl RepositoryHandle {
    pub fn producer(&self) -> &str {
        self.repository_uri.producer()
    }
}

/// Everything the network & registry phase hands downstream
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOutputs {
    pub vpc: VpcHandle,
    pub cluster: ClusterHandle,
    pub repository: RepositoryHandle,
}

impl NetworkOutputs {
    pub fn into_service_inputs(self) -> ServiceInputs {
        ServiceInputs {
            vpc: self.vpc,
            cluster: self.cluster,
            repository: self.repository,
        }
    }
}

/// Resolved inputs of the service & edge phase
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInputs {
    vpc: VpcHandle,
    cluster: ClusterHandle,
    repository: RepositoryHandle,
}

impl ServiceInputs {
    pub fn builder() -> ServiceInputsBuilder {
        ServiceInputsBuilder::default()
    }

    pub fn vpc(&self) -> &VpcHandle {
        &self.vpc
    }

    pub fn cluster(&self) -> &ClusterHandle {
        &self.cluster
    }

    pub fn repository(&self) -> &RepositoryHandle {
        &self.repository
    }

    /// `(handle, producing stack)` for each input
    pub fn producers(&self) -> [(&'static str, &str); 3] {
        [
            ("vpc", self.vpc.producer()),
            ("cluster", self.cluster.producer()),
            ("repository", self.repository.producer()),
        ]
    }
}

/// Collects handles one at a time; `build` refuses to fill any gap.
#[derive(Debug, Clone, Default)]
pub struct ServiceInputsBuilder {
    vpc: Option<VpcHandle>,
    cluster: Option<ClusterHandle>,
    repository: Option<RepositoryHandle>,
}

impl ServiceInputsBuilder {
    pub fn vpc(mut self, vpc: VpcHandle) -> Self {
        self.vpc = Some(vpc);
        self
    }

    pub fn cluster(mut self, cluster: ClusterHandle) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn repository(mut self, repository: RepositoryHandle) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn build(self) -> Result<ServiceInputs, SynthError> {
        Ok(ServiceInputs {
            vpc: self.vpc.ok_or(SynthError::UnresolvedHandle("vpc"))?,
            cluster: self.cluster.ok_or(SynthError::UnresolvedHandle("cluster"))?,
            repository: self
                .repository
                .ok_or(SynthError::UnresolvedHandle("repository"))?,
        })
    }
}
