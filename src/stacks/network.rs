//! Network & registry provisioner (pre-container phase)

use tracing::info;

use crate::cidr::SubnetAllocator;
use crate::config::DeploymentConfig;
use crate::template::resources::{
    Cluster, ClusterSetting, ElasticIp, EncryptionConfiguration, ImageScanningConfiguration,
    InternetGateway, NatGateway, Repository, Route, RouteTable, RouteTarget, Subnet,
    SubnetRouteTableAssociation, Tag, Vpc, VpcGatewayAttachment,
};
use crate::template::{DeletionPolicy, Exported, Expr, LogicalId, Stack, TemplateError};

use super::{ClusterHandle, NetworkOutputs, RepositoryHandle, SynthError, VpcHandle};

/// Prefix length of every subnet
pub const SUBNET_CIDR_MASK: u8 = 28;

/// Availability zones the VPC spans
pub const MAX_AZS: u32 = 2;

/// NAT gateways shared by the private tier, placed in the first public subnets
pub const NAT_GATEWAYS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetTier {
    Public,
    Private,
}

impl SubnetTier {
    /// Allocation order of the tiers
    pub const ALL: [SubnetTier; 2] = [SubnetTier::Public, SubnetTier::Private];

    pub fn label(&self) -> &'static str {
        match self {
            SubnetTier::Public => "Public",
            SubnetTier::Private => "Private",
        }
    }
}

/// Logical ids of one declared subnet and its routing
#[derive(Debug, Clone)]
pub struct SubnetIds {
    pub tier: SubnetTier,
    pub zone_index: u32,
    pub subnet: LogicalId,
    pub route_table: LogicalId,
    pub default_route: LogicalId,
}

/// The synthesized pre-container stack
#[derive(Debug, Clone)]
pub struct NetworkStack {
    pub stack: Stack,
    pub outputs: NetworkOutputs,
    pub vpc: LogicalId,
    pub internet_gateway: LogicalId,
    pub nat_gateways: Vec<LogicalId>,
    pub subnets: Vec<SubnetIds>,
    pub cluster: LogicalId,
    pub repository: LogicalId,
}

impl NetworkStack {
    /// Declare the VPC, the ECS cluster and the ECR repository, and export
    /// their handles.
    pub fn synthesize(config: &DeploymentConfig) -> Result<Self, SynthError> {
        let app = &config.application;
        let stack_name = config.stacks.pre_container.clone();
        let mut stack = Stack::new(&stack_name)
            .with_description(format!("Network, cluster and image registry for {}", app));

        // VPC & SUBNETS
        let vpc_path = format!("{}-vpc", app);
        let vpc = stack.add(
            &format!("{}/Resource", vpc_path),
            Vpc {
                cidr_block: config.cidr.to_string(),
                enable_dns_hostnames: true,
                enable_dns_support: true,
                instance_tenancy: "default".to_string(),
                tags: Tag::name(format!("{}/{}", stack_name, vpc_path)),
            },
        )?;

        let internet_gateway = stack.add(
            &format!("{}/IGW", vpc_path),
            InternetGateway {
                tags: Tag::name(format!("{}/{}", stack_name, vpc_path)),
            },
        )?;
        let attachment = stack.add(
            &format!("{}/VPCGW", vpc_path),
            VpcGatewayAttachment {
                vpc_id: Expr::Ref(vpc.clone()),
                internet_gateway_id: Expr::Ref(internet_gateway.clone()),
            },
        )?;

        let mut allocator = SubnetAllocator::new(config.cidr);
        let mut subnets = Vec::new();
        let mut nat_gateways: Vec<LogicalId> = Vec::new();

        for tier in SubnetTier::ALL {
            for zone_index in 0..MAX_AZS {
                let cidr = allocator.allocate(SUBNET_CIDR_MASK)?;
                let base = format!("{}/{}Subnet{}", vpc_path, tier.label(), zone_index + 1);
                let mut tags = Tag::name(format!("{}/{}", stack_name, base));
                tags.push(Tag {
                    key: "edgestack:subnet-name".to_string(),
                    value: format!("{}-{}", app, tier.label().to_lowercase()),
                });
                tags.push(Tag {
                    key: "edgestack:subnet-type".to_string(),
                    value: tier.label().to_string(),
                });

                let subnet = stack.add(
                    &format!("{}/Subnet", base),
                    Subnet {
                        vpc_id: Expr::Ref(vpc.clone()),
                        availability_zone: Expr::availability_zone(zone_index),
                        cidr_block: cidr.to_string(),
                        map_public_ip_on_launch: tier == SubnetTier::Public,
                        tags,
                    },
                )?;
                let route_table = stack.add(
                    &format!("{}/RouteTable", base),
                    RouteTable {
                        vpc_id: Expr::Ref(vpc.clone()),
                        tags: Tag::name(format!("{}/{}", stack_name, base)),
                    },
                )?;
                let association = stack.add(
                    &format!("{}/RouteTableAssociation", base),
                    SubnetRouteTableAssociation {
                        route_table_id: Expr::Ref(route_table.clone()),
                        subnet_id: Expr::Ref(subnet.clone()),
                    },
                )?;

                let target = match tier {
                    SubnetTier::Public => {
                        RouteTarget::InternetGateway(Expr::Ref(internet_gateway.clone()))
                    }
                    SubnetTier::Private => {
                        let nat = nat_gateways
                            .get(zone_index as usize % NAT_GATEWAYS)
                            .ok_or_else(|| TemplateError::UnknownResource("NATGateway".into()))?;
                        RouteTarget::NatGateway(Expr::Ref(nat.clone()))
                    }
                };
                let default_route = stack.add(
                    &format!("{}/DefaultRoute", base),
                    Route::default_route(Expr::Ref(route_table.clone()), target),
                )?;

                if tier == SubnetTier::Public {
                    stack.add_dependency(&default_route, &attachment)?;

                    if (zone_index as usize) < NAT_GATEWAYS {
                        let eip = stack.add(
                            &format!("{}/EIP", base),
                            ElasticIp {
                                domain: "vpc".to_string(),
                                tags: Tag::name(format!("{}/{}", stack_name, base)),
                            },
                        )?;
                        let nat = stack.add(
                            &format!("{}/NATGateway", base),
                            NatGateway {
                                subnet_id: Expr::Ref(subnet.clone()),
                                allocation_id: Expr::get_att(&eip, "AllocationId"),
                                tags: Tag::name(format!("{}/{}", stack_name, base)),
                            },
                        )?;
                        stack.add_dependency(&nat, &default_route)?;
                        stack.add_dependency(&nat, &association)?;
                        nat_gateways.push(nat);
                    }
                }

                subnets.push(SubnetIds {
                    tier,
                    zone_index,
                    subnet,
                    route_table,
                    default_route,
                });
            }
        }

        // ECS CLUSTER
        let cluster = stack.add(
            "ecsCluster",
            Cluster {
                cluster_settings: vec![ClusterSetting {
                    name: "containerInsights".to_string(),
                    value: "enabled".to_string(),
                }],
            },
        )?;

        // ECR REPO
        let repository = stack.add(
            "ecr-repo",
            Repository {
                repository_name: app.clone(),
                image_scanning_configuration: ImageScanningConfiguration { scan_on_push: true },
                encryption_configuration: EncryptionConfiguration {
                    encryption_type: "AES256".to_string(),
                },
            },
        )?;
        stack.set_deletion_policy(&repository, DeletionPolicy::Delete)?;

        let outputs = export_handles(&mut stack, config, &vpc, &subnets, &cluster, &repository)?;
        stack.validate()?;

        info!(
            "Synthesized {} ({} resources, {} exports)",
            stack.name(),
            stack.resources().len(),
            stack.outputs().len()
        );

        Ok(Self {
            stack,
            outputs,
            vpc,
            internet_gateway,
            nat_gateways,
            subnets,
            cluster,
            repository,
        })
    }

    pub fn subnets_in(&self, tier: SubnetTier) -> Vec<&SubnetIds> {
        self.subnets.iter().filter(|s| s.tier == tier).collect()
    }
}

fn export_handles(
    stack: &mut Stack,
    config: &DeploymentConfig,
    vpc: &LogicalId,
    subnets: &[SubnetIds],
    cluster: &LogicalId,
    repository: &LogicalId,
) -> Result<NetworkOutputs, TemplateError> {
    let vpc_id = stack.export("VpcId", Expr::Ref(vpc.clone()), Some("VPC id"))?;

    let mut public_subnets: Vec<Exported> = Vec::new();
    let mut private_subnets: Vec<Exported> = Vec::new();
    for ids in subnets {
        let name = format!("{}Subnet{}Id", ids.tier.label(), ids.zone_index + 1);
        let exported = stack.export(&name, Expr::Ref(ids.subnet.clone()), None)?;
        match ids.tier {
            SubnetTier::Public => public_subnets.push(exported),
            SubnetTier::Private => private_subnets.push(exported),
        }
    }

    let cluster_name = stack.export("ClusterName", Expr::Ref(cluster.clone()), None)?;
    let cluster_arn = stack.export("ClusterArn", Expr::get_att(cluster, "Arn"), None)?;

    let repository_arn =
        stack.export("RepositoryArn", Expr::get_att(repository, "Arn"), None)?;
    let repository_uri = stack.export(
        "RepositoryUri",
        Expr::get_att(repository, "RepositoryUri"),
        Some("Push images here; the service runs the 'latest' tag"),
    )?;

    Ok(NetworkOutputs {
        vpc: VpcHandle {
            vpc_id,
            cidr: config.cidr,
            public_subnets,
            private_subnets,
        },
        cluster: ClusterHandle {
            cluster_name,
            cluster_arn,
        },
        repository: RepositoryHandle {
            repository_name: config.application.clone(),
            repository_arn,
            repository_uri,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::assertions::TemplateAssertions;
    use serde_json::json;

    fn config(cidr: &str) -> DeploymentConfig {
        DeploymentConfig::from_json(&format!(
            r#"{{"application": "demo-app", "cidr": "{}", "domain": "example.com", "port": 8501}}"#,
            cidr
        ))
        .unwrap()
    }

    #[test]
    fn test_two_tiers_across_two_zones() {
        let network = NetworkStack::synthesize(&config("10.0.0.0/24")).unwrap();
        let template = TemplateAssertions::from_stack(&network.stack);

        assert_eq!(template.resource_count("AWS::EC2::Subnet"), 4);
        for tier in SubnetTier::ALL {
            let zones: Vec<u32> = network.subnets_in(tier).iter().map(|s| s.zone_index).collect();
            assert_eq!(zones, vec![0, 1]);
        }

        let cidrs: Vec<String> = template
            .resources_of_type("AWS::EC2::Subnet")
            .iter()
            .map(|(_, r)| r["Properties"]["CidrBlock"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            cidrs,
            vec!["10.0.0.0/28", "10.0.0.16/28", "10.0.0.32/28", "10.0.0.48/28"]
        );
    }

    #[test]
    fn test_private_tier_has_no_internet_gateway_route() {
        let network = NetworkStack::synthesize(&config("10.0.0.0/24")).unwrap();
        let igw = network.internet_gateway.as_str();

        for ids in network.subnets_in(SubnetTier::Private) {
            let route = network.stack.resource(&ids.default_route).unwrap();
            assert!(route.properties.get("GatewayId").is_none());
            assert!(!route.references().iter().any(|r| r == igw));
            assert_eq!(
                route.properties["NatGatewayId"],
                json!({"Ref": network.nat_gateways[0].as_str()})
            );
        }
        for ids in network.subnets_in(SubnetTier::Public) {
            let route = network.stack.resource(&ids.default_route).unwrap();
            assert_eq!(route.properties["GatewayId"], json!({"Ref": igw}));
        }

        let subnets = TemplateAssertions::from_stack(&network.stack);
        assert_eq!(
            subnets.find_resources("AWS::EC2::Subnet", &json!({"MapPublicIpOnLaunch": true})).len(),
            2
        );
    }

    #[test]
    fn test_single_nat_gateway_in_first_public_subnet() {
        let network = NetworkStack::synthesize(&config("10.0.0.0/24")).unwrap();
        assert_eq!(network.nat_gateways.len(), NAT_GATEWAYS);
        let nat = network.stack.resource(&network.nat_gateways[0]).unwrap();
        let first_public = &network.subnets_in(SubnetTier::Public)[0].subnet;
        assert_eq!(nat.properties["SubnetId"], json!({"Ref": first_public.as_str()}));
        assert!(!nat.depends_on.is_empty());
    }

    #[test]
    fn test_cluster_and_repository() {
        let network = NetworkStack::synthesize(&config("10.0.0.0/24")).unwrap();
        let template = TemplateAssertions::from_stack(&network.stack);

        assert!(template.has_resource_properties(
            "AWS::ECS::Cluster",
            &json!({"ClusterSettings": [{"Name": "containerInsights", "Value": "enabled"}]})
        ));
        assert!(template.has_resource_properties(
            "AWS::ECR::Repository",
            &json!({
                "RepositoryName": "demo-app",
                "ImageScanningConfiguration": {"ScanOnPush": true},
                "EncryptionConfiguration": {"EncryptionType": "AES256"}
            })
        ));
        assert!(template.has_resource(
            "AWS::ECR::Repository",
            &json!({"DeletionPolicy": "Delete"})
        ));
    }

    #[test]
    fn test_outputs_are_exported_handles() {
        let network = NetworkStack::synthesize(&config("10.0.0.0/24")).unwrap();
        let outputs = &network.outputs;
        assert_eq!(outputs.vpc.vpc_id.export_name(), "PreContainerStack:VpcId");
        assert_eq!(outputs.vpc.public_subnets.len(), 2);
        assert_eq!(outputs.vpc.private_subnets.len(), 2);
        assert_eq!(
            outputs.vpc.private_subnets[1].export_name(),
            "PreContainerStack:PrivateSubnet2Id"
        );
        assert_eq!(outputs.cluster.producer(), "PreContainerStack");
        assert_eq!(outputs.repository.repository_name, "demo-app");
        assert_eq!(network.stack.outputs().len(), 9);
    }

    #[test]
    fn test_block_too_small_for_four_subnets() {
        let result = NetworkStack::synthesize(&config("10.0.0.0/27"));
        assert!(matches!(result, Err(SynthError::Cidr(_))));
    }

    #[test]
    fn test_any_block_gets_same_shape() {
        for cidr in ["172.16.0.0/16", "192.168.10.0/26", "10.255.0.0/24"] {
            let network = NetworkStack::synthesize(&config(cidr)).unwrap();
            assert_eq!(network.subnets.len(), 4, "{}", cidr);
            let block = config(cidr).cidr;
            let template = TemplateAssertions::from_stack(&network.stack);
            for (_, subnet) in template.resources_of_type("AWS::EC2::Subnet") {
                let sub: crate::cidr::Ipv4Cidr =
                    subnet["Properties"]["CidrBlock"].as_str().unwrap().parse().unwrap();
                assert!(block.contains(&sub));
            }
        }
    }
}
