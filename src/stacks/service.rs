//! Service & edge provisioner (post-container phase)
//!
//! Declares the Fargate service behind an HTTPS load balancer, the DNS alias
//! and certificate for `{application}.{domain}`, and a Cognito identity
//! bundle whose credentials reach the container through Secrets Manager.

use tracing::info;

use crate::config::DeploymentConfig;
use crate::lookup::HostedZone;
use crate::template::resources::{
    AccountRecoverySetting, AdminCreateUserConfig, AliasTarget, AwsVpcConfiguration, Certificate,
    CidrRule, CognitoIdentityProvider, ContainerDefinition, ContainerSecret, CpuArchitecture,
    DeploymentConfiguration, DomainValidationOption, IdentityPool, Listener, LoadBalancer,
    LoadBalancerAttribute, NetworkConfiguration, Policy, PolicyDocument, PolicyStatement,
    PortMapping, RecordSet, RecoveryOption, Role, RuntimePlatform, Secret, SecurityGroup,
    SecurityGroupIngress, Service, ServiceLoadBalancer, Tag, TargetGroup, TaskDefinition, UserPool,
    UserPoolClient, UserPoolDomain, LISTENER_SSL_POLICY,
};
use crate::template::{DeletionPolicy, Expr, LogicalId, Stack};

use super::{ServiceInputs, SynthError};

pub const TASK_CPU: u32 = 256;
pub const TASK_MEMORY_MIB: u32 = 1024;
pub const DESIRED_COUNT: u32 = 2;
pub const CONTAINER_NAME: &str = "Task-Container";
pub const IMAGE_TAG: &str = "latest";
pub const ECS_TASKS_PRINCIPAL: &str = "ecs-tasks.amazonaws.com";
pub const OAUTH_SCOPE: &str = "aws.cognito.signin.user.admin";

/// Repository-scoped actions the execution role needs to pull the image
pub const IMAGE_PULL_ACTIONS: [&str; 3] = [
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
];

/// Keys of the credential record, also the container's secret names
pub const CREDENTIAL_KEYS: [&str; 3] = ["POOL_ID", "APP_CLIENT_ID", "APP_CLIENT_SECRET"];

/// Logical ids of the identity bundle
#[derive(Debug, Clone)]
pub struct IdentityIds {
    pub user_pool: LogicalId,
    pub user_pool_client: LogicalId,
    pub user_pool_domain: LogicalId,
    pub identity_pool: LogicalId,
}

/// The synthesized post-container stack
#[derive(Debug, Clone)]
pub struct ServiceStack {
    pub stack: Stack,
    pub task_role: LogicalId,
    pub execution_role: LogicalId,
    pub service_security_group: LogicalId,
    pub service_ingress: LogicalId,
    pub target_group: LogicalId,
    pub load_balancer_security_group: LogicalId,
    pub load_balancer: LogicalId,
    pub alias_record: LogicalId,
    pub certificate: LogicalId,
    pub listener: LogicalId,
    pub identity: IdentityIds,
    pub credentials: LogicalId,
    pub credentials_grant: LogicalId,
    pub task_definition: LogicalId,
    pub service: LogicalId,
}

impl ServiceStack {
    /// Declare the request-serving stack on top of the pre-container handles.
    pub fn synthesize(
        config: &DeploymentConfig,
        inputs: &ServiceInputs,
        zone: &HostedZone,
    ) -> Result<Self, SynthError> {
        let app = &config.application;
        let port = config.port;
        let fqdn = config.fqdn();
        let redirect_uri = config.redirect_uri();

        let mut stack = Stack::new(&config.stacks.post_container)
            .with_description(format!("Service, edge and identity for {}", app));

        let vpc_id = stack.import(&inputs.vpc().vpc_id);
        let public_subnets: Vec<Expr> = inputs
            .vpc()
            .public_subnets
            .iter()
            .map(|s| stack.import(s))
            .collect();
        let private_subnets: Vec<Expr> = inputs
            .vpc()
            .private_subnets
            .iter()
            .map(|s| stack.import(s))
            .collect();
        let cluster_name = stack.import(&inputs.cluster().cluster_name);
        let repository_uri = stack.import(&inputs.repository().repository_uri);
        let repository_arn = stack.import(&inputs.repository().repository_arn);

        /********************************************************************
         * EXECUTION IDENTITIES
         ********************************************************************/
        let task_role = stack.add(
            "ecsTaskRole/Resource",
            Role {
                assume_role_policy_document: PolicyDocument::new(vec![
                    PolicyStatement::assume_role(ECS_TASKS_PRINCIPAL),
                ]),
                managed_policy_arns: vec![Expr::managed_policy_arn(
                    "AmazonEC2ContainerRegistryReadOnly",
                )],
            },
        )?;
        let execution_role = stack.add(
            "ecsTaskExecutionRole/Resource",
            Role {
                assume_role_policy_document: PolicyDocument::new(vec![
                    PolicyStatement::assume_role(ECS_TASKS_PRINCIPAL),
                ]),
                managed_policy_arns: vec![Expr::managed_policy_arn("CloudWatchLogsFullAccess")],
            },
        )?;

        let service_security_group = stack.add(
            "ecsServiceSecurityGroup/Resource",
            SecurityGroup {
                group_description: format!("{}/ecsServiceSecurityGroup", stack.name()),
                vpc_id: vpc_id.clone(),
                security_group_egress: vec![CidrRule::allow_all_outbound()],
                security_group_ingress: Vec::new(),
            },
        )?;

        /********************************************************************
         * TARGET GROUP & ALB
         ********************************************************************/
        let target_group = stack.add(
            "targetGroup/Resource",
            TargetGroup {
                port,
                protocol: "HTTP".to_string(),
                target_type: "ip".to_string(),
                vpc_id: vpc_id.clone(),
            },
        )?;

        let load_balancer_security_group = stack.add(
            "applicationLoadBalancerSecurityGroup/Resource",
            SecurityGroup {
                group_description: format!(
                    "{}/applicationLoadBalancerSecurityGroup",
                    stack.name()
                ),
                vpc_id: vpc_id.clone(),
                security_group_egress: vec![CidrRule::allow_all_outbound()],
                security_group_ingress: vec![CidrRule::tcp_from_anywhere(443)],
            },
        )?;

        let load_balancer = stack.add(
            "alb/Resource",
            LoadBalancer {
                scheme: "internet-facing".to_string(),
                kind: "application".to_string(),
                subnets: public_subnets,
                security_groups: vec![Expr::get_att(&load_balancer_security_group, "GroupId")],
                load_balancer_attributes: vec![LoadBalancerAttribute {
                    key: "deletion_protection.enabled".to_string(),
                    value: "false".to_string(),
                }],
            },
        )?;

        /********************************************************************
         * ROUTE53 & ACM
         ********************************************************************/
        let alias_record = stack.add(
            "aliasRecord/Resource",
            RecordSet {
                name: format!("{}.", fqdn),
                kind: "A".to_string(),
                hosted_zone_id: zone.id.clone(),
                alias_target: AliasTarget {
                    dns_name: Expr::concat(vec![
                        Expr::lit("dualstack."),
                        Expr::get_att(&load_balancer, "DNSName"),
                    ]),
                    hosted_zone_id: Expr::get_att(&load_balancer, "CanonicalHostedZoneID"),
                },
            },
        )?;

        let certificate = stack.add(
            "certificate/Resource",
            Certificate {
                domain_name: fqdn.clone(),
                validation_method: "DNS".to_string(),
                domain_validation_options: vec![DomainValidationOption {
                    domain_name: fqdn.clone(),
                    hosted_zone_id: zone.id.clone(),
                }],
                tags: Tag::name(format!("{}/certificate", stack.name())),
            },
        )?;

        let listener = stack.add(
            "alb/listener443/Resource",
            Listener::https(
                Expr::Ref(load_balancer.clone()),
                vec![Expr::Ref(certificate.clone())],
                LISTENER_SSL_POLICY,
                Expr::Ref(target_group.clone()),
            )?,
        )?;

        /********************************************************************
         * COGNITO
         ********************************************************************/
        let user_pool = stack.add(
            &format!("{}-user-pool/Resource", app),
            UserPool {
                account_recovery_setting: AccountRecoverySetting {
                    recovery_mechanisms: vec![
                        RecoveryOption {
                            name: "verified_phone_number".to_string(),
                            priority: 1,
                        },
                        RecoveryOption {
                            name: "verified_email".to_string(),
                            priority: 2,
                        },
                    ],
                },
                admin_create_user_config: AdminCreateUserConfig {
                    allow_admin_create_user_only: true,
                },
            },
        )?;
        stack.set_deletion_policy(&user_pool, DeletionPolicy::Delete)?;

        let user_pool_client = stack.add(
            &format!("{}-user-pool-client/Resource", app),
            UserPoolClient {
                user_pool_id: Expr::Ref(user_pool.clone()),
                generate_secret: true,
                allowed_oauth_flows: vec!["code".to_string()],
                allowed_oauth_flows_user_pool_client: true,
                allowed_oauth_scopes: vec![OAUTH_SCOPE.to_string()],
                callback_urls: vec![redirect_uri.clone()],
                default_redirect_uri: redirect_uri,
                supported_identity_providers: vec!["COGNITO".to_string()],
            },
        )?;

        let user_pool_domain = stack.add(
            &format!("{}-user-pool-domain/Resource", app),
            UserPoolDomain {
                domain: format!("{}-user-pool-domain", app),
                user_pool_id: Expr::Ref(user_pool.clone()),
            },
        )?;

        let identity_pool = stack.add(
            &format!("{}-identity-pool", app),
            IdentityPool {
                allow_unauthenticated_identities: false,
                cognito_identity_providers: vec![CognitoIdentityProvider {
                    client_id: Expr::Ref(user_pool_client.clone()),
                    provider_name: Expr::get_att(&user_pool, "ProviderName"),
                }],
            },
        )?;

        // only the load balancer reaches the service, on the service port
        let service_ingress = stack.add(
            "ecsServiceSecurityGroup/from-alb",
            SecurityGroupIngress::tcp_from_group(
                Expr::get_att(&service_security_group, "GroupId"),
                Expr::get_att(&load_balancer_security_group, "GroupId"),
                port,
                "allow from alb",
            ),
        )?;

        /********************************************************************
         * CREDENTIAL RECORD
         ********************************************************************/
        let credential_values = [
            Expr::Ref(user_pool.clone()),
            Expr::Ref(user_pool_client.clone()),
            Expr::get_att(&user_pool_client, "ClientSecret"),
        ];
        let credentials = stack.add(
            "secret/Resource",
            Secret::json_object(CREDENTIAL_KEYS.into_iter().zip(credential_values).collect()),
        )?;

        // the execution role pulls the image and resolves the container secrets
        let credentials_grant = stack.add(
            "ecsTaskExecutionRole/DefaultPolicy/Resource",
            Policy {
                policy_name: format!("{}-ecs-execution-default", app),
                policy_document: PolicyDocument::new(vec![
                    PolicyStatement::allow(&IMAGE_PULL_ACTIONS, vec![repository_arn]),
                    PolicyStatement::allow(&["ecr:GetAuthorizationToken"], vec![Expr::lit("*")]),
                    PolicyStatement::allow(
                        &["secretsmanager:GetSecretValue"],
                        vec![Expr::Ref(credentials.clone())],
                    ),
                ]),
                roles: vec![Expr::Ref(execution_role.clone())],
            },
        )?;

        /********************************************************************
         * ECS TASK & SERVICE
         ********************************************************************/
        let container = ContainerDefinition {
            name: CONTAINER_NAME.to_string(),
            image: Expr::concat(vec![repository_uri, Expr::lit(format!(":{}", IMAGE_TAG))]),
            essential: true,
            port_mappings: vec![PortMapping {
                container_port: port,
                protocol: "tcp".to_string(),
            }],
            secrets: CREDENTIAL_KEYS
                .iter()
                .map(|key| ContainerSecret::json_key(Expr::Ref(credentials.clone()), key))
                .collect(),
        };

        let task_definition = stack.add(
            "ecsTaskDefinition/Resource",
            TaskDefinition {
                family: format!("{}-ecs-task", app),
                cpu: TASK_CPU.to_string(),
                memory: TASK_MEMORY_MIB.to_string(),
                network_mode: "awsvpc".to_string(),
                requires_compatibilities: vec!["FARGATE".to_string()],
                runtime_platform: RuntimePlatform {
                    cpu_architecture: CpuArchitecture::Arm64,
                    operating_system_family: "LINUX".to_string(),
                },
                task_role_arn: Expr::get_att(&task_role, "Arn"),
                execution_role_arn: Expr::get_att(&execution_role, "Arn"),
                container_definitions: vec![container],
            },
        )?;
        stack.add_dependency(&task_definition, &credentials_grant)?;

        let service = stack.add(
            "ecsService/Service",
            Service {
                cluster: cluster_name,
                task_definition: Expr::Ref(task_definition.clone()),
                desired_count: DESIRED_COUNT,
                launch_type: "FARGATE".to_string(),
                deployment_configuration: DeploymentConfiguration {
                    maximum_percent: 200,
                    minimum_healthy_percent: 50,
                },
                enable_ecs_managed_tags: false,
                health_check_grace_period_seconds: 60,
                load_balancers: vec![ServiceLoadBalancer {
                    container_name: CONTAINER_NAME.to_string(),
                    container_port: port,
                    target_group_arn: Expr::Ref(target_group.clone()),
                }],
                network_configuration: NetworkConfiguration {
                    awsvpc_configuration: AwsVpcConfiguration {
                        assign_public_ip: "DISABLED".to_string(),
                        security_groups: vec![Expr::get_att(&service_security_group, "GroupId")],
                        subnets: private_subnets,
                    },
                },
            },
        )?;
        stack.add_dependency(&service, &listener)?;
        stack.add_dependency(&service, &credentials_grant)?;

        stack.validate()?;

        info!(
            "Synthesized {} ({} resources, imports from {:?})",
            stack.name(),
            stack.resources().len(),
            stack.dependencies()
        );

        Ok(Self {
            stack,
            task_role,
            execution_role,
            service_security_group,
            service_ingress,
            target_group,
            load_balancer_security_group,
            load_balancer,
            alias_record,
            certificate,
            listener,
            identity: IdentityIds {
                user_pool,
                user_pool_client,
                user_pool_domain,
                identity_pool,
            },
            credentials,
            credentials_grant,
            task_definition,
            service,
        })
    }
}
