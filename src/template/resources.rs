//! Typed property bags for the resource types the stacks declare
//!
//! Field names follow the CloudFormation resource specification. Only the
//! properties the stacks actually set are modeled.

use serde::Serialize;

use super::{CfnResource, Expr, TemplateError};

/// Key/value tag
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn name(value: impl Into<String>) -> Vec<Tag> {
        vec![Tag {
            key: "Name".to_string(),
            value: value.into(),
        }]
    }
}

// ============================================================================
// EC2: network
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vpc {
    pub cidr_block: String,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
    pub instance_tenancy: String,
    pub tags: Vec<Tag>,
}

impl CfnResource for Vpc {
    const TYPE: &'static str = "AWS::EC2::VPC";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InternetGateway {
    pub tags: Vec<Tag>,
}

impl CfnResource for InternetGateway {
    const TYPE: &'static str = "AWS::EC2::InternetGateway";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcGatewayAttachment {
    pub vpc_id: Expr,
    pub internet_gateway_id: Expr,
}

impl CfnResource for VpcGatewayAttachment {
    const TYPE: &'static str = "AWS::EC2::VPCGatewayAttachment";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    pub vpc_id: Expr,
    pub availability_zone: Expr,
    pub cidr_block: String,
    pub map_public_ip_on_launch: bool,
    pub tags: Vec<Tag>,
}

impl CfnResource for Subnet {
    const TYPE: &'static str = "AWS::EC2::Subnet";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTable {
    pub vpc_id: Expr,
    pub tags: Vec<Tag>,
}

impl CfnResource for RouteTable {
    const TYPE: &'static str = "AWS::EC2::RouteTable";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRouteTableAssociation {
    pub route_table_id: Expr,
    pub subnet_id: Expr,
}

impl CfnResource for SubnetRouteTableAssociation {
    const TYPE: &'static str = "AWS::EC2::SubnetRouteTableAssociation";
}

/// Where a route sends its traffic
#[derive(Debug, Clone)]
pub enum RouteTarget {
    InternetGateway(Expr),
    NatGateway(Expr),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Route {
    pub route_table_id: Expr,
    pub destination_cidr_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_gateway_id: Option<Expr>,
}

impl Route {
    /// A `0.0.0.0/0` route to the given target
    pub fn default_route(route_table_id: Expr, target: RouteTarget) -> Self {
        let (gateway_id, nat_gateway_id) = match target {
            RouteTarget::InternetGateway(id) => (Some(id), None),
            RouteTarget::NatGateway(id) => (None, Some(id)),
        };
        Self {
            route_table_id,
            destination_cidr_block: "0.0.0.0/0".to_string(),
            gateway_id,
            nat_gateway_id,
        }
    }
}

impl CfnResource for Route {
    const TYPE: &'static str = "AWS::EC2::Route";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ElasticIp {
    pub domain: String,
    pub tags: Vec<Tag>,
}

impl CfnResource for ElasticIp {
    const TYPE: &'static str = "AWS::EC2::EIP";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NatGateway {
    pub subnet_id: Expr,
    pub allocation_id: Expr,
    pub tags: Vec<Tag>,
}

impl CfnResource for NatGateway {
    const TYPE: &'static str = "AWS::EC2::NatGateway";
}

// ============================================================================
// EC2: security groups
// ============================================================================

/// Inline rule for a security group's ingress or egress list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CidrRule {
    pub cidr_ip: String,
    pub ip_protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_port: Option<u16>,
    pub description: String,
}

impl CidrRule {
    pub fn allow_all_outbound() -> Self {
        Self {
            cidr_ip: "0.0.0.0/0".to_string(),
            ip_protocol: "-1".to_string(),
            from_port: None,
            to_port: None,
            description: "Allow all outbound traffic by default".to_string(),
        }
    }

    pub fn tcp_from_anywhere(port: u16) -> Self {
        Self {
            cidr_ip: "0.0.0.0/0".to_string(),
            ip_protocol: "tcp".to_string(),
            from_port: Some(port),
            to_port: Some(port),
            description: format!("Allow from anyone on port {}", port),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    pub group_description: String,
    pub vpc_id: Expr,
    pub security_group_egress: Vec<CidrRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_group_ingress: Vec<CidrRule>,
}

impl CfnResource for SecurityGroup {
    const TYPE: &'static str = "AWS::EC2::SecurityGroup";
}

/// Standalone ingress rule admitting traffic from another security group
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupIngress {
    pub group_id: Expr,
    pub ip_protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub source_security_group_id: Expr,
    pub description: String,
}

impl SecurityGroupIngress {
    pub fn tcp_from_group(group_id: Expr, source: Expr, port: u16, description: &str) -> Self {
        Self {
            group_id,
            ip_protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            source_security_group_id: source,
            description: description.to_string(),
        }
    }
}

impl CfnResource for SecurityGroupIngress {
    const TYPE: &'static str = "AWS::EC2::SecurityGroupIngress";
}

// ============================================================================
// ECR / ECS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageScanningConfiguration {
    pub scan_on_push: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EncryptionConfiguration {
    pub encryption_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Repository {
    pub repository_name: String,
    pub image_scanning_configuration: ImageScanningConfiguration,
    pub encryption_configuration: EncryptionConfiguration,
}

impl CfnResource for Repository {
    const TYPE: &'static str = "AWS::ECR::Repository";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterSetting {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cluster {
    pub cluster_settings: Vec<ClusterSetting>,
}

impl CfnResource for Cluster {
    const TYPE: &'static str = "AWS::ECS::Cluster";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CpuArchitecture {
    #[serde(rename = "X86_64")]
    X86,
    #[serde(rename = "ARM64")]
    Arm64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuntimePlatform {
    pub cpu_architecture: CpuArchitecture,
    pub operating_system_family: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: String,
}

/// A container secret sourced from Secrets Manager
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSecret {
    pub name: String,
    pub value_from: Expr,
}

impl ContainerSecret {
    /// Reference a single JSON key of a secret: `{arn}:{key}::`
    pub fn json_key(secret_arn: Expr, key: &str) -> Self {
        Self {
            name: key.to_string(),
            value_from: Expr::concat(vec![secret_arn, Expr::lit(format!(":{}::", key))]),
        }
    }
}

/// Container definition. Has no plaintext `Environment` field; runtime
/// configuration reaches the container only through `Secrets`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDefinition {
    pub name: String,
    pub image: Expr,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<ContainerSecret>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDefinition {
    pub family: String,
    pub cpu: String,
    pub memory: String,
    pub network_mode: String,
    pub requires_compatibilities: Vec<String>,
    pub runtime_platform: RuntimePlatform,
    pub task_role_arn: Expr,
    pub execution_role_arn: Expr,
    pub container_definitions: Vec<ContainerDefinition>,
}

impl CfnResource for TaskDefinition {
    const TYPE: &'static str = "AWS::ECS::TaskDefinition";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsVpcConfiguration {
    pub assign_public_ip: String,
    pub security_groups: Vec<Expr>,
    pub subnets: Vec<Expr>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfiguration {
    pub awsvpc_configuration: AwsVpcConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceLoadBalancer {
    pub container_name: String,
    pub container_port: u16,
    pub target_group_arn: Expr,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentConfiguration {
    pub maximum_percent: u32,
    pub minimum_healthy_percent: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service {
    pub cluster: Expr,
    pub task_definition: Expr,
    pub desired_count: u32,
    pub launch_type: String,
    pub deployment_configuration: DeploymentConfiguration,
    #[serde(rename = "EnableECSManagedTags")]
    pub enable_ecs_managed_tags: bool,
    pub health_check_grace_period_seconds: u32,
    pub load_balancers: Vec<ServiceLoadBalancer>,
    pub network_configuration: NetworkConfiguration,
}

impl CfnResource for Service {
    const TYPE: &'static str = "AWS::ECS::Service";
}

// ============================================================================
// Elastic Load Balancing v2
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancerAttribute {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoadBalancer {
    pub scheme: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub subnets: Vec<Expr>,
    pub security_groups: Vec<Expr>,
    pub load_balancer_attributes: Vec<LoadBalancerAttribute>,
}

impl CfnResource for LoadBalancer {
    const TYPE: &'static str = "AWS::ElasticLoadBalancingV2::LoadBalancer";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetGroup {
    pub port: u16,
    pub protocol: String,
    pub target_type: String,
    pub vpc_id: Expr,
}

impl CfnResource for TargetGroup {
    const TYPE: &'static str = "AWS::ElasticLoadBalancingV2::TargetGroup";
}

/// Predefined ELB security policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslPolicy {
    Recommended,
    Tls12,
    Tls12Ext,
    Tls13,
    Tls13Ext2,
}

impl SslPolicy {
    pub fn policy_name(&self) -> &'static str {
        match self {
            SslPolicy::Recommended => "ELBSecurityPolicy-2016-08",
            SslPolicy::Tls12 => "ELBSecurityPolicy-TLS-1-2-2017-01",
            SslPolicy::Tls12Ext => "ELBSecurityPolicy-TLS-1-2-Ext-2018-06",
            SslPolicy::Tls13 => "ELBSecurityPolicy-TLS13-1-2-2021-06",
            SslPolicy::Tls13Ext2 => "ELBSecurityPolicy-TLS13-1-2-Ext2-2021-06",
        }
    }
}

/// The only policy HTTPS listeners are allowed to use
pub const LISTENER_SSL_POLICY: SslPolicy = SslPolicy::Tls13Ext2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListenerCertificate {
    pub certificate_arn: Expr,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListenerAction {
    #[serde(rename = "Type")]
    pub kind: String,
    pub target_group_arn: Expr,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listener {
    load_balancer_arn: Expr,
    port: u16,
    protocol: String,
    certificates: Vec<ListenerCertificate>,
    default_actions: Vec<ListenerAction>,
    ssl_policy: String,
}

impl Listener {
    /// HTTPS listener on 443 forwarding everything to one target group.
    ///
    /// Exactly one certificate and [`LISTENER_SSL_POLICY`] are required;
    /// anything else is rejected.
    pub fn https(
        load_balancer_arn: Expr,
        certificates: Vec<Expr>,
        policy: SslPolicy,
        target_group_arn: Expr,
    ) -> Result<Self, TemplateError> {
        if certificates.len() != 1 {
            return Err(TemplateError::InvalidListener(format!(
                "expected exactly one certificate, got {}",
                certificates.len()
            )));
        }
        if policy != LISTENER_SSL_POLICY {
            return Err(TemplateError::InvalidListener(format!(
                "SSL policy {} is not allowed, use {}",
                policy.policy_name(),
                LISTENER_SSL_POLICY.policy_name()
            )));
        }

        Ok(Self {
            load_balancer_arn,
            port: 443,
            protocol: "HTTPS".to_string(),
            certificates: certificates
                .into_iter()
                .map(|certificate_arn| ListenerCertificate { certificate_arn })
                .collect(),
            default_actions: vec![ListenerAction {
                kind: "forward".to_string(),
                target_group_arn,
            }],
            ssl_policy: policy.policy_name().to_string(),
        })
    }
}

impl CfnResource for Listener {
    const TYPE: &'static str = "AWS::ElasticLoadBalancingV2::Listener";
}

// ============================================================================
// Route 53 / ACM
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AliasTarget {
    #[serde(rename = "DNSName")]
    pub dns_name: Expr,
    #[serde(rename = "HostedZoneId")]
    pub hosted_zone_id: Expr,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordSet {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub hosted_zone_id: String,
    pub alias_target: AliasTarget,
}

impl CfnResource for RecordSet {
    const TYPE: &'static str = "AWS::Route53::RecordSet";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainValidationOption {
    pub domain_name: String,
    pub hosted_zone_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    pub domain_name: String,
    pub validation_method: String,
    pub domain_validation_options: Vec<DomainValidationOption>,
    pub tags: Vec<Tag>,
}

impl CfnResource for Certificate {
    const TYPE: &'static str = "AWS::CertificateManager::Certificate";
}

// ============================================================================
// IAM
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServicePrincipal {
    pub service: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,
    pub action: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<ServicePrincipal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<Expr>,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: Vec<Expr>) -> Self {
        Self {
            effect: "Allow".to_string(),
            action: actions.iter().map(|a| a.to_string()).collect(),
            principal: None,
            resource: resources,
        }
    }

    /// `sts:AssumeRole` trust for an AWS service principal
    pub fn assume_role(service: &str) -> Self {
        Self {
            effect: "Allow".to_string(),
            action: vec!["sts:AssumeRole".to_string()],
            principal: Some(ServicePrincipal {
                service: service.to_string(),
            }),
            resource: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            version: "2012-10-17".to_string(),
            statement,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub assume_role_policy_document: PolicyDocument,
    pub managed_policy_arns: Vec<Expr>,
}

impl CfnResource for Role {
    const TYPE: &'static str = "AWS::IAM::Role";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
    pub roles: Vec<Expr>,
}

impl CfnResource for Policy {
    const TYPE: &'static str = "AWS::IAM::Policy";
}

// ============================================================================
// Cognito / Secrets Manager
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecoveryOption {
    pub name: String,
    pub priority: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountRecoverySetting {
    pub recovery_mechanisms: Vec<RecoveryOption>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdminCreateUserConfig {
    pub allow_admin_create_user_only: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPool {
    pub account_recovery_setting: AccountRecoverySetting,
    pub admin_create_user_config: AdminCreateUserConfig,
}

impl CfnResource for UserPool {
    const TYPE: &'static str = "AWS::Cognito::UserPool";
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPoolClient {
    #[serde(rename = "UserPoolId")]
    pub user_pool_id: Expr,
    #[serde(rename = "GenerateSecret")]
    pub generate_secret: bool,
    #[serde(rename = "AllowedOAuthFlows")]
    pub allowed_oauth_flows: Vec<String>,
    #[serde(rename = "AllowedOAuthFlowsUserPoolClient")]
    pub allowed_oauth_flows_user_pool_client: bool,
    #[serde(rename = "AllowedOAuthScopes")]
    pub allowed_oauth_scopes: Vec<String>,
    #[serde(rename = "CallbackURLs")]
    pub callback_urls: Vec<String>,
    #[serde(rename = "DefaultRedirectURI")]
    pub default_redirect_uri: String,
    #[serde(rename = "SupportedIdentityProviders")]
    pub supported_identity_providers: Vec<String>,
}

impl CfnResource for UserPoolClient {
    const TYPE: &'static str = "AWS::Cognito::UserPoolClient";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPoolDomain {
    pub domain: String,
    pub user_pool_id: Expr,
}

impl CfnResource for UserPoolDomain {
    const TYPE: &'static str = "AWS::Cognito::UserPoolDomain";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CognitoIdentityProvider {
    pub client_id: Expr,
    pub provider_name: Expr,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityPool {
    pub allow_unauthenticated_identities: bool,
    pub cognito_identity_providers: Vec<CognitoIdentityProvider>,
}

impl CfnResource for IdentityPool {
    const TYPE: &'static str = "AWS::Cognito::IdentityPool";
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Secret {
    pub secret_string: Expr,
}

impl Secret {
    /// A secret whose value is a flat JSON object of the given keys.
    pub fn json_object(entries: Vec<(&str, Expr)>) -> Self {
        let mut parts = vec![Expr::lit("{")];
        for (i, (key, value)) in entries.into_iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            parts.push(Expr::lit(format!("{}\"{}\":\"", sep, key)));
            parts.push(value);
            parts.push(Expr::lit("\""));
        }
        parts.push(Expr::lit("}"));
        Self {
            secret_string: Expr::concat(parts),
        }
    }
}

impl CfnResource for Secret {
    const TYPE: &'static str = "AWS::SecretsManager::Secret";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::LogicalId;
    use serde_json::json;

    fn arn(name: &str) -> Expr {
        Expr::Ref(LogicalId::from_path(&[name]))
    }

    #[test]
    fn test_listener_accepts_one_cert_and_tls13_ext2() {
        let listener = Listener::https(
            arn("alb"),
            vec![arn("cert")],
            SslPolicy::Tls13Ext2,
            arn("tg"),
        )
        .unwrap();
        let value = serde_json::to_value(&listener).unwrap();
        assert_eq!(value["Port"], 443);
        assert_eq!(value["Protocol"], "HTTPS");
        assert_eq!(value["SslPolicy"], "ELBSecurityPolicy-TLS13-1-2-Ext2-2021-06");
        assert_eq!(value["Certificates"].as_array().unwrap().len(), 1);
        assert_eq!(value["DefaultActions"][0]["Type"], "forward");
    }

    #[test]
    fn test_listener_rejects_certificate_counts() {
        for certs in [vec![], vec![arn("a"), arn("b")]] {
            let result = Listener::https(arn("alb"), certs, SslPolicy::Tls13Ext2, arn("tg"));
            assert!(matches!(result, Err(TemplateError::InvalidListener(_))));
        }
    }

    #[test]
    fn test_listener_rejects_other_policies() {
        for policy in [
            SslPolicy::Recommended,
            SslPolicy::Tls12,
            SslPolicy::Tls12Ext,
            SslPolicy::Tls13,
        ] {
            let result = Listener::https(arn("alb"), vec![arn("cert")], policy, arn("tg"));
            assert!(matches!(result, Err(TemplateError::InvalidListener(_))));
        }
    }

    #[test]
    fn test_route_targets() {
        let igw = serde_json::to_value(Route::default_route(
            arn("rt"),
            RouteTarget::InternetGateway(arn("igw")),
        ))
        .unwrap();
        assert!(igw.get("GatewayId").is_some());
        assert!(igw.get("NatGatewayId").is_none());

        let nat = serde_json::to_value(Route::default_route(
            arn("rt"),
            RouteTarget::NatGateway(arn("nat")),
        ))
        .unwrap();
        assert!(nat.get("GatewayId").is_none());
        assert_eq!(nat["DestinationCidrBlock"], "0.0.0.0/0");
    }

    #[test]
    fn test_secret_json_object_layout() {
        let secret = Secret::json_object(vec![("A", Expr::lit("1")), ("B", arn("x"))]);
        let value = serde_json::to_value(&secret).unwrap();
        let parts = value["SecretString"]["Fn::Join"][1].as_array().unwrap().clone();
        assert_eq!(parts[0], json!("{"));
        assert_eq!(parts[1], json!("\"A\":\""));
        assert_eq!(parts[2], json!("1"));
        assert_eq!(parts[4], json!(",\"B\":\""));
        assert_eq!(parts.last().unwrap(), &json!("}"));
    }

    #[test]
    fn test_container_secret_value_from() {
        let secret = ContainerSecret::json_key(arn("secret"), "POOL_ID");
        let value = serde_json::to_value(&secret).unwrap();
        assert_eq!(value["Name"], "POOL_ID");
        assert_eq!(value["ValueFrom"]["Fn::Join"][1][1], ":POOL_ID::");
    }

    #[test]
    fn test_cpu_architecture_names() {
        assert_eq!(serde_json::to_value(CpuArchitecture::Arm64).unwrap(), "ARM64");
        assert_eq!(serde_json::to_value(CpuArchitecture::X86).unwrap(), "X86_64");
    }

    #[test]
    fn test_user_pool_client_field_names() {
        let client = UserPoolClient {
            user_pool_id: arn("pool"),
            generate_secret: true,
            allowed_oauth_flows: vec!["code".into()],
            allowed_oauth_flows_user_pool_client: true,
            allowed_oauth_scopes: vec!["aws.cognito.signin.user.admin".into()],
            callback_urls: vec!["https://a.example.com".into()],
            default_redirect_uri: "https://a.example.com".into(),
            supported_identity_providers: vec!["COGNITO".into()],
        };
        let value = serde_json::to_value(&client).unwrap();
        for key in [
            "AllowedOAuthFlows",
            "AllowedOAuthScopes",
            "CallbackURLs",
            "DefaultRedirectURI",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
