//! End-to-end synthesis of the demo application
//!
//! Loads a config and lookup context from a scratch directory, synthesizes
//! both stacks, writes the assembly and inspects the written templates.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use edgestack::cli::{load_app, synth};
use edgestack::stacks::{ServiceInputs, SynthError};
use edgestack::template::assertions::TemplateAssertions;
use edgestack::OutputFormat;

const CONFIG_YAML: &str = "\
application: demo-app
cidr: 10.0.0.0/24
domain: example.com
port: 8501
env:
  account: \"123456789012\"
  region: us-east-1
";

fn write_inputs(dir: &Path) {
    fs::write(dir.join("app.yaml"), CONFIG_YAML).unwrap();
    let context = json!({
        "hosted-zone:account=123456789012:domainName=example.com:region=us-east-1": {
            "Id": "/hostedzone/Z0EXAMPLE",
            "Name": "example.com."
        }
    });
    fs::write(dir.join("edgestack.context.json"), context.to_string()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_demo_app_assembly() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let app = load_app(&dir.path().join("app.yaml"), None).unwrap();
    let out = dir.path().join("cdk.out");
    let summary = synth(&app, &out, OutputFormat::Json).unwrap();
    assert_eq!(summary.stacks.len(), 2);

    let manifest = read_json(&out.join("manifest.json"));
    let post = &manifest["artifacts"]["PostContainerStack"];
    assert_eq!(post["type"], "aws:cloudformation:stack");
    assert_eq!(post["environment"], "aws://123456789012/us-east-1");
    assert_eq!(post["dependencies"], json!(["PreContainerStack"]));

    let network =
        TemplateAssertions::from_value(read_json(&out.join("PreContainerStack.template.json")));
    assert_eq!(network.resource_count("AWS::EC2::VPC"), 1);
    assert_eq!(network.resource_count("AWS::EC2::Subnet"), 4);
    assert_eq!(network.resource_count("AWS::EC2::NatGateway"), 1);
    assert!(network.has_resource(
        "AWS::ECR::Repository",
        &json!({"Properties": {"RepositoryName": "demo-app"}, "DeletionPolicy": "Delete"})
    ));

    let service =
        TemplateAssertions::from_value(read_json(&out.join("PostContainerStack.template.json")));

    // one alias record pointing at the load balancer
    let records = service.resources_of_type("AWS::Route53::RecordSet");
    assert_eq!(records.len(), 1);
    let record = &records[0].1["Properties"];
    assert_eq!(record["Name"], "demo-app.example.com.");
    assert_eq!(record["Type"], "A");
    assert_eq!(record["HostedZoneId"], "Z0EXAMPLE");
    let alb_ids: Vec<&str> = service
        .resources_of_type("AWS::ElasticLoadBalancingV2::LoadBalancer")
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(alb_ids.len(), 1);
    assert_eq!(
        record["AliasTarget"]["HostedZoneId"],
        json!({"Fn::GetAtt": [alb_ids[0], "CanonicalHostedZoneID"]})
    );
    assert_eq!(
        record["AliasTarget"]["DNSName"]["Fn::Join"][1][1],
        json!({"Fn::GetAtt": [alb_ids[0], "DNSName"]})
    );

    // the service is only reachable through the load balancer on 8501
    let ingress = service.resources_of_type("AWS::EC2::SecurityGroupIngress");
    assert_eq!(ingress.len(), 1);
    assert_eq!(ingress[0].1["Properties"]["FromPort"], 8501);
    assert_eq!(ingress[0].1["Properties"]["Description"], "allow from alb");
    assert!(service.has_resource_properties(
        "AWS::ECS::Service",
        &json!({"NetworkConfiguration": {"AwsvpcConfiguration": {"AssignPublicIp": "DISABLED"}}})
    ));
    assert!(service.has_resource_properties(
        "AWS::EC2::SecurityGroup",
        &json!({"SecurityGroupIngress": [{"CidrIp": "0.0.0.0/0", "FromPort": 443, "ToPort": 443}]})
    ));
}

#[test]
fn test_yaml_templates() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());

    let app = load_app(&dir.path().join("app.yaml"), None).unwrap();
    let out = dir.path().join("out");
    synth(&app, &out, OutputFormat::Yaml).unwrap();

    let template: Value = serde_yaml::from_str(
        &fs::read_to_string(out.join("PostContainerStack.template.yaml")).unwrap(),
    )
    .unwrap();
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert_eq!(
        read_json(&out.join("manifest.json"))["artifacts"]["PreContainerStack"]["properties"]
            ["templateFile"],
        "PreContainerStack.template.yaml"
    );
}

#[test]
fn test_explicit_hosted_zone_needs_no_context() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("app.json"),
        r#"{"application": "demo-app", "cidr": "10.0.0.0/24", "domain": "example.com",
            "port": 8501, "hosted-zone-id": "/hostedzone/ZEXPLICIT"}"#,
    )
    .unwrap();

    let app = load_app(&dir.path().join("app.json"), None).unwrap();
    let assembly = app.synthesize().unwrap();
    let service = TemplateAssertions::from_stack(assembly.stack("PostContainerStack").unwrap());
    assert!(service.has_resource_properties(
        "AWS::Route53::RecordSet",
        &json!({"HostedZoneId": "ZEXPLICIT"})
    ));
}

#[test]
fn test_service_inputs_require_every_handle() {
    assert_eq!(
        ServiceInputs::builder().build(),
        Err(SynthError::UnresolvedHandle("vpc"))
    );
}
