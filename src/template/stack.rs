use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{Expr, LogicalId, TemplateError};

/// Template format version emitted in every document
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Metadata key recording the construct path of each resource
pub const PATH_METADATA_KEY: &str = "edgestack:path";

/// A typed CloudFormation resource property bag
pub trait CfnResource: Serialize {
    const TYPE: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionPolicy {
    Delete,
}

/// A resource as declared in a stack
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub logical_id: LogicalId,
    pub path: String,
    pub resource_type: &'static str,
    pub properties: Value,
    pub depends_on: Vec<LogicalId>,
    pub deletion_policy: Option<DeletionPolicy>,
}

impl ResourceEntry {
    /// Logical ids named by `Ref`/`Fn::GetAtt` anywhere in the properties
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_json_references(&self.properties, &mut out);
        out
    }

    fn render(&self) -> Value {
        let mut body = Map::new();
        body.insert("Type".into(), json!(self.resource_type));
        if !is_empty_object(&self.properties) {
            body.insert("Properties".into(), self.properties.clone());
        }
        if !self.depends_on.is_empty() {
            body.insert("DependsOn".into(), json!(self.depends_on));
        }
        if let Some(policy) = self.deletion_policy {
            body.insert("UpdateReplacePolicy".into(), json!(policy));
            body.insert("DeletionPolicy".into(), json!(policy));
        }
        body.insert("Metadata".into(), json!({ PATH_METADATA_KEY: self.path }));
        Value::Object(body)
    }
}

fn is_empty_object(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn collect_json_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get("Ref") {
                    if !target.starts_with("AWS::") {
                        out.push(target.clone());
                    }
                    return;
                }
                if let Some(Value::Array(args)) = map.get("Fn::GetAtt") {
                    if let Some(Value::String(target)) = args.first() {
                        out.push(target.clone());
                    }
                    return;
                }
            }
            map.values().for_each(|v| collect_json_references(v, out));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_json_references(v, out)),
        _ => {}
    }
}

/// A named stack output, optionally exported for other stacks
#[derive(Debug, Clone)]
pub struct Output {
    pub name: String,
    pub value: Expr,
    pub description: Option<String>,
    pub export_name: Option<String>,
}

/// A cross-stack value published through a named export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    producer: String,
    export_name: String,
}

impl Exported {
    pub fn producer(&self) -> &str {
        &self.producer
    }

    pub fn export_name(&self) -> &str {
        &self.export_name
    }
}

/// An independently deployable unit of declared resources.
///
/// Resources keep their construction order; the rendered template lists them
/// in that order, and [`Stack::position`] exposes it for ordering checks.
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    resources: Vec<ResourceEntry>,
    outputs: Vec<Output>,
    dependencies: Vec<String>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            resources: Vec::new(),
            outputs: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declare a resource at the given construct path.
    pub fn add<R: CfnResource>(
        &mut self,
        path: &str,
        resource: R,
    ) -> Result<LogicalId, TemplateError> {
        let logical_id = LogicalId::from_path_str(path);
        if self.resource(&logical_id).is_some() {
            return Err(TemplateError::DuplicateLogicalId(logical_id.to_string()));
        }
        let properties = serde_json::to_value(&resource)
            .map_err(|e| TemplateError::Serialization(e.to_string()))?;

        debug!(stack = %self.name, %logical_id, resource_type = R::TYPE, "declared resource");
        self.resources.push(ResourceEntry {
            logical_id: logical_id.clone(),
            path: format!("{}/{}", self.name, path),
            resource_type: R::TYPE,
            properties,
            depends_on: Vec::new(),
            deletion_policy: None,
        });
        Ok(logical_id)
    }

    /// Add an explicit `DependsOn` edge from `id` to `on`
    pub fn add_dependency(&mut self, id: &LogicalId, on: &LogicalId) -> Result<(), TemplateError> {
        if self.resource(on).is_none() {
            return Err(TemplateError::UnknownResource(on.to_string()));
        }
        let entry = self.resource_mut(id)?;
        if !entry.depends_on.contains(on) {
            entry.depends_on.push(on.clone());
        }
        Ok(())
    }

    pub fn set_deletion_policy(
        &mut self,
        id: &LogicalId,
        policy: DeletionPolicy,
    ) -> Result<(), TemplateError> {
        self.resource_mut(id)?.deletion_policy = Some(policy);
        Ok(())
    }

    /// Publish `value` as output `name` with export `{stack}:{name}`.
    pub fn export(
        &mut self,
        name: &str,
        value: Expr,
        description: Option<&str>,
    ) -> Result<Exported, TemplateError> {
        if self.outputs.iter().any(|o| o.name == name) {
            return Err(TemplateError::DuplicateOutput(name.to_string()));
        }
        let export_name = format!("{}:{}", self.name, name);
        self.outputs.push(Output {
            name: name.to_string(),
            value,
            description: description.map(String::from),
            export_name: Some(export_name.clone()),
        });
        Ok(Exported {
            producer: self.name.clone(),
            export_name,
        })
    }

    /// Consume another stack's export, recording the stack dependency
    pub fn import(&mut self, exported: &Exported) -> Expr {
        if exported.producer != self.name && !self.dependencies.contains(&exported.producer) {
            debug!(stack = %self.name, producer = %exported.producer, "recorded stack dependency");
            self.dependencies.push(exported.producer.clone());
        }
        Expr::ImportValue(exported.export_name.clone())
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    pub fn resource(&self, id: &LogicalId) -> Option<&ResourceEntry> {
        self.resources.iter().find(|r| &r.logical_id == id)
    }

    fn resource_mut(&mut self, id: &LogicalId) -> Result<&mut ResourceEntry, TemplateError> {
        self.resources
            .iter_mut()
            .find(|r| &r.logical_id == id)
            .ok_or_else(|| TemplateError::UnknownResource(id.to_string()))
    }

    /// Resources of one CloudFormation type, in construction order
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<&ResourceEntry> {
        self.resources
            .iter()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    /// Index of a resource in construction order
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.resources.iter().position(|r| &r.logical_id == id)
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Names of stacks whose exports this stack imports
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Check that every `Ref`, `Fn::GetAtt` and `DependsOn` target exists.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for entry in &self.resources {
            for target in entry.references() {
                if !self.resources.iter().any(|r| r.logical_id.as_str() == target) {
                    return Err(TemplateError::DanglingReference {
                        from: entry.logical_id.to_string(),
                        to: target,
                    });
                }
            }
            for on in &entry.depends_on {
                if self.resource(on).is_none() {
                    return Err(TemplateError::DanglingReference {
                        from: entry.logical_id.to_string(),
                        to: on.to_string(),
                    });
                }
            }
        }
        for output in &self.outputs {
            for target in output.value.references() {
                if self.resource(target).is_none() {
                    return Err(TemplateError::DanglingReference {
                        from: format!("Outputs.{}", output.name),
                        to: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Render the CloudFormation document.
    pub fn to_template(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(
            "AWSTemplateFormatVersion".into(),
            json!(TEMPLATE_FORMAT_VERSION),
        );
        if let Some(ref description) = self.description {
            doc.insert("Description".into(), json!(description));
        }

        let resources: Map<String, Value> = self
            .resources
            .iter()
            .map(|r| (r.logical_id.to_string(), r.render()))
            .collect();
        doc.insert("Resources".into(), Value::Object(resources));

        if !self.outputs.is_empty() {
            let outputs: Map<String, Value> = self
                .outputs
                .iter()
                .map(|o| {
                    let mut body = Map::new();
                    if let Some(ref d) = o.description {
                        body.insert("Description".into(), json!(d));
                    }
                    body.insert("Value".into(), json!(o.value));
                    if let Some(ref export) = o.export_name {
                        body.insert("Export".into(), json!({ "Name": export }));
                    }
                    (o.name.clone(), Value::Object(body))
                })
                .collect();
            doc.insert("Outputs".into(), Value::Object(outputs));
        }

        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Widget {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        peer: Option<Expr>,
    }

    impl CfnResource for Widget {
        const TYPE: &'static str = "Test::Widget";
    }

    fn widget(name: &str, peer: Option<Expr>) -> Widget {
        Widget {
            name: name.to_string(),
            peer,
        }
    }

    #[test]
    fn test_add_keeps_construction_order() {
        let mut stack = Stack::new("S");
        let a = stack.add("a", widget("a", None)).unwrap();
        let b = stack.add("b", widget("b", Some(Expr::Ref(a.clone())))).unwrap();
        assert_eq!(stack.position(&a), Some(0));
        assert_eq!(stack.position(&b), Some(1));

        let template = stack.to_template();
        let keys: Vec<&String> = template["Resources"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec![a.as_str(), b.as_str()]);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut stack = Stack::new("S");
        stack.add("a", widget("a", None)).unwrap();
        let result = stack.add("a", widget("again", None));
        assert!(matches!(result, Err(TemplateError::DuplicateLogicalId(_))));
    }

    #[test]
    fn test_render_resource_fields() {
        let mut stack = Stack::new("S");
        let a = stack.add("a", widget("a", None)).unwrap();
        let b = stack.add("b", widget("b", None)).unwrap();
        stack.add_dependency(&b, &a).unwrap();
        stack.set_deletion_policy(&a, DeletionPolicy::Delete).unwrap();

        let template = stack.to_template();
        let rendered_a = &template["Resources"][a.as_str()];
        assert_eq!(rendered_a["Type"], "Test::Widget");
        assert_eq!(rendered_a["Properties"]["Name"], "a");
        assert_eq!(rendered_a["DeletionPolicy"], "Delete");
        assert_eq!(rendered_a["UpdateReplacePolicy"], "Delete");
        assert_eq!(rendered_a["Metadata"][PATH_METADATA_KEY], "S/a");
        assert_eq!(
            template["Resources"][b.as_str()]["DependsOn"],
            json!([a.as_str()])
        );
    }

    #[test]
    fn test_export_and_import() {
        let mut producer = Stack::new("Producer");
        let a = producer.add("a", widget("a", None)).unwrap();
        let exported = producer.export("WidgetRef", Expr::Ref(a), None).unwrap();
        assert_eq!(exported.export_name(), "Producer:WidgetRef");
        assert!(matches!(
            producer.export("WidgetRef", Expr::lit("x"), None),
            Err(TemplateError::DuplicateOutput(_))
        ));

        let mut consumer = Stack::new("Consumer");
        let value = consumer.import(&exported);
        consumer.import(&exported);
        assert_eq!(value, Expr::ImportValue("Producer:WidgetRef".into()));
        assert_eq!(consumer.dependencies(), ["Producer".to_string()]);

        let template = producer.to_template();
        assert_eq!(
            template["Outputs"]["WidgetRef"]["Export"]["Name"],
            "Producer:WidgetRef"
        );
    }

    #[test]
    fn test_validate_catches_dangling_reference() {
        let mut stack = Stack::new("S");
        let ghost = LogicalId::from_path(&["ghost"]);
        stack.add("a", widget("a", Some(Expr::get_att(&ghost, "Arn")))).unwrap();
        assert!(matches!(
            stack.validate(),
            Err(TemplateError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_references_skip_pseudo_parameters() {
        let mut stack = Stack::new("S");
        let a = stack
            .add("a", widget("a", Some(Expr::availability_zone(0))))
            .unwrap();
        let b = stack
            .add(
                "b",
                widget("b", Some(Expr::managed_policy_arn("ReadOnlyAccess"))),
            )
            .unwrap();
        assert!(stack.resource(&a).unwrap().references().is_empty());
        assert!(stack.resource(&b).unwrap().references().is_empty());
        assert!(stack.validate().is_ok());
    }

    #[test]
    fn test_add_dependency_on_unknown_resource() {
        let mut stack = Stack::new("S");
        let a = stack.add("a", widget("a", None)).unwrap();
        let ghost = LogicalId::from_path(&["ghost"]);
        assert!(matches!(
            stack.add_dependency(&a, &ghost),
            Err(TemplateError::UnknownResource(_))
        ));
    }
}
