//! Structural queries over a rendered template
//!
//! Used by the test suites to check the shape of the declared resource graph
//! without comparing whole documents. Matching is by subset: an expected
//! object matches when every key it names matches in the actual value,
//! arrays must match element for element, scalars must be equal.

use serde_json::Value;

use super::Stack;

pub struct TemplateAssertions {
    template: Value,
}

impl TemplateAssertions {
    pub fn from_stack(stack: &Stack) -> Self {
        Self {
            template: stack.to_template(),
        }
    }

    pub fn from_value(template: Value) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &Value {
        &self.template
    }

    /// `(logical id, resource body)` pairs of one type, in template order
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&str, &Value)> {
        self.template
            .get("Resources")
            .and_then(Value::as_object)
            .map(|resources| {
                resources
                    .iter()
                    .filter(|(_, body)| body["Type"] == resource_type)
                    .map(|(id, body)| (id.as_str(), body))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn resource_count(&self, resource_type: &str) -> usize {
        self.resources_of_type(resource_type).len()
    }

    /// Ids of resources of `resource_type` whose `Properties` match `expected`
    pub fn find_resources(&self, resource_type: &str, expected: &Value) -> Vec<&str> {
        self.resources_of_type(resource_type)
            .into_iter()
            .filter(|(_, body)| matches_subset(expected, &body["Properties"]))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn has_resource_properties(&self, resource_type: &str, expected: &Value) -> bool {
        !self.find_resources(resource_type, expected).is_empty()
    }

    /// Like [`Self::has_resource_properties`] but matched against the whole
    /// resource body (`DeletionPolicy`, `DependsOn`, ...)
    pub fn has_resource(&self, resource_type: &str, expected: &Value) -> bool {
        self.resources_of_type(resource_type)
            .iter()
            .any(|(_, body)| matches_subset(expected, body))
    }

    pub fn output(&self, name: &str) -> Option<&Value> {
        self.template.get("Outputs").and_then(|o| o.get(name))
    }
}

/// Subset match of `expected` against `actual`.
pub fn matches_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => exp
            .iter()
            .all(|(k, v)| act.get(k).is_some_and(|a| matches_subset(v, a))),
        (Value::Array(exp), Value::Array(act)) => {
            exp.len() == act.len() && exp.iter().zip(act).all(|(e, a)| matches_subset(e, a))
        }
        _ => expected == actual,
    }
}
