//! String-valued CloudFormation intrinsics

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::LogicalId;

/// Pseudo parameters resolved by the provisioning engine at apply time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Partition,
}

impl Pseudo {
    pub fn name(&self) -> &'static str {
        match self {
            Pseudo::Partition => "AWS::Partition",
        }
    }
}

/// A string value in a template, either literal or resolved by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(String),
    Ref(LogicalId),
    GetAtt(LogicalId, String),
    ImportValue(String),
    Join(String, Vec<Expr>),
    Select(u32, Box<Expr>),
    /// `Fn::GetAZs` for the stack's own region
    GetAzs,
    Pseudo(Pseudo),
}

impl Expr {
    pub fn lit(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn get_att(id: &LogicalId, attribute: &str) -> Self {
        Expr::GetAtt(id.clone(), attribute.to_string())
    }

    pub fn join(separator: &str, parts: Vec<Expr>) -> Self {
        Expr::Join(separator.to_string(), parts)
    }

    /// `Fn::Join` with an empty separator
    pub fn concat(parts: Vec<Expr>) -> Self {
        Self::join("", parts)
    }

    /// The `index`-th availability zone of the stack's region
    pub fn availability_zone(index: u32) -> Self {
        Expr::Select(index, Box::new(Expr::GetAzs))
    }

    /// ARN of an AWS managed IAM policy, partition-aware
    pub fn managed_policy_arn(name: &str) -> Self {
        Self::concat(vec![
            Expr::lit("arn:"),
            Expr::Pseudo(Pseudo::Partition),
            Expr::lit(format!(":iam::aws:policy/{}", name)),
        ])
    }

    /// Every logical id this expression points at via `Ref` or `Fn::GetAtt`
    pub fn references(&self) -> Vec<&LogicalId> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a LogicalId>) {
        match self {
            Expr::Ref(id) | Expr::GetAtt(id, _) => out.push(id),
            Expr::Join(_, parts) => parts.iter().for_each(|p| p.collect_references(out)),
            Expr::Select(_, inner) => inner.collect_references(out),
            Expr::Literal(_) | Expr::ImportValue(_) | Expr::GetAzs | Expr::Pseudo(_) => {}
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::lit(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(s) => serializer.serialize_str(s),
            Expr::Ref(id) => single_entry(serializer, "Ref", id),
            Expr::GetAtt(id, attr) => {
                single_entry(serializer, "Fn::GetAtt", &(id.as_str(), attr.as_str()))
            }
            Expr::ImportValue(name) => single_entry(serializer, "Fn::ImportValue", name),
            Expr::Join(sep, parts) => single_entry(serializer, "Fn::Join", &(sep, parts)),
            Expr::Select(index, inner) => {
                single_entry(serializer, "Fn::Select", &(index, inner.as_ref()))
            }
            Expr::GetAzs => single_entry(serializer, "Fn::GetAZs", ""),
            Expr::Pseudo(p) => single_entry(serializer, "Ref", p.name()),
        }
    }
}

fn single_entry<S, V>(serializer: S, key: &str, value: &V) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(path: &str) -> LogicalId {
        LogicalId::from_path(&[path])
    }

    #[test]
    fn test_literal_serializes_as_plain_string() {
        assert_eq!(serde_json::to_value(Expr::lit("x")).unwrap(), json!("x"));
    }

    #[test]
    fn test_ref_and_get_att() {
        let vpc = id("Vpc");
        assert_eq!(
            serde_json::to_value(Expr::Ref(vpc.clone())).unwrap(),
            json!({"Ref": vpc.as_str()})
        );
        assert_eq!(
            serde_json::to_value(Expr::get_att(&vpc, "CidrBlock")).unwrap(),
            json!({"Fn::GetAtt": [vpc.as_str(), "CidrBlock"]})
        );
    }

    #[test]
    fn test_select_get_azs() {
        assert_eq!(
            serde_json::to_value(Expr::availability_zone(1)).unwrap(),
            json!({"Fn::Select": [1, {"Fn::GetAZs": ""}]})
        );
    }

    #[test]
    fn test_managed_policy_arn_uses_partition() {
        assert_eq!(
            serde_json::to_value(Expr::managed_policy_arn("CloudWatchLogsFullAccess")).unwrap(),
            json!({"Fn::Join": ["", [
                "arn:",
                {"Ref": "AWS::Partition"},
                ":iam::aws:policy/CloudWatchLogsFullAccess"
            ]]})
        );
    }

    #[test]
    fn test_references_walks_nested_expressions() {
        let a = id("A");
        let b = id("B");
        let expr = Expr::concat(vec![
            Expr::Ref(a.clone()),
            Expr::lit(":"),
            Expr::Select(0, Box::new(Expr::get_att(&b, "Arn"))),
            Expr::ImportValue("Other:Thing".into()),
        ]);
        assert_eq!(expr.references(), vec![&a, &b]);
    }
}
