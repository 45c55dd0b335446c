//! JSON schema types for scenario documents and resolved plans.
//!
//! Records keep `params` and `fixture_binding` as raw JSON until they are
//! needed so shape problems surface as configuration errors naming the
//! offending test instead of as opaque parse failures.
use crate::bindings::FixtureBindings;
use crate::error::{Result, ScenarioError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Scalar record id: a string, a number, or a boolean.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(serde_json::Number),
    /// Rendered as `True`/`False` in composite ids.
    Bool(bool),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(text) => f.write_str(text),
            RecordId::Number(number) => write!(f, "{number}"),
            RecordId::Bool(true) => f.write_str("True"),
            RecordId::Bool(false) => f.write_str("False"),
        }
    }
}

/// Single element of a scenario document, as loaded.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ScenarioRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(rename = "@ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(alias = "test_params", default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_binding: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xfail: Option<bool>,
}

impl ScenarioRecord {
    /// Sub-scenario this record splices in, taken verbatim; an empty `@ref`
    /// counts as none.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref().filter(|value| !value.is_empty())
    }
}

/// Ordered `(name, value)` argument list.
///
/// Accepts `[[name, value], ...]` or `{name: value}`; object key order is
/// preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamList(Vec<(String, Value)>);

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a params value, naming `owner` in shape errors.
    pub fn from_value(value: &Value, owner: &str) -> Result<Self> {
        let mut params = ParamList::new();
        match value {
            Value::Object(map) => {
                for (name, value) in map {
                    params.insert_unique(name, value.clone(), owner)?;
                }
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    match item.as_array().map(Vec::as_slice) {
                        Some([Value::String(name), value]) => {
                            params.insert_unique(name, value.clone(), owner)?;
                        }
                        _ => {
                            return Err(ScenarioError::malformed_binding(
                                owner,
                                format!("params[{idx}] should be a (name, value) pair"),
                            ))
                        }
                    }
                }
            }
            _ => {
                return Err(ScenarioError::malformed_binding(
                    owner,
                    "params should be a list of (name, value) pairs or an object",
                ))
            }
        }
        Ok(params)
    }

    fn insert_unique(&mut self, name: &str, value: Value, owner: &str) -> Result<()> {
        if self.get(name).is_some() {
            return Err(ScenarioError::malformed_binding(
                owner,
                format!("parameter '{name}' is declared more than once"),
            ));
        }
        self.0.push((name.to_string(), value));
        Ok(())
    }

    /// Append or replace a parameter, keeping its original position.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ParamList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// `module.class.function` identity of a test function.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    pub module: String,
    pub class: Option<String>,
    pub function: String,
}

impl QualifiedName {
    pub fn new(
        module: impl Into<String>,
        class: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            class: Some(class.into()),
            function: function.into(),
        }
    }

    /// Identity of a test function defined outside any class.
    pub fn module_level(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            class: None,
            function: function.into(),
        }
    }

    pub fn instance(&self, instance_id: impl Into<String>) -> InstanceKey {
        InstanceKey {
            function: self.clone(),
            instance_id: instance_id.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}.{}.{}", self.module, class, self.function),
            None => write!(f, "{}.{}", self.module, self.function),
        }
    }
}

/// Identity of one parametrized instance: `module.class.function[instance_id]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceKey {
    pub function: QualifiedName,
    pub instance_id: String,
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.function, self.instance_id)
    }
}

/// Leaf record after resolution: composite id, owning scenario, and order.
#[derive(Debug, Clone)]
pub struct ResolvedTestCase {
    pub key: InstanceKey,
    pub scenario: String,
    pub order: i64,
    pub record: ScenarioRecord,
}

impl ResolvedTestCase {
    pub fn composite_id(&self) -> &str {
        &self.key.instance_id
    }

    pub fn params(&self) -> Result<ParamList> {
        let owner = format!("test {}", self.key);
        let value = self
            .record
            .params
            .as_ref()
            .ok_or_else(|| ScenarioError::missing_field("params", owner.clone()))?;
        ParamList::from_value(value, &owner)
    }

    pub fn fixture_binding(&self) -> Result<Option<FixtureBindings>> {
        self.record
            .fixture_binding
            .as_ref()
            .map(|value| FixtureBindings::from_value(value, &self.key.to_string()))
            .transpose()
    }

    pub fn skip(&self) -> Result<bool> {
        self.record
            .skip
            .ok_or_else(|| ScenarioError::missing_field("skip", self.key.to_string()))
    }

    pub fn xfail(&self) -> Result<bool> {
        self.record
            .xfail
            .ok_or_else(|| ScenarioError::missing_field("xfail", self.key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_accept_pairs_and_objects_in_order() {
        let pairs = ParamList::from_value(&json!([["b", 1], ["a", "x"]]), "t").expect("pairs");
        assert_eq!(pairs.names().collect::<Vec<_>>(), vec!["b", "a"]);

        let object = ParamList::from_value(&json!({"zeta": 1, "alpha": 2}), "t").expect("object");
        assert_eq!(object.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(object.get("alpha"), Some(&json!(2)));
    }

    #[test]
    fn params_reject_bad_shapes() {
        let err = ParamList::from_value(&json!([["a", 1, 2]]), "test m.C.t[x]")
            .expect_err("triple is not a pair");
        assert!(err.to_string().contains("params[0] should be a (name, value) pair"));
        assert!(err.to_string().contains("test m.C.t[x]"));

        let err = ParamList::from_value(&json!("a"), "t").expect_err("scalar");
        assert!(err.is_improperly_configured());

        let err = ParamList::from_value(&json!([["a", 1], ["a", 2]]), "t").expect_err("dup");
        assert!(err.to_string().contains("'a' is declared more than once"));
    }

    #[test]
    fn record_ids_render_strings_and_numbers() {
        let records: Vec<ScenarioRecord> =
            serde_json::from_value(json!([{"id": 7}, {"id": "login"}, {}, {"id": true}, {"id": false}]))
                .expect("records");
        assert_eq!(records[0].id.as_ref().map(|id| id.to_string()), Some("7".into()));
        assert_eq!(
            records[1].id.as_ref().map(|id| id.to_string()),
            Some("login".into())
        );
        assert!(records[2].id.is_none());
        assert_eq!(records[3].id, Some(RecordId::Bool(true)));
        assert_eq!(records[3].id.as_ref().map(|id| id.to_string()), Some("True".into()));
        assert_eq!(records[4].id.as_ref().map(|id| id.to_string()), Some("False".into()));
    }

    #[test]
    fn test_params_is_an_alias_for_params() {
        let record: ScenarioRecord =
            serde_json::from_value(json!({"id": 1, "test_params": {"x": 1}, "@ref": ""}))
                .expect("record");
        assert_eq!(record.params, Some(json!({"x": 1})));
        assert_eq!(record.reference(), None);
    }

    #[test]
    fn references_keep_surrounding_whitespace() {
        let record: ScenarioRecord =
            serde_json::from_value(json!({"id": 1, "@ref": " sub "})).expect("record");
        assert_eq!(record.reference(), Some(" sub "));
    }

    #[test]
    fn qualified_names_render_with_and_without_class() {
        let method = QualifiedName::new("tests.login", "TestLogin", "test_ok");
        assert_eq!(method.to_string(), "tests.login.TestLogin.test_ok");
        assert_eq!(
            method.instance("smoke-1").to_string(),
            "tests.login.TestLogin.test_ok[smoke-1]"
        );
        let free = QualifiedName::module_level("tests.login", "test_ok");
        assert_eq!(free.to_string(), "tests.login.test_ok");
    }

    #[test]
    fn resolved_case_requires_outcome_flags() {
        let case = ResolvedTestCase {
            key: QualifiedName::new("m", "C", "t").instance("s-1"),
            scenario: "s".to_string(),
            order: 1,
            record: ScenarioRecord {
                skip: Some(true),
                ..Default::default()
            },
        };
        assert!(case.skip().expect("skip present"));
        let err = case.xfail().expect_err("xfail missing");
        assert_eq!(
            err.to_string(),
            "improperly configured: missing 'xfail' field in m.C.t[s-1] configuration"
        );
        let err = case.params().expect_err("params missing");
        assert!(err.to_string().contains("missing 'params' field in test m.C.t[s-1]"));
    }
}
