//! Fixture binding descriptors and the per-session binding registry.
//!
//! A binding says "argument `x` of this test instance receives the value of
//! fixture `f`, optionally under a different scope and with request params".
//! Inline declarations list bindings as `(argname, spec)` pairs while scenario
//! documents usually key them by argument name; both shapes parse into the
//! same [`FixtureBindings`].
use crate::error::{Result, ScenarioError};
use crate::scenarios::{InstanceKey, ParamList};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const PAIRS_HINT: &str = "fixture_binding entries should be (argname, {func='your fixture', scope='function | class | module | session', params=None}) pairs";
const MAPPING_HINT: &str = "fixture_binding should map each argname to {func='your fixture', scope='function | class | module | session', params=None}";

/// Lifetime bucket for a fixture's cached value.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Function,
    Class,
    Module,
    Session,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Function => "function",
            Scope::Class => "class",
            Scope::Module => "module",
            Scope::Session => "session",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "function" => Ok(Scope::Function),
            "class" => Ok(Scope::Class),
            "module" => Ok(Scope::Module),
            "session" => Ok(Scope::Session),
            other => Err(format!(
                "unknown scope '{other}' (expected function, class, module, or session)"
            )),
        }
    }
}

/// Fixture reference bound to one argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureBinding {
    #[serde(rename = "func")]
    pub fixture: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<ParamList>,
}

impl FixtureBinding {
    pub fn new(fixture: impl Into<String>) -> Self {
        Self {
            fixture: fixture.into(),
            scope: None,
            params: None,
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.get_or_insert_with(ParamList::new).set(name, value);
        self
    }

    fn from_spec(
        argname: &str,
        spec: &Value,
        owner: &str,
        schema: BindingSchema,
    ) -> Result<Self> {
        let binding_owner = format!("{owner} '{argname}' fixture binding");
        let Some(spec) = spec.as_object() else {
            return Err(ScenarioError::malformed_binding(
                binding_owner,
                schema.hint(),
            ));
        };
        let fixture = match spec.get("func") {
            Some(Value::String(func)) if !func.trim().is_empty() => func.clone(),
            Some(_) => {
                return Err(ScenarioError::malformed_binding(
                    binding_owner,
                    "'func' must name a fixture",
                ))
            }
            None => return Err(ScenarioError::missing_field("func", binding_owner)),
        };
        let scope = match spec.get("scope") {
            None | Some(Value::Null) => None,
            Some(Value::String(scope)) => Some(
                scope
                    .parse::<Scope>()
                    .map_err(|message| ScenarioError::malformed_binding(&binding_owner, message))?,
            ),
            Some(_) => {
                return Err(ScenarioError::malformed_binding(
                    binding_owner,
                    "'scope' must be a string",
                ))
            }
        };
        let params = match spec.get("params") {
            None | Some(Value::Null) => None,
            Some(params) => Some(ParamList::from_value(params, &binding_owner)?),
        };
        Ok(Self {
            fixture,
            scope,
            params,
        })
    }
}

/// Which of the two declaration shapes a binding list was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSchema {
    /// `[[argname, {func, scope?, params?}], ...]`
    Pairs,
    /// `{argname: {func, scope?, params?}}`
    Mapping,
}

impl BindingSchema {
    /// Shape reminder for malformed entries written in this schema.
    pub fn hint(self) -> &'static str {
        match self {
            BindingSchema::Pairs => PAIRS_HINT,
            BindingSchema::Mapping => MAPPING_HINT,
        }
    }
}

/// Ordered argument-name to fixture bindings for one test declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureBindings {
    schema: BindingSchema,
    entries: Vec<(String, FixtureBinding)>,
}

impl FixtureBindings {
    pub fn new(schema: BindingSchema) -> Self {
        Self {
            schema,
            entries: Vec::new(),
        }
    }

    /// Parse either binding shape, naming `owner` in errors.
    pub fn from_value(value: &Value, owner: &str) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_mapping(map, owner),
            Value::Array(items) => Self::from_pairs(items, owner),
            _ => Err(ScenarioError::malformed_binding(
                owner,
                BindingSchema::Pairs.hint(),
            )),
        }
    }

    fn from_mapping(map: &Map<String, Value>, owner: &str) -> Result<Self> {
        let schema = BindingSchema::Mapping;
        let mut bindings = Self::new(schema);
        for (argname, spec) in map {
            bindings.insert(argname, FixtureBinding::from_spec(argname, spec, owner, schema)?);
        }
        Ok(bindings)
    }

    fn from_pairs(items: &[Value], owner: &str) -> Result<Self> {
        let schema = BindingSchema::Pairs;
        let mut bindings = Self::new(schema);
        for item in items {
            let Some([Value::String(argname), spec]) = item.as_array().map(Vec::as_slice) else {
                return Err(ScenarioError::malformed_binding(owner, schema.hint()));
            };
            bindings.insert(argname, FixtureBinding::from_spec(argname, spec, owner, schema)?);
        }
        Ok(bindings)
    }

    /// Bind `argname`; a repeated name replaces the earlier binding in place.
    pub fn insert(&mut self, argname: impl Into<String>, binding: FixtureBinding) {
        let argname = argname.into();
        match self.entries.iter_mut().find(|(name, _)| *name == argname) {
            Some(slot) => slot.1 = binding,
            None => self.entries.push((argname, binding)),
        }
    }

    pub fn schema(&self) -> BindingSchema {
        self.schema
    }

    pub fn argnames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FixtureBinding)> {
        self.entries.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    pub fn get(&self, argname: &str) -> Option<&FixtureBinding> {
        self.entries
            .iter()
            .find(|(name, _)| name == argname)
            .map(|(_, binding)| binding)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Session-wide table of fixture bindings keyed by test instance.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    by_instance: BTreeMap<InstanceKey, FixtureBindings>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `bindings` for `key` in the shape they were declared in. An
    /// argument bound again replaces its earlier entry.
    pub fn register(&mut self, key: InstanceKey, bindings: &FixtureBindings) {
        if bindings.is_empty() {
            return;
        }
        match self.by_instance.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(bindings.clone());
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                for (argname, binding) in bindings.iter() {
                    existing.insert(argname, binding.clone());
                }
            }
        }
    }

    pub fn get(&self, key: &InstanceKey) -> Option<&FixtureBindings> {
        self.by_instance.get(key)
    }

    /// Number of instances with at least one binding.
    pub fn len(&self) -> usize {
        self.by_instance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_instance.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::QualifiedName;
    use serde_json::json;

    #[test]
    fn parses_pairs_and_mapping_shapes() {
        let pairs = FixtureBindings::from_value(
            &json!([
                ["first", {"func": "int_fixture", "scope": "function", "params": [["num", 100]]}],
                ["second", {"func": "plain_fixture"}]
            ]),
            "m.C.t",
        )
        .expect("pairs");
        assert_eq!(pairs.schema(), BindingSchema::Pairs);
        assert_eq!(pairs.argnames().collect::<Vec<_>>(), vec!["first", "second"]);
        let first = pairs.get("first").expect("first binding");
        assert_eq!(first.fixture, "int_fixture");
        assert_eq!(first.scope, Some(Scope::Function));
        assert_eq!(
            first.params.as_ref().and_then(|params| params.get("num")),
            Some(&json!(100))
        );
        assert_eq!(pairs.get("second").and_then(|b| b.scope), None);

        let mapping = FixtureBindings::from_value(
            &json!({"conn": {"func": "db", "scope": "class"}}),
            "m.C.t",
        )
        .expect("mapping");
        assert_eq!(mapping.schema(), BindingSchema::Mapping);
        assert_eq!(mapping.get("conn"), Some(&FixtureBinding::new("db").scope(Scope::Class)));
    }

    #[test]
    fn missing_func_is_a_missing_field() {
        let err = FixtureBindings::from_value(&json!({"conn": {"scope": "class"}}), "m.C.t")
            .expect_err("func missing");
        assert!(matches!(
            err,
            ScenarioError::MissingField { field: "func", .. }
        ));
        assert!(err.to_string().contains("'conn' fixture binding"));
    }

    #[test]
    fn rejects_wrong_arity_and_unknown_scope() {
        let err = FixtureBindings::from_value(&json!([["conn", "db", "class"]]), "m.C.t")
            .expect_err("triple");
        assert!(matches!(err, ScenarioError::MalformedBinding { .. }));
        assert!(err.to_string().contains("(argname, {func="));

        let err = FixtureBindings::from_value(
            &json!([["conn", {"func": "db", "scope": "forever"}]]),
            "m.C.t",
        )
        .expect_err("bad scope");
        assert!(err.to_string().contains("unknown scope 'forever'"));

        let err = FixtureBindings::from_value(&json!(3), "m.C.t").expect_err("scalar");
        assert!(err.is_improperly_configured());
    }

    #[test]
    fn registry_replaces_bindings_per_argument() {
        let key = QualifiedName::new("m", "C", "t").instance("1");
        let mut first = FixtureBindings::new(BindingSchema::Mapping);
        first.insert("x", FixtureBinding::new("f"));
        first.insert("y", FixtureBinding::new("g"));
        let mut again = FixtureBindings::new(BindingSchema::Pairs);
        again.insert("x", FixtureBinding::new("h").scope(Scope::Module));

        let mut registry = BindingRegistry::new();
        registry.register(key.clone(), &first);
        registry.register(key.clone(), &again);

        let bindings = registry.get(&key).expect("bindings");
        assert_eq!(bindings.schema(), BindingSchema::Mapping);
        assert_eq!(bindings.argnames().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(bindings.get("x").map(|b| b.fixture.as_str()), Some("h"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn malformed_entries_get_the_hint_for_their_shape() {
        let err = FixtureBindings::from_value(&json!({"conn": "db"}), "m.C.t")
            .expect_err("mapping entry is not an object");
        assert!(err.to_string().contains("should map each argname to {func="));

        let err = FixtureBindings::from_value(&json!([["conn", "db"]]), "m.C.t")
            .expect_err("pair entry is not an object");
        assert!(err.to_string().contains("(argname, {func="));
    }
}
