//! Boundary types and capabilities shared with the host test runner.
//!
//! The host owns discovery, parametrized item creation, fixture resolution,
//! and execution. It hands this crate [`TestFunction`]s to parametrize and
//! [`CollectedItem`]s to filter and order, and exposes its dependency
//! injection through [`FixtureHost`].
use crate::bindings::{FixtureBinding, FixtureBindings, Scope};
use crate::error::{Result, ScenarioError};
use crate::scenarios::{InstanceKey, ParamList, QualifiedName};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Inline test-case declaration attached to a test function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineTestCase {
    pub params: Option<ParamList>,
    pub fixture_binding: Option<FixtureBindings>,
}

impl InlineTestCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.get_or_insert_with(ParamList::new).set(name, value);
        self
    }

    pub fn bind(mut self, argname: impl Into<String>, binding: FixtureBinding) -> Self {
        self.fixture_binding
            .get_or_insert_with(|| FixtureBindings::new(crate::bindings::BindingSchema::Pairs))
            .insert(argname, binding);
        self
    }

    /// Parse a declaration written as JSON
    /// (`{"test_params": [...], "fixture_binding": [...]}`).
    pub fn from_value(value: &Value, owner: &str) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(ScenarioError::malformed_binding(
                owner,
                "test case declaration should be an object",
            ));
        };
        let params = map
            .get("test_params")
            .or_else(|| map.get("params"))
            .filter(|value| !value.is_null())
            .map(|value| ParamList::from_value(value, owner))
            .transpose()?;
        let fixture_binding = map
            .get("fixture_binding")
            .filter(|value| !value.is_null())
            .map(|value| FixtureBindings::from_value(value, owner))
            .transpose()?;
        Ok(Self {
            params,
            fixture_binding,
        })
    }
}

/// A test function the host is about to generate invocations for.
#[derive(Debug, Clone)]
pub struct TestFunction {
    pub name: QualifiedName,
    /// Argument names the function declares.
    pub params: Vec<String>,
    pub inline: Option<InlineTestCase>,
}

impl TestFunction {
    pub fn new<I, P>(name: QualifiedName, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            name,
            params: params.into_iter().map(Into::into).collect(),
            inline: None,
        }
    }

    pub fn with_inline(mut self, case: InlineTestCase) -> Self {
        self.inline = Some(case);
        self
    }

    pub fn declares(&self, argname: &str) -> bool {
        self.params.iter().any(|param| param == argname)
    }
}

/// Value supplied for one argument of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgValue {
    Literal(Value),
    /// Placeholder replaced by the fixture's value right before the test runs.
    Fixture(String),
}

/// One concrete invocation of a parametrized function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    pub id: String,
    pub values: Vec<ArgValue>,
}

impl Invocation {
    pub fn value(&self, argnames: &[String], argname: &str) -> Option<&ArgValue> {
        argnames
            .iter()
            .position(|name| name == argname)
            .and_then(|idx| self.values.get(idx))
    }
}

/// Parametrization the host should apply to a test function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parametrization {
    pub argnames: Vec<String>,
    pub invocations: Vec<Invocation>,
    pub scope: Scope,
}

/// An item discovered by the host, reduced to what filtering and activation
/// need.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedItem {
    pub node_id: String,
    pub function: QualifiedName,
    /// Parametrization id; `None` for items that were never parametrized.
    pub instance_id: Option<String>,
    /// Argument names the test requests from the host.
    pub fixture_names: Vec<String>,
    pub skip: bool,
    pub xfail: bool,
    /// Fixtures attached as extra dependencies of this item.
    pub dependencies: Vec<String>,
    /// Request parameters handed to attached fixtures.
    pub fixture_params: BTreeMap<String, ParamList>,
}

impl CollectedItem {
    pub fn new(node_id: impl Into<String>, function: QualifiedName) -> Self {
        Self {
            node_id: node_id.into(),
            function,
            instance_id: None,
            fixture_names: Vec::new(),
            skip: false,
            xfail: false,
            dependencies: Vec::new(),
            fixture_params: BTreeMap::new(),
        }
    }

    /// Build the item a host creates for one invocation of `function`.
    pub fn for_invocation(function: &TestFunction, invocation: &Invocation) -> Self {
        let name = &function.name;
        let mut node_id = name.module.replace('.', "/");
        node_id.push_str(".py");
        if let Some(class) = &name.class {
            node_id.push_str("::");
            node_id.push_str(class);
        }
        node_id.push_str(&format!("::{}[{}]", name.function, invocation.id));
        Self {
            instance_id: Some(invocation.id.clone()),
            fixture_names: function.params.clone(),
            ..Self::new(node_id, name.clone())
        }
    }

    /// Display name: `function[instance_id]`.
    pub fn name(&self) -> String {
        match &self.instance_id {
            Some(id) => format!("{}[{}]", self.function.function, id),
            None => self.function.function.clone(),
        }
    }

    pub fn key(&self) -> Option<InstanceKey> {
        self.instance_id
            .as_ref()
            .map(|id| self.function.instance(id.clone()))
    }

    pub fn requests(&self, argname: &str) -> bool {
        self.fixture_names.iter().any(|name| name == argname)
    }
}

/// Context handed to the host when it resolves a fixture for an item.
#[derive(Debug, Clone, Copy)]
pub struct FixtureRequest<'a> {
    pub item: &'a CollectedItem,
    pub param: Option<&'a ParamList>,
}

/// Dependency-injection capability of the host runner.
pub trait FixtureHost {
    type Value;

    /// Current scope of `fixture`, or `None` when the host has no such fixture.
    fn fixture_scope(&self, fixture: &str) -> Option<Scope>;

    /// Finish any cached value of `fixture` and switch it to `scope`.
    fn override_scope(&mut self, fixture: &str, scope: Scope);

    /// Resolve the value of `fixture` for the requesting item.
    fn resolve(&mut self, fixture: &str, request: &FixtureRequest<'_>)
        -> anyhow::Result<Self::Value>;
}
