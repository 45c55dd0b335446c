//! Resolved test plan.
//!
//! The plan is built once per scenario selection and is immutable afterward.
use super::{InstanceKey, QualifiedName, ResolvedTestCase};
use std::collections::BTreeMap;

/// Resolved test cases keyed by `module.class.function[composite_id]`.
#[derive(Debug, Clone)]
pub struct TestPlan {
    scenario: String,
    cases: BTreeMap<InstanceKey, ResolvedTestCase>,
}

impl TestPlan {
    pub fn new(scenario: impl Into<String>, cases: BTreeMap<InstanceKey, ResolvedTestCase>) -> Self {
        Self {
            scenario: scenario.into(),
            cases,
        }
    }

    /// Name of the root scenario this plan was resolved from.
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn get(&self, key: &InstanceKey) -> Option<&ResolvedTestCase> {
        self.cases.get(key)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn contains_function(&self, function: &QualifiedName) -> bool {
        self.cases.keys().any(|key| key.function == *function)
    }

    /// Instances of `function`, in execution order.
    pub fn instances_of(&self, function: &QualifiedName) -> Vec<&ResolvedTestCase> {
        let mut cases: Vec<&ResolvedTestCase> = self
            .cases
            .values()
            .filter(|case| case.key.function == *function)
            .collect();
        cases.sort_by_key(|case| case.order);
        cases
    }

    /// Every case, in execution order.
    pub fn in_order(&self) -> Vec<&ResolvedTestCase> {
        let mut cases: Vec<&ResolvedTestCase> = self.cases.values().collect();
        cases.sort_by_key(|case| case.order);
        cases
    }
}
