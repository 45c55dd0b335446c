//! Test-plan resolution.
//!
//! Walks a scenario document in order, splicing `@ref` sub-scenarios in
//! place. Composite ids chain the reference path (`root-1/sub-a`) and a single
//! order counter runs across the whole expansion, so nested scenarios still
//! yield one global pre-order sequence.
use super::{
    InstanceKey, QualifiedName, ResolvedTestCase, ScenarioRecord, ScenarioSource, TestPlan,
};
use crate::error::{Result, ScenarioError};
use std::collections::{BTreeMap, BTreeSet};

/// Resolves scenarios against one source, loading each document at most once.
pub struct PlanResolver<'a, S: ScenarioSource + ?Sized> {
    source: &'a S,
    documents: BTreeMap<String, Vec<ScenarioRecord>>,
    stack: Vec<String>,
}

impl<'a, S: ScenarioSource + ?Sized> PlanResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            documents: BTreeMap::new(),
            stack: Vec::new(),
        }
    }

    /// Resolve `scenario` into plan entries, continuing the order from
    /// `order`. Returns the entries and the last order value assigned.
    pub fn resolve(
        &mut self,
        scenario: &str,
        parent: Option<&str>,
        order: i64,
    ) -> Result<(BTreeMap<InstanceKey, ResolvedTestCase>, i64)> {
        if self.stack.iter().any(|name| name == scenario) {
            let mut chain = self.stack.clone();
            chain.push(scenario.to_string());
            return Err(ScenarioError::ReferenceCycle {
                scenario: scenario.to_string(),
                chain: chain.join(" -> "),
            });
        }
        let records = self.document(scenario)?;
        self.stack.push(scenario.to_string());
        let expanded = self.expand(scenario, records, parent, order);
        self.stack.pop();
        expanded
    }

    fn expand(
        &mut self,
        scenario: &str,
        records: Vec<ScenarioRecord>,
        parent: Option<&str>,
        mut order: i64,
    ) -> Result<(BTreeMap<InstanceKey, ResolvedTestCase>, i64)> {
        let mut cases = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for record in records {
            let id = record.id.as_ref().ok_or_else(|| {
                ScenarioError::missing_field("id", format!("scenario '{scenario}' test case record"))
            })?;
            let local_id = format!("{scenario}-{id}");
            let composite_id = match parent {
                Some(parent) if !parent.is_empty() => format!("{parent}/{local_id}"),
                _ => local_id,
            };
            if !seen.insert(composite_id.clone()) {
                return Err(ScenarioError::DuplicateTestId {
                    id: id.to_string(),
                    scenario: scenario.to_string(),
                });
            }

            if let Some(reference) = record.reference() {
                tracing::debug!(scenario, reference, parent = %composite_id, "expanding sub-scenario");
                let (sub_cases, last_order) =
                    self.resolve(reference, Some(&composite_id), order)?;
                order = last_order;
                cases.extend(sub_cases);
                continue;
            }

            let owner = format!("scenario '{scenario}' test case {id}");
            let test_name = record
                .test_name
                .clone()
                .ok_or_else(|| ScenarioError::missing_field("test_name", owner.clone()))?;
            let module_name = record
                .module_name
                .clone()
                .ok_or_else(|| ScenarioError::missing_field("module_name", owner))?;
            let function = QualifiedName {
                module: module_name,
                class: record.class_name.clone(),
                function: test_name,
            };
            order += 1;
            let key = function.instance(composite_id);
            cases.insert(
                key.clone(),
                ResolvedTestCase {
                    key,
                    scenario: scenario.to_string(),
                    order,
                    record,
                },
            );
        }
        Ok((cases, order))
    }

    fn document(&mut self, scenario: &str) -> Result<Vec<ScenarioRecord>> {
        if let Some(records) = self.documents.get(scenario) {
            return Ok(records.clone());
        }
        let records = self.source.load(scenario)?;
        self.documents.insert(scenario.to_string(), records.clone());
        Ok(records)
    }
}

/// Resolve the root scenario `name` into a complete [`TestPlan`].
pub fn resolve_plan<S: ScenarioSource + ?Sized>(source: &S, name: &str) -> Result<TestPlan> {
    let mut resolver = PlanResolver::new(source);
    let (cases, last_order) = resolver.resolve(name, None, 0)?;
    tracing::info!(scenario = name, cases = cases.len(), last_order, "resolved test plan");
    Ok(TestPlan::new(name, cases))
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
