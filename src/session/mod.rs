//! Session engine driving the host runner's life-cycle hooks.
//!
//! One [`Session`] holds every piece of state that lives for a test session:
//! the mode (inline declarations or a resolved scenario plan), the fixture
//! binding registry, the items awaiting fixture activation, and the inline id
//! counter. Hooks run in host order:
//!
//! 1. [`Session::accepts`] while collecting test functions.
//! 2. [`Session::generate`] per accepted function.
//! 3. [`Session::modify_items`] once over the collected items.
//! 4. [`Session::collection_finish`] after collection.
//! 5. [`Session::activate`] before each item runs.
//! 6. [`Session::teardown`] after each item.
mod activate;
mod collect;
mod generate;
mod report;

use crate::bindings::BindingRegistry;
use crate::error::Result;
use crate::host::{CollectedItem, TestFunction};
use crate::scenarios::{resolve_plan, ScenarioSource, TestPlan};
use std::collections::BTreeMap;

/// How tests are discovered for this session.
#[derive(Debug)]
pub enum SessionMode {
    /// Tests carry inline declarations.
    Inline,
    /// Tests are selected by a resolved scenario plan.
    Scenario(TestPlan),
}

#[derive(Debug)]
pub struct Session {
    mode: SessionMode,
    bindings: BindingRegistry,
    awaiting_setup: BTreeMap<String, CollectedItem>,
    inline_counter: u64,
}

impl Session {
    pub fn inline() -> Self {
        Self::with_mode(SessionMode::Inline)
    }

    pub fn scenario(plan: TestPlan) -> Self {
        Self::with_mode(SessionMode::Scenario(plan))
    }

    fn with_mode(mode: SessionMode) -> Self {
        Self {
            mode,
            bindings: BindingRegistry::new(),
            awaiting_setup: BTreeMap::new(),
            inline_counter: 0,
        }
    }

    /// Start a session from the `--scenario` option: a name resolves that
    /// scenario's plan, no name selects inline mode.
    pub fn configure<S: ScenarioSource + ?Sized>(
        scenario: Option<&str>,
        source: &S,
    ) -> Result<Self> {
        match scenario {
            Some(name) => {
                let plan = resolve_plan(source, name)?;
                tracing::info!(scenario = name, tests = plan.len(), "scenario mode");
                Ok(Self::scenario(plan))
            }
            None => {
                tracing::info!("inline mode");
                Ok(Self::inline())
            }
        }
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn plan(&self) -> Option<&TestPlan> {
        match &self.mode {
            SessionMode::Scenario(plan) => Some(plan),
            SessionMode::Inline => None,
        }
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    pub fn is_awaiting_setup(&self, node_id: &str) -> bool {
        self.awaiting_setup.contains_key(node_id)
    }

    /// Whether `function` should be collected at all.
    pub fn accepts(&self, function: &TestFunction) -> bool {
        match &self.mode {
            SessionMode::Inline => function.inline.is_some(),
            SessionMode::Scenario(plan) => plan.contains_function(&function.name),
        }
    }
}
