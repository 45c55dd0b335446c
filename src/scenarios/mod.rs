//! Scenario documents, plan resolution, and the resolved plan.
//!
//! A scenario selects, orders, and parameterizes tests declaratively; `@ref`
//! records splice whole sub-scenarios in place. Resolution turns the document
//! tree into one [`TestPlan`] with globally unique composite ids and a single
//! execution order.
mod load;
mod plan;
mod resolve;
mod types;

pub use load::{validate_scenario_name, FsScenarioSource, MemoryScenarioSource, ScenarioSource};
pub use plan::TestPlan;
pub use resolve::{resolve_plan, PlanResolver};
pub use types::*;
