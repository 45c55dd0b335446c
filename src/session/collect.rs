//! Collection filtering, outcome annotation, and reordering.
use super::{Session, SessionMode};
use crate::error::Result;
use crate::host::CollectedItem;
use crate::order::OrderBuckets;
use crate::scenarios::TestPlan;

impl Session {
    /// Filter and reorder the host's collected items in place, then attach
    /// bound fixtures to the items that use them.
    pub fn modify_items(&mut self, items: &mut Vec<CollectedItem>) -> Result<()> {
        if let SessionMode::Scenario(plan) = &self.mode {
            let collected = std::mem::take(items);
            *items = select_scenario_items(plan, collected)?;
        }
        self.attach_bindings(items);
        Ok(())
    }

    fn attach_bindings(&mut self, items: &mut [CollectedItem]) {
        for item in items.iter_mut() {
            if item.skip {
                continue;
            }
            let Some(key) = item.key() else {
                continue;
            };
            let Some(bindings) = self.bindings.get(&key) else {
                continue;
            };
            let mut needs_setup = false;
            for (argname, binding) in bindings.iter() {
                if let Some(params) = &binding.params {
                    item.fixture_params
                        .insert(binding.fixture.clone(), params.clone());
                }
                if !item.dependencies.contains(&binding.fixture) {
                    item.dependencies.push(binding.fixture.clone());
                }
                needs_setup |= item.requests(argname);
            }
            if needs_setup {
                tracing::debug!(node_id = %item.node_id, "item awaits fixture activation");
                self.awaiting_setup
                    .insert(item.node_id.clone(), item.clone());
            }
        }
    }
}

fn select_scenario_items(
    plan: &TestPlan,
    items: Vec<CollectedItem>,
) -> Result<Vec<CollectedItem>> {
    let mut buckets = OrderBuckets::new();
    let mut dropped = 0usize;
    for mut item in items {
        let Some(case) = item.key().and_then(|key| plan.get(&key)) else {
            dropped += 1;
            continue;
        };
        item.skip = case.skip()?;
        item.xfail = case.xfail()?;
        buckets.push(Some(case.order), item);
    }
    let selected = buckets.into_ordered();
    tracing::info!(
        scenario = plan.scenario(),
        selected = selected.len(),
        dropped,
        "filtered collected items"
    );
    Ok(selected)
}
