//! Console reporting after collection and after each item.
use super::Session;
use crate::console::Console;
use crate::host::CollectedItem;
use std::io;

impl Session {
    /// Announce the selected scenario once collection has finished.
    pub fn collection_finish(&self, console: &mut dyn Console) {
        let Some(plan) = self.plan() else {
            return;
        };
        let banner = format!("selected scenario: \n{}\n", plan.scenario());
        if let Err(err) = console.write(&banner) {
            tracing::warn!(error = %err, "failed to write scenario banner");
        }
    }

    /// Write the closing separator for `item`.
    pub fn teardown(&self, item: &CollectedItem, console: &mut dyn Console) {
        let outcome = if item.skip { "skipped" } else { "finished" };
        let title = format!("{} {}", item.name(), outcome);
        if let Err(err) = write_section(console, &title) {
            tracing::warn!(error = %err, node_id = %item.node_id, "failed to write teardown banner");
        }
    }
}

fn write_section(console: &mut dyn Console, title: &str) -> io::Result<()> {
    console.write("\n")?;
    console.sep('=', title)?;
    console.write("\n")
}
