//! Pre-execution fixture activation.
use super::Session;
use crate::error::{Result, ScenarioError};
use crate::host::{FixtureHost, FixtureRequest};
use std::collections::BTreeMap;

impl Session {
    /// Resolve the fixtures bound to `node_id` and write their values into
    /// `funcargs`. Returns how many arguments were injected; items with no
    /// bindings are left alone.
    pub fn activate<H: FixtureHost>(
        &self,
        node_id: &str,
        host: &mut H,
        funcargs: &mut BTreeMap<String, H::Value>,
    ) -> Result<usize> {
        let Some(item) = self.awaiting_setup.get(node_id) else {
            return Ok(0);
        };
        let Some(bindings) = item.key().and_then(|key| self.bindings.get(&key)) else {
            return Ok(0);
        };
        let mut injected = 0;
        for (argname, binding) in bindings.iter() {
            let current = host.fixture_scope(&binding.fixture).ok_or_else(|| {
                ScenarioError::UnresolvableFixture {
                    fixture: binding.fixture.clone(),
                }
            })?;
            if let Some(scope) = binding.scope {
                if scope != current {
                    tracing::debug!(fixture = %binding.fixture, from = %current, to = %scope, "overriding fixture scope");
                    host.override_scope(&binding.fixture, scope);
                }
            }
            let request = FixtureRequest {
                item,
                param: item.fixture_params.get(&binding.fixture),
            };
            let value = host
                .resolve(&binding.fixture, &request)
                .map_err(|err| ScenarioError::FixtureFailed {
                    test: item.name(),
                    message: format!("{err:#}"),
                })?;
            funcargs.insert(argname.to_string(), value);
            injected += 1;
        }
        Ok(injected)
    }
}
