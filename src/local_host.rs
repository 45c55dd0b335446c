//! In-process [`FixtureHost`] with scope-keyed caching.
//!
//! Each fixture caches one value together with the key of the scope it was
//! computed in (node id, module+class, module, or the session). A request
//! from a different scope key recomputes; overriding a fixture's scope drops
//! the cached value first.
use crate::bindings::Scope;
use crate::host::{CollectedItem, FixtureHost, FixtureRequest};
use anyhow::anyhow;
use std::collections::BTreeMap;

type Factory<V> = Box<dyn Fn(&FixtureRequest<'_>) -> anyhow::Result<V>>;

struct FixtureDef<V> {
    scope: Scope,
    factory: Factory<V>,
    cached: Option<(String, V)>,
}

/// Fixture registry that resolves values by calling registered factories.
pub struct LocalFixtureHost<V> {
    fixtures: BTreeMap<String, FixtureDef<V>>,
}

impl<V> Default for LocalFixtureHost<V> {
    fn default() -> Self {
        Self {
            fixtures: BTreeMap::new(),
        }
    }
}

impl<V: Clone> LocalFixtureHost<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with a default `scope`; re-registering replaces it.
    pub fn register<F>(&mut self, name: impl Into<String>, scope: Scope, factory: F) -> &mut Self
    where
        F: Fn(&FixtureRequest<'_>) -> anyhow::Result<V> + 'static,
    {
        self.fixtures.insert(
            name.into(),
            FixtureDef {
                scope,
                factory: Box::new(factory),
                cached: None,
            },
        );
        self
    }
}

fn scope_key(scope: Scope, item: &CollectedItem) -> String {
    match scope {
        Scope::Function => item.node_id.clone(),
        Scope::Class => format!(
            "{}::{}",
            item.function.module,
            item.function.class.as_deref().unwrap_or_default()
        ),
        Scope::Module => item.function.module.clone(),
        Scope::Session => String::new(),
    }
}

impl<V: Clone> FixtureHost for LocalFixtureHost<V> {
    type Value = V;

    fn fixture_scope(&self, fixture: &str) -> Option<Scope> {
        self.fixtures.get(fixture).map(|def| def.scope)
    }

    fn override_scope(&mut self, fixture: &str, scope: Scope) {
        if let Some(def) = self.fixtures.get_mut(fixture) {
            def.cached = None;
            def.scope = scope;
        }
    }

    fn resolve(&mut self, fixture: &str, request: &FixtureRequest<'_>) -> anyhow::Result<V> {
        let def = self
            .fixtures
            .get_mut(fixture)
            .ok_or_else(|| anyhow!("fixture '{fixture}' not found"))?;
        let key = scope_key(def.scope, request.item);
        if let Some((cached_key, value)) = &def.cached {
            if *cached_key == key {
                return Ok(value.clone());
            }
        }
        let value = (def.factory)(request)?;
        def.cached = Some((key, value.clone()));
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::QualifiedName;
    use std::cell::Cell;
    use std::rc::Rc;

    fn item(class: &str, node: &str) -> CollectedItem {
        CollectedItem::new(node, QualifiedName::new("tests.mod", class, "test_x"))
    }

    fn counting_host(scope: Scope) -> (LocalFixtureHost<u32>, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut host = LocalFixtureHost::new();
        host.register("counter", scope, move |_| {
            counter.set(counter.get() + 1);
            Ok(counter.get())
        });
        (host, calls)
    }

    fn resolve(host: &mut LocalFixtureHost<u32>, item: &CollectedItem) -> u32 {
        host.resolve(
            "counter",
            &FixtureRequest {
                item,
                param: None,
            },
        )
        .expect("resolve counter")
    }

    #[test]
    fn function_scope_recomputes_per_item() {
        let (mut host, calls) = counting_host(Scope::Function);
        let first = item("A", "n1");
        let second = item("A", "n2");
        assert_eq!(resolve(&mut host, &first), 1);
        assert_eq!(resolve(&mut host, &first), 1);
        assert_eq!(resolve(&mut host, &second), 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn class_scope_shares_within_a_class() {
        let (mut host, _) = counting_host(Scope::Class);
        assert_eq!(resolve(&mut host, &item("A", "n1")), 1);
        assert_eq!(resolve(&mut host, &item("A", "n2")), 1);
        assert_eq!(resolve(&mut host, &item("B", "n3")), 2);
    }

    #[test]
    fn override_finishes_the_cached_value() {
        let (mut host, _) = counting_host(Scope::Session);
        assert_eq!(resolve(&mut host, &item("A", "n1")), 1);
        host.override_scope("counter", Scope::Module);
        assert_eq!(host.fixture_scope("counter"), Some(Scope::Module));
        assert_eq!(resolve(&mut host, &item("B", "n2")), 2);
        assert_eq!(resolve(&mut host, &item("C", "n3")), 2);
    }

    #[test]
    fn unknown_fixtures_are_reported() {
        let (mut host, _) = counting_host(Scope::Function);
        assert_eq!(host.fixture_scope("missing"), None);
        let target = item("A", "n1");
        let err = host
            .resolve(
                "missing",
                &FixtureRequest {
                    item: &target,
                    param: None,
                },
            )
            .expect_err("missing fixture");
        assert!(err.to_string().contains("fixture 'missing' not found"));
    }
}
