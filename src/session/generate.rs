//! Parametrization of test functions.
//!
//! Fixture-bound arguments always come first, followed by literal params; a
//! name bound both ways keeps only its fixture-bound occurrence.
use super::{Session, SessionMode};
use crate::bindings::{FixtureBindings, Scope};
use crate::error::{Result, ScenarioError};
use crate::host::{ArgValue, Invocation, Parametrization, TestFunction};
use crate::scenarios::{InstanceKey, ParamList};

struct Arguments {
    names: Vec<String>,
    values: Vec<ArgValue>,
    bindings: Option<FixtureBindings>,
}

fn build_arguments(
    function: &TestFunction,
    params: Option<&ParamList>,
    bindings: Option<&FixtureBindings>,
) -> Result<Arguments> {
    let check = |argname: &str| {
        if function.declares(argname) {
            Ok(())
        } else {
            Err(ScenarioError::UnknownArgument {
                argument: argname.to_string(),
                function: function.name.to_string(),
            })
        }
    };

    let mut arguments = Arguments {
        names: Vec::new(),
        values: Vec::new(),
        bindings: bindings.cloned(),
    };
    if let Some(bindings) = bindings {
        for (argname, binding) in bindings.iter() {
            check(argname)?;
            arguments.names.push(argname.to_string());
            arguments
                .values
                .push(ArgValue::Fixture(binding.fixture.clone()));
        }
    }
    if let Some(params) = params {
        for (argname, value) in params.iter() {
            check(argname)?;
            if bindings.is_some_and(|bindings| bindings.get(argname).is_some()) {
                continue;
            }
            arguments.names.push(argname.to_string());
            arguments.values.push(ArgValue::Literal(value.clone()));
        }
    }
    Ok(arguments)
}

impl Session {
    /// Parametrize `function`, or return `None` when this session does not
    /// drive it.
    pub fn generate(&mut self, function: &TestFunction) -> Result<Option<Parametrization>> {
        if matches!(self.mode, SessionMode::Inline) {
            self.generate_inline(function)
        } else {
            self.generate_scenario(function)
        }
    }

    fn generate_inline(&mut self, function: &TestFunction) -> Result<Option<Parametrization>> {
        let Some(case) = function.inline.as_ref() else {
            return Ok(None);
        };
        self.inline_counter += 1;
        let instance_id = self.inline_counter.to_string();
        let arguments = build_arguments(
            function,
            case.params.as_ref(),
            case.fixture_binding.as_ref(),
        )?;
        let key = function.name.instance(instance_id.clone());
        self.register_bindings(key, arguments.bindings);
        tracing::debug!(function = %function.name, id = %instance_id, "generated inline test case");
        Ok(Some(Parametrization {
            argnames: arguments.names,
            invocations: vec![Invocation {
                id: instance_id,
                values: arguments.values,
            }],
            scope: Scope::Function,
        }))
    }

    fn generate_scenario(&mut self, function: &TestFunction) -> Result<Option<Parametrization>> {
        let SessionMode::Scenario(plan) = &self.mode else {
            return Ok(None);
        };
        let mut argnames: Option<Vec<String>> = None;
        let mut invocations = Vec::new();
        let mut registrations = Vec::new();
        for case in plan.instances_of(&function.name) {
            let params = case.params()?;
            let bindings = case.fixture_binding()?;
            let arguments = build_arguments(function, Some(&params), bindings.as_ref())?;
            if let Some(expected) = &argnames {
                if *expected != arguments.names {
                    return Err(ScenarioError::InconsistentArguments {
                        function: function.name.to_string(),
                        instance: case.key.to_string(),
                        expected: expected.join(", "),
                        found: arguments.names.join(", "),
                    });
                }
            } else {
                argnames = Some(arguments.names);
            }
            registrations.push((case.key.clone(), arguments.bindings));
            invocations.push(Invocation {
                id: case.composite_id().to_string(),
                values: arguments.values,
            });
        }
        let Some(argnames) = argnames else {
            return Ok(None);
        };
        for (key, bindings) in registrations {
            self.register_bindings(key, bindings);
        }
        tracing::debug!(function = %function.name, instances = invocations.len(), "generated scenario test cases");
        Ok(Some(Parametrization {
            argnames,
            invocations,
            scope: Scope::Function,
        }))
    }

    fn register_bindings(&mut self, key: InstanceKey, bindings: Option<FixtureBindings>) {
        if let Some(bindings) = bindings {
            self.bindings.register(key, &bindings);
        }
    }
}
