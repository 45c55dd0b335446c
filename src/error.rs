//! Error taxonomy for scenario resolution and fixture binding.
//!
//! Every variant except [`ScenarioError::UnresolvableFixture`] describes a
//! programmer or configuration mistake ("improperly configured"); those abort
//! the session from whichever life-cycle hook raised them.
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ScenarioError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(
        "improperly configured: '{name}' scenario is not defined (make sure {} is present)",
        .path.display()
    )]
    MissingScenario { name: String, path: PathBuf },

    #[error("improperly configured: scenario '{name}' is not a valid scenario document ({}): {message}", .path.display())]
    MalformedDocument {
        name: String,
        path: PathBuf,
        message: String,
    },

    #[error("improperly configured: invalid scenario name {name:?} ({reason})")]
    InvalidScenarioName { name: String, reason: &'static str },

    #[error("improperly configured: found a duplicate test id {id} in scenario '{scenario}'")]
    DuplicateTestId { id: String, scenario: String },

    #[error("improperly configured: scenario '{scenario}' references itself ({chain})")]
    ReferenceCycle { scenario: String, chain: String },

    #[error("improperly configured: missing '{field}' field in {owner} configuration")]
    MissingField { field: &'static str, owner: String },

    #[error("improperly configured: '{argument}' is not a valid argument for {function}")]
    UnknownArgument { argument: String, function: String },

    #[error("improperly configured: {owner} - {message}")]
    MalformedBinding { owner: String, message: String },

    #[error(
        "improperly configured: instances of {function} declare different arguments ([{expected}] vs [{found}] in {instance})"
    )]
    InconsistentArguments {
        function: String,
        instance: String,
        expected: String,
        found: String,
    },

    #[error("improperly configured: {test}, {message}")]
    FixtureFailed { test: String, message: String },

    #[error("unable to find a fixture function named {fixture}")]
    UnresolvableFixture { fixture: String },
}

impl ScenarioError {
    /// True for configuration mistakes, false for internal lookup failures.
    pub fn is_improperly_configured(&self) -> bool {
        !matches!(self, ScenarioError::UnresolvableFixture { .. })
    }

    pub(crate) fn missing_field(field: &'static str, owner: impl Into<String>) -> Self {
        ScenarioError::MissingField {
            field,
            owner: owner.into(),
        }
    }

    pub(crate) fn malformed_binding(owner: impl Into<String>, message: impl Into<String>) -> Self {
        ScenarioError::MalformedBinding {
            owner: owner.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fixture_lookups_are_internal_errors() {
        let missing = ScenarioError::missing_field("test_name", "scenario 'smoke'");
        assert!(missing.is_improperly_configured());
        assert!(missing.to_string().starts_with("improperly configured:"));

        let lookup = ScenarioError::UnresolvableFixture {
            fixture: "db".to_string(),
        };
        assert!(!lookup.is_improperly_configured());
        assert_eq!(
            lookup.to_string(),
            "unable to find a fixture function named db"
        );
    }

    #[test]
    fn missing_scenario_names_the_path() {
        let err = ScenarioError::MissingScenario {
            name: "ghost".to_string(),
            path: PathBuf::from("/work/sut/scenarios/ghost.json"),
        };
        let message = err.to_string();
        assert!(message.contains("'ghost' scenario is not defined"));
        assert!(message.contains("/work/sut/scenarios/ghost.json"));
    }
}
