//! Scenario document loading.
//!
//! A scenario is a JSON array of records stored at
//! `{scenarios_dir}/{name}.json`. Sources only fetch and parse documents;
//! resolution and validation happen in the resolver.
use super::ScenarioRecord;
use crate::config::has_parent_components;
use crate::error::{Result, ScenarioError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Provider of raw scenario documents by name.
pub trait ScenarioSource {
    fn load(&self, name: &str) -> Result<Vec<ScenarioRecord>>;
}

/// Reads scenario documents from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsScenarioSource {
    dir: PathBuf,
}

impl FsScenarioSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the document path for `name` (not checked for existence).
    pub fn scenario_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl ScenarioSource for FsScenarioSource {
    fn load(&self, name: &str) -> Result<Vec<ScenarioRecord>> {
        validate_scenario_name(name)?;
        let path = self.scenario_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ScenarioError::MissingScenario {
                    name: name.to_string(),
                    path: absolute_path(&path),
                });
            }
            Err(err) => {
                return Err(ScenarioError::MalformedDocument {
                    name: name.to_string(),
                    path: absolute_path(&path),
                    message: format!("read failed: {err}"),
                });
            }
        };
        let records: Vec<ScenarioRecord> =
            serde_json::from_slice(&bytes).map_err(|err| ScenarioError::MalformedDocument {
                name: name.to_string(),
                path: absolute_path(&path),
                message: err.to_string(),
            })?;
        tracing::debug!(scenario = name, path = %path.display(), records = records.len(), "loaded scenario");
        Ok(records)
    }
}

/// Serves scenario documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryScenarioSource {
    documents: BTreeMap<String, Value>,
}

impl MemoryScenarioSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, document: Value) -> Self {
        self.insert(name, document);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, document: Value) {
        self.documents.insert(name.into(), document);
    }
}

impl ScenarioSource for MemoryScenarioSource {
    fn load(&self, name: &str) -> Result<Vec<ScenarioRecord>> {
        validate_scenario_name(name)?;
        let path = PathBuf::from(format!("<memory>/{name}.json"));
        let document = self
            .documents
            .get(name)
            .ok_or_else(|| ScenarioError::MissingScenario {
                name: name.to_string(),
                path: path.clone(),
            })?;
        serde_json::from_value(document.clone()).map_err(|err| ScenarioError::MalformedDocument {
            name: name.to_string(),
            path,
            message: err.to_string(),
        })
    }
}

/// Scenario names become file paths, so keep them relative to the
/// scenarios dir. Any other characters are allowed.
pub fn validate_scenario_name(name: &str) -> Result<()> {
    let invalid = |reason| ScenarioError::InvalidScenarioName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    let path = Path::new(name);
    if path.is_absolute() || name.starts_with('/') {
        return Err(invalid("absolute paths are not allowed"));
    }
    if has_parent_components(path) {
        return Err(invalid("'..' segments are not allowed"));
    }
    Ok(())
}

fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_scenario(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(format!("{name}.json"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create scenario dir");
        }
        fs::write(path, contents).expect("write scenario");
    }

    #[test]
    fn loads_records_in_document_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scenario(
            temp.path(),
            "smoke",
            r#"[{"id": "b", "test_name": "test_b"}, {"id": "a", "@ref": "inner"}]"#,
        );
        let source = FsScenarioSource::new(temp.path());
        let records = source.load("smoke").expect("load smoke");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].test_name.as_deref(), Some("test_b"));
        assert_eq!(records[1].reference(), Some("inner"));
    }

    #[test]
    fn missing_document_names_scenario_and_absolute_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = FsScenarioSource::new(temp.path().join("sut/scenarios"));
        let err = source.load("ghost").expect_err("ghost is missing");
        let ScenarioError::MissingScenario { name, path } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(name, "ghost");
        assert!(path.is_absolute());
        assert!(path.ends_with("sut/scenarios/ghost.json"));
        let message = err.to_string();
        assert!(message.contains("ghost"));
        assert!(message.contains(&path.display().to_string()));
    }

    #[test]
    fn non_array_documents_are_malformed() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scenario(temp.path(), "object", r#"{"id": 1}"#);
        let err = FsScenarioSource::new(temp.path())
            .load("object")
            .expect_err("object document");
        assert!(matches!(err, ScenarioError::MalformedDocument { .. }));
        assert!(err.is_improperly_configured());
    }

    #[test]
    fn nested_names_resolve_below_the_scenarios_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_scenario(temp.path(), "suites/login", "[]");
        let records = FsScenarioSource::new(temp.path())
            .load("suites/login")
            .expect("nested scenario");
        assert!(records.is_empty());
    }

    #[test]
    fn rejects_escaping_names() {
        let err = validate_scenario_name("../secrets").expect_err("parent dir");
        assert!(err.to_string().contains("invalid scenario name"));
        assert!(validate_scenario_name("/etc/passwd").is_err());
        assert!(validate_scenario_name("").is_err());
        assert!(validate_scenario_name("smoke-1.v2").is_ok());
        assert!(validate_scenario_name("suites/../../etc").is_err());
    }

    #[test]
    fn names_with_spaces_and_non_ascii_letters_load() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = FsScenarioSource::new(temp.path());
        for name in ["nightly run", "регресс", "suites/ночной прогон"] {
            write_scenario(temp.path(), name, r#"[{"id": 1, "test_name": "test_a"}]"#);
            let records = source.load(name).expect("scenario with a free-form name");
            assert_eq!(records.len(), 1, "{name}");
        }
    }

    #[test]
    fn memory_source_reports_missing_documents() {
        let source = MemoryScenarioSource::new().with("smoke", json!([]));
        assert!(source.load("smoke").expect("smoke").is_empty());
        let err = source.load("ghost").expect_err("ghost");
        assert!(err.to_string().contains("'ghost' scenario is not defined"));
    }
}
