//! Key/value substitution backed by a table file

use crate::conversion::{Conversion, Diagnostic, UnitState};
use crate::types::TypeDescriptor;
use crate::value::Value;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What [`Lookup`] does with a key missing from its table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKey {
    /// Forward the input unchanged
    #[default]
    Keep,
    /// Fail the conversion
    Fail,
}

/// Replaces its input with the value stored under it in a `key=value` file.
///
/// The table is loaded once, during set-up. Blank lines and lines starting
/// with `#` are ignored; keys and values are trimmed.
#[derive(Debug, Default)]
pub struct Lookup {
    path: Option<PathBuf>,
    missing: MissingKey,
    table: HashMap<String, String>,
    state: UnitState,
}

impl Lookup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_missing(mut self, missing: MissingKey) -> Self {
        self.missing = missing;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Point at another table; it is loaded on the next conversion
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
        self.table.clear();
        self.state.invalidate_set_up();
    }

    pub fn set_missing(&mut self, missing: MissingKey) {
        self.missing = missing;
        self.state.invalidate();
    }

    /// Number of loaded entries
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn parse_table(content: &str) -> Result<HashMap<String, String>, String> {
    let mut table = HashMap::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| format!("line {}: expected key=value", number + 1))?;
        table.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(table)
}

impl Conversion for Lookup {
    fn id(&self) -> &'static str {
        "lookup"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Text
    }

    fn generates(&self) -> TypeDescriptor {
        TypeDescriptor::Text
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn requires_set_up(&self) -> bool {
        true
    }

    fn check_configuration(&mut self) -> Result<(), Diagnostic> {
        if self.path.is_none() {
            return Err(Diagnostic::configuration("no lookup table configured"));
        }
        Ok(())
    }

    fn set_up(&mut self) -> Result<(), String> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| "no lookup table configured".to_string())?;
        let content = fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        self.table = parse_table(&content)?;
        debug!(path = %path.display(), entries = self.table.len(), "loaded lookup table");
        Ok(())
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        let Some(key) = input.as_str() else {
            bail!("expected a string, got {}", input.type_descriptor());
        };
        match (self.table.get(key), self.missing) {
            (Some(value), _) => Ok(Value::text(value.as_str())),
            (None, MissingKey::Keep) => Ok(input),
            (None, MissingKey::Fail) => bail!("no entry for key '{}'", key),
        }
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(Lookup {
            path: self.path.clone(),
            missing: self.missing,
            ..Lookup::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::DiagnosticKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_lookup_replaces_known_keys() {
        let file = table("# colours\nred = #ff0000\n\ngreen=#00ff00\n");
        let mut unit = Lookup::new(file.path());

        unit.set_input(Value::text("red"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::text("#ff0000")));
        assert_eq!(unit.len(), 2);

        unit.set_input(Value::text("blue"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::text("blue")));
    }

    #[test]
    fn test_set_up_runs_once() {
        let file = table("a=1\n");
        let mut unit = Lookup::new(file.path());
        unit.set_input(Value::text("a"));
        unit.convert().unwrap();

        // later edits of the file are not picked up without reconfiguration
        fs::write(file.path(), "a=2\n").unwrap();
        unit.set_input(Value::text("a"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::text("1")));

        unit.set_path(file.path());
        unit.set_input(Value::text("a"));
        unit.convert().unwrap();
        assert_eq!(unit.output(), Some(&Value::text("2")));
    }

    #[test]
    fn test_missing_file_is_set_up_failure() {
        let mut unit = Lookup::new("/nonexistent/table.properties");
        unit.set_input(Value::text("a"));
        let diagnostic = unit.convert().unwrap_err();
        assert_eq!(diagnostic.kind(), DiagnosticKind::SetUp);
        assert!(diagnostic.to_string().contains("lookup"));
    }

    #[test]
    fn test_missing_key_policy() {
        let file = table("a=1\n");
        let mut unit = Lookup::new(file.path()).with_missing(MissingKey::Fail);
        unit.set_input(Value::text("b"));
        assert_eq!(unit.convert().unwrap_err().kind(), DiagnosticKind::Transform);
    }

    #[test]
    fn test_malformed_table() {
        assert!(parse_table("just a key").is_err());
        assert_eq!(parse_table("k = v = w").unwrap()["k"], "v = w");
    }
}
