//! Shared utilities for command handlers

use crate::error::{Error, Result};
use anyhow::Context;
use conveyor_core::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Document formats accepted on input and written on save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Load a JSON or YAML document from a file, or from stdin when `file` is `None`
pub fn load_document(file: Option<&Path>) -> Result<Value> {
    let (content, format) = match file {
        Some(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let content = fs::read_to_string(path)?;
            debug!(path = %path.display(), bytes = content.len(), "read document");
            (content, DocumentFormat::from_path(path))
        }
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read standard input")?;
            (content, DocumentFormat::Json)
        }
    };

    parse_document(&content, format).map_err(|e| match file {
        Some(path) => Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: match format {
                DocumentFormat::Json => format!("JSON ({})", e),
                DocumentFormat::Yaml => format!("YAML ({})", e),
            },
        },
        None => e,
    })
}

/// Parse document text into a value graph
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value> {
    let json: serde_json::Value = match format {
        DocumentFormat::Json => serde_json::from_str(content)?,
        DocumentFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(Value::from_json(json))
}

/// Parse an inline JSON argument such as `42`, `"text"` or `{"a": 1}`
pub fn parse_inline(flag: &str, text: &str) -> Result<Value> {
    Value::parse_json(text).map_err(|_| {
        Error::invalid_args(format!(
            "{} expects a JSON value, got '{}' (quote strings, e.g. '\"{}\"')",
            flag, text, text
        ))
    })
}

/// Write a document to a file in the format its extension names
pub fn save_document(path: &Path, json: &serde_json::Value) -> Result<()> {
    let content = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::to_string_pretty(json)?,
        DocumentFormat::Yaml => serde_yaml::to_string(json)?,
    };
    fs::write(path, content)?;
    debug!(path = %path.display(), "saved document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::PropertyPath;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_and_json_documents_agree() {
        let json = parse_document(r#"{"a": {"b": [1, 2]}}"#, DocumentFormat::Json).unwrap();
        let yaml = parse_document("a:\n  b:\n    - 1\n    - 2\n", DocumentFormat::Yaml).unwrap();
        assert_eq!(json.to_json().unwrap(), yaml.to_json().unwrap());

        let path: PropertyPath = "a.b[1]".parse().unwrap();
        assert_eq!(path.resolve(&yaml).unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_document(Some(Path::new("/nonexistent/doc.json")));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_load_reports_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        match load_document(Some(&path)) {
            Err(Error::InvalidFormat { expected, .. }) => assert!(expected.starts_with("JSON")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_inline() {
        assert_eq!(parse_inline("--with", "42").unwrap(), Value::Integer(42));
        assert_eq!(parse_inline("--with", "\"x\"").unwrap(), Value::text("x"));
        assert!(matches!(
            parse_inline("--with", "bare words"),
            Err(Error::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_save_by_extension() {
        let dir = TempDir::new().unwrap();
        let json = serde_json::json!({"name": "baseline"});

        let yaml_path = dir.path().join("out.yml");
        save_document(&yaml_path, &json).unwrap();
        assert_eq!(fs::read_to_string(&yaml_path).unwrap(), "name: baseline\n");

        let json_path = dir.path().join("out.json");
        save_document(&json_path, &json).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(back, json);
    }
}
