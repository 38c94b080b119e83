//! Loading suite files and turning them into runnable suites.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use wrestle_application::{Completion, Suite, Transport};
use wrestle_domain::{DomainError, HttpMethod, Schema, SchemaScope, VariableStore};

use super::model::{SchemaDecl, SuiteFile, TestDecl};

/// Errors that can occur while loading a suite file.
#[derive(Debug, Error)]
pub enum SuiteFileError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The YAML document is invalid.
    #[error("invalid YAML suite: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document is invalid.
    #[error("invalid JSON suite: {0}")]
    Json(#[from] serde_json::Error),

    /// A schema descriptor, method or pattern is invalid.
    #[error("{context}: {source}")]
    Domain {
        /// Which declaration failed.
        context: String,
        /// Underlying error.
        source: DomainError,
    },
}

/// Source format of a suite document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// YAML (also accepts JSON, which YAML contains).
    Yaml,
    /// Strict JSON.
    Json,
}

impl SuiteFormat {
    /// Picks the format from a file extension; anything but `.json` is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Parses a suite document.
///
/// # Errors
///
/// Returns an error if the document is not a valid suite.
pub fn parse_suite(text: &str, format: SuiteFormat) -> Result<SuiteFile, SuiteFileError> {
    match format {
        SuiteFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        SuiteFormat::Json => Ok(serde_json::from_str(text)?),
    }
}

/// Reads and parses a suite file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid suite.
pub async fn load_suite(path: impl AsRef<Path>) -> Result<SuiteFile, SuiteFileError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SuiteFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), "loaded suite file");
    parse_suite(&text, SuiteFormat::from_path(path))
}

impl SuiteFile {
    /// Builds a suite from this file's configuration and declarations.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown methods and invalid schema descriptors.
    pub fn into_suite<T: Transport>(self, transport: T) -> Result<Suite<T>, SuiteFileError> {
        let Self {
            config,
            variables,
            schemas,
            tests,
        } = self;

        let mut suite = Suite::with_config(transport, config);
        suite.define_all(variables);

        for (i, decl) in schemas.into_iter().enumerate() {
            register_schema(&mut suite, decl)
                .map_err(|source| domain_error(format!("schema #{}", i + 1), source))?;
        }
        for (i, decl) in tests.into_iter().enumerate() {
            let label = format!("test #{} ({} {})", i + 1, decl.method, decl.path);
            declare_test(&mut suite, decl).map_err(|source| domain_error(label, source))?;
        }

        Ok(suite)
    }
}

const fn domain_error(context: String, source: DomainError) -> SuiteFileError {
    SuiteFileError::Domain { context, source }
}

fn register_schema<T: Transport>(suite: &mut Suite<T>, decl: SchemaDecl) -> Result<(), DomainError> {
    let mut scope = SchemaScope::any();
    if let Some(method) = decl.method.as_deref().filter(|m| *m != "*") {
        scope = scope.with_method(method.parse()?);
    }
    if let Some(status) = decl.status {
        scope = scope.with_status(status);
    }
    suite.schema(decl.namespace, scope, Schema::from_descriptor(&decl.schema)?);
    Ok(())
}

fn declare_test<T: Transport>(suite: &mut Suite<T>, decl: TestDecl) -> Result<(), DomainError> {
    let method: HttpMethod = decl.method.parse()?;
    let schema = decl
        .expect
        .schema
        .as_ref()
        .map(Schema::from_descriptor)
        .transpose()?;

    let mut builder = suite.test(method, decl.path).params_map(decl.params);
    if let Some(description) = decl.description {
        builder = builder.describe(description);
    }
    if let Some(status) = decl.expect.status {
        builder = builder.expect_status(status);
    }
    if let Some(schema) = schema {
        builder = builder.expect_schema(schema);
    }
    if !decl.expect.capture.is_empty() {
        let capture = decl.expect.capture;
        builder = builder.then(move |done: &Completion<'_>, store: &mut VariableStore| {
            let Some(data) = done.data else {
                return;
            };
            for (name, path) in &capture {
                match lookup_path(data, path) {
                    Some(value) => store.define(name.clone(), value.clone()),
                    None => warn!(test = done.index, variable = %name, path = %path, "capture path not found"),
                }
            }
        });
    }
    builder.compile();
    Ok(())
}

/// Follows a dotted path (`user.ids.0`) into a JSON value. An empty path
/// returns the value itself.
#[must_use]
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_lookup_path() {
        let body = json!({"session": {"id": "abc"}, "ids": [4, 5]});
        assert_eq!(lookup_path(&body, "session.id"), Some(&json!("abc")));
        assert_eq!(lookup_path(&body, "ids.1"), Some(&json!(5)));
        assert_eq!(lookup_path(&body, ""), Some(&body));
        assert_eq!(lookup_path(&body, "session.missing"), None);
        assert_eq!(lookup_path(&body, "ids.x"), None);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SuiteFormat::from_path(Path::new("a.json")), SuiteFormat::Json);
        assert_eq!(SuiteFormat::from_path(Path::new("a.JSON")), SuiteFormat::Json);
        assert_eq!(SuiteFormat::from_path(Path::new("a.yml")), SuiteFormat::Yaml);
        assert_eq!(SuiteFormat::from_path(Path::new("suite")), SuiteFormat::Yaml);
    }

    #[test]
    fn test_parse_yaml_suite() {
        let yaml = r#"
config:
  base_url: http://localhost:8181
  display: { response_data: true }
variables:
  password: hunter2
schemas:
  - namespace: response
    method: "*"
    schema: { ok: Boolean }
tests:
  - method: post
    path: /login
    params: { user: tom }
    expect:
      status: 200
      capture: { session: session.id }
"#;
        let file = parse_suite(yaml, SuiteFormat::Yaml).unwrap();

        assert_eq!(file.config.base_url.as_deref(), Some("http://localhost:8181"));
        assert!(file.config.display.response_data);
        assert_eq!(file.variables["password"], json!("hunter2"));
        assert_eq!(file.schemas.len(), 1);
        assert_eq!(file.tests[0].expect.status, Some(200));
        assert_eq!(file.tests[0].expect.capture["session"], "session.id");
    }

    #[test]
    fn test_parse_json_suite() {
        let file = parse_suite(
            r#"{"tests": [{"method": "get", "path": "/health"}]}"#,
            SuiteFormat::Json,
        )
        .unwrap();
        assert_eq!(file.tests[0].path, "/health");
        assert_eq!(file.config.base_url, None);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_suite("{", SuiteFormat::Json),
            Err(SuiteFileError::Json(_))
        ));
    }
}
