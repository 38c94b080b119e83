//! Declarative suite files (YAML or JSON).

mod loader;
mod model;

pub use loader::{SuiteFileError, SuiteFormat, load_suite, lookup_path, parse_suite};
pub use model::{ExpectDecl, SchemaDecl, SuiteFile, TestDecl};
