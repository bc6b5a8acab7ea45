pub mod extract;
pub mod mermaid;
pub mod model;
pub mod node;
pub mod ruby;
pub mod sexp;

use wasm_bindgen::prelude::*;

use extract::ExtractError;
use mermaid::{Direction, MermaidRenderer};
use model::Schema;
use ruby::FrontendError;
use sexp::SexpError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Syntax tree error: {0}")]
    Sexp(#[from] SexpError),
    #[error("Schema error: {0}")]
    Extract(#[from] ExtractError),
    #[error("Ruby front-end error: {0}")]
    Frontend(#[from] FrontendError),
}

/// Read a Ripper dump and extract its schema model.
pub fn schema_from_sexp(dump: &str) -> Result<Schema, Error> {
    let root = sexp::parse(dump)?;
    Ok(extract::extract(&root)?)
}

/// Full pipeline from a Ripper dump to Mermaid text.
pub fn sexp_to_mermaid(dump: &str, direction: Direction) -> Result<String, Error> {
    let schema = schema_from_sexp(dump)?;
    Ok(MermaidRenderer::new(direction).render_to_string(&schema))
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a Ripper dump of `schema.rb` to a Mermaid graph
#[wasm_bindgen(js_name = "schemaSexpToMermaid")]
pub fn render_sexp(dump: &str, direction: Option<String>) -> Result<String, String> {
    let direction = match direction.as_deref() {
        Some(d) => Direction::from_str(d).ok_or_else(|| format!("Invalid direction: {}", d))?,
        None => Direction::default(),
    };
    sexp_to_mermaid(dump, direction).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::OptionValue;
    use tracing_test::traced_test;

    const DEMO: &str = include_str!("../demos/schema.sexp");

    #[test]
    fn test_demo_schema() {
        let schema = schema_from_sexp(DEMO).unwrap();

        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "users"]);

        let posts = schema.get("posts").unwrap();
        assert_eq!(posts.comment, "");
        assert_eq!(posts.columns.len(), 3);
        assert_eq!(posts.columns[1].option("default"), Some(&OptionValue::Str(String::new())));
        assert_eq!(posts.columns[2].keys(), Some(&["user_id".to_string()][..]));
        assert_eq!(posts.foreign_tables, Some(vec!["users".to_string()]));

        let users = schema.get("users").unwrap();
        assert_eq!(users.comment, "Accounts");
        assert_eq!(users.columns[0].option("null"), Some(&OptionValue::Ident("false".into())));
        assert!(users.foreign_tables.is_none());
    }

    #[test]
    fn test_demo_diagram() {
        let out = sexp_to_mermaid(DEMO, Direction::TD).unwrap();
        assert_eq!(out, "graph TD\n    posts --> users\n    users");
    }

    #[test]
    #[traced_test]
    fn test_ignored_directive_is_logged() {
        schema_from_sexp(DEMO).unwrap();
        assert!(logs_contain("ignoring directive"));
        assert!(logs_contain("enable_extension"));
    }

    #[test]
    fn test_render_sexp_invalid_direction() {
        let err = render_sexp(DEMO, Some("diagonal".into())).unwrap_err();
        assert_eq!(err, "Invalid direction: diagonal");
    }

    #[test]
    fn test_syntax_error_dump() {
        // Ripper.sexp returns nil for unparsable source
        let err = schema_from_sexp("nil\n").unwrap_err();
        assert!(matches!(err, Error::Extract(ExtractError::Malformed { .. })));
    }

    #[test]
    fn test_bad_dump() {
        let err = schema_from_sexp("[:program, ").unwrap_err();
        assert!(matches!(err, Error::Sexp(SexpError::UnexpectedEof)));
    }
}
