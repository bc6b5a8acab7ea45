//! Runs Ruby's Ripper over a `schema.rb` and returns the s-expression dump.

use std::path::Path;
use std::process::Command;
use tracing::debug;

pub const DEFAULT_RUBY: &str = "ruby";

const DUMP_SCRIPT: &str = "require 'ripper'; p Ripper.sexp(ARGF.read)";

#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    #[error("Failed to run {ruby}: {source}")]
    Spawn {
        ruby: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{ruby} exited with {status}: {stderr}")]
    Failed {
        ruby: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("Ruby output is not UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Dump the Ripper tree of `path` using the `ruby` executable.
pub fn dump_sexp(ruby: &str, path: &Path) -> Result<String, FrontendError> {
    debug!(ruby, path = %path.display(), "running Ripper");

    let output = Command::new(ruby)
        .arg("-e")
        .arg(DUMP_SCRIPT)
        .arg(path)
        .output()
        .map_err(|source| FrontendError::Spawn {
            ruby: ruby.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(FrontendError::Failed {
            ruby: ruby.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8(output.stdout)?)
}

/// Whether `path` is Ruby source rather than a ready-made dump.
pub fn is_ruby_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "rb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ruby_source() {
        assert!(is_ruby_source(Path::new("db/schema.rb")));
        assert!(!is_ruby_source(Path::new("schema.sexp")));
        assert!(!is_ruby_source(Path::new("schema")));
    }

    #[test]
    fn test_missing_interpreter() {
        let err = dump_sexp("schemagraph-no-such-ruby", Path::new("schema.rb")).unwrap_err();
        assert!(matches!(err, FrontendError::Spawn { .. }));
    }
}
