//! Frontend that runs the parser as a child process
//!
//! The parser executable takes the source text as its single argument and
//! prints the `{error, content}` envelope on stdout.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::ast::Program;
use crate::frontend::{Frontend, ParseError, ParserOutput};

/// Parser executable invoked once per parsed source.
#[derive(Debug, Clone)]
pub struct ExternalParser {
    program: PathBuf,
}

impl ExternalParser {
    /// Use the parser executable at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the parser executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Frontend for ExternalParser {
    fn parse(&self, source: &str) -> Result<Program, ParseError> {
        debug!(parser = %self.program.display(), bytes = source.len(), "spawning parser");

        let output = Command::new(&self.program)
            .arg(source)
            .output()
            .map_err(|e| {
                ParseError::new(format!(
                    "Could not run parser '{}': {}",
                    self.program.display(),
                    e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ParseError::new(format!(
                "Parser '{}' produced no output ({}): {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        ParserOutput::from_json_str(&stdout)?.into_program()
    }

    fn name(&self) -> &str {
        "external"
    }
}
