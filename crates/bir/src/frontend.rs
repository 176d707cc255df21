//! Parser frontend boundary
//!
//! The evaluator never parses text. A [`Frontend`] turns source into a
//! [`Program`] tree; the stock frontends both speak the parser's JSON
//! contract:
//!
//! ```text
//! { "error": false, "content": { "imports": [...], "program": [...] } }
//! { "error": true,  "content": { "message": "...", "position": {...} } }
//! ```
//!
//! [`TreeFrontend`] treats the source text as that JSON already, which is
//! what tests and pre-parsed inputs use. The process-spawning frontend
//! lives in [`crate::frontends`].

use serde::Deserialize;
use serde_json::Value as Json;
use thiserror::Error;

use crate::ast::{Position, Program};

// ═══════════════════════════════════════════════════════════════════════
// ERROR TYPES
// ═══════════════════════════════════════════════════════════════════════

/// Error that occurred while turning source into a program tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render(.message, .position))]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,

    /// Source location, when the parser reported one
    pub position: Option<Position>,
}

fn render(message: &str, position: &Option<Position>) -> String {
    match position {
        Some(position) => format!("Parse error: {} at {}", message, position),
        None => format!("Parse error: {}", message),
    }
}

impl ParseError {
    /// Create a parse error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    /// Attach the position the parser reported.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PARSER CONTRACT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
struct ParserFailure {
    message: String,
    #[serde(default)]
    position: Option<Position>,
}

/// The `{error, content}` envelope written by the parser.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserOutput {
    /// Whether `content` is an error payload
    pub error: bool,

    /// Program tree or error payload, depending on `error`
    pub content: Json,
}

impl ParserOutput {
    /// Decode an envelope from the parser's stdout.
    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        serde_json::from_str(text)
            .map_err(|e| ParseError::new(format!("Malformed parser output: {}", e)))
    }

    /// Turn the envelope into a program or the reported parse error.
    pub fn into_program(self) -> Result<Program, ParseError> {
        if self.error {
            let failure: ParserFailure = serde_json::from_value(self.content)
                .map_err(|e| ParseError::new(format!("Malformed parser error: {}", e)))?;
            let mut error = ParseError::new(failure.message);
            error.position = failure.position;
            return Err(error);
        }

        serde_json::from_value(self.content)
            .map_err(|e| ParseError::new(format!("Malformed program tree: {}", e)))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FRONTEND TRAIT
// ═══════════════════════════════════════════════════════════════════════

/// Source-to-tree boundary of the interpreter.
///
/// One frontend is shared by every module of a host, including the
/// modules loaded for imports.
pub trait Frontend {
    /// Parse source text into a program tree.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the source is rejected or the parser's
    /// output can not be decoded.
    fn parse(&self, source: &str) -> Result<Program, ParseError>;

    /// Frontend name for diagnostics.
    fn name(&self) -> &str;
}

/// Frontend whose input is already the parser's JSON.
///
/// Accepts either the full `{error, content}` envelope or a bare
/// `{imports, program}` tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeFrontend;

impl TreeFrontend {
    /// Create a new tree frontend.
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for TreeFrontend {
    fn parse(&self, source: &str) -> Result<Program, ParseError> {
        let json: Json = serde_json::from_str(source)
            .map_err(|e| ParseError::new(format!("Malformed program tree: {}", e)))?;

        if json.get("error").is_some() && json.get("content").is_some() {
            let output: ParserOutput = serde_json::from_value(json)
                .map_err(|e| ParseError::new(format!("Malformed parser output: {}", e)))?;
            return output.into_program();
        }

        serde_json::from_value(json)
            .map_err(|e| ParseError::new(format!("Malformed program tree: {}", e)))
    }

    fn name(&self) -> &str {
        "tree"
    }
}
