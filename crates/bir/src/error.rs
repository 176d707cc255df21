//! Error types for Bir evaluation
//!
//! Fatal conditions are carried as [`EvalError`]: the kind of failure, the
//! source position, and the call stack labels captured when it was raised.
//! Non-fatal conditions are [`Diagnostic`]s collected on the module.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ast::Position;
use crate::frontend::ParseError;
use crate::value::Value;

/// Main error type for loading and running modules.
#[derive(Error, Debug)]
pub enum BirError {
    /// A module file could not be read
    #[error("Could not read '{}': {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The parser rejected the source
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A configuration file was malformed
    #[error("Could not properly parse the config file: {0}")]
    Config(#[from] serde_json::Error),

    /// Evaluation hit a fatal condition
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Result type alias for evaluator operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// The reason a module run was terminated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// `let`/`const` of a name already declared in the current scope
    #[error("Could not redeclare an existing variable '{name}'")]
    RedeclaredVariable {
        /// Variable name
        name: String,
    },

    /// Block declaration whose name is already reachable
    #[error("Could not redeclare an existing block '{name}'")]
    RedeclaredBlock {
        /// Block name
        name: String,
    },

    /// Namespace declared twice
    #[error("Could not redeclare an existing namespace '{name}'")]
    RedeclaredNamespace {
        /// Namespace name
        name: String,
    },

    /// Read of an unknown variable
    #[error("Could not find variable '{name}' in the frame")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Call of an unknown block, or of a block whose owner is not imported
    #[error("Could not find block '{name}'")]
    BlockNotFound {
        /// Block name
        name: String,
    },

    /// `implements` naming an unknown block
    #[error("Could not implement '{name}', block is non-existent")]
    MissingImplementation {
        /// Implemented block name
        name: String,
    },

    /// Assignment to an unknown variable
    #[error("Could not assign to a variable that does not exist ('{name}')")]
    AssignUndefined {
        /// Variable name
        name: String,
    },

    /// Assignment to a const binding or immutable scope
    #[error("Could not assign to an immutable variable '{name}'")]
    AssignImmutable {
        /// Variable name
        name: String,
    },

    /// Assignment to a binding imported from another module
    #[error("Could not assign to a foreign variable '{name}'")]
    AssignForeign {
        /// Variable name
        name: String,
    },

    /// `return` in the main frame
    #[error("Top level return statements are not allowed")]
    TopLevelReturn,

    /// `throw` in the main frame
    #[error("Top level throw statements are not allowed")]
    TopLevelThrow,

    /// Explicit `throw`
    #[error("Bir process has thrown error with value '{value}'")]
    Thrown {
        /// Thrown value
        value: Value,
    },

    /// Block invocation past the configured maximum depth
    #[error("Maximum callstack size of {max} exceeded")]
    CallstackOverflow {
        /// Configured maximum
        max: usize,
    },

    /// Scope mutater in the main frame
    #[error("Scope mutaters are not allowed at the top level")]
    TopLevelScopeMutater,

    /// Scope mutater with no enclosing block invocation
    #[error("Scope mutater '{mutater}' used outside of a block")]
    MutaterOutsideBlock {
        /// Mutater keyword
        mutater: String,
    },

    /// Unknown mutater keyword
    #[error("Unknown scope mutater '{mutater}'")]
    UnknownMutater {
        /// Mutater keyword
        mutater: String,
    },

    /// Mutater with the wrong number of operands
    #[error("Scope mutater '{mutater}' expects {expected} argument(s), found {found}")]
    MutaterArity {
        /// Mutater keyword
        mutater: String,
        /// Required operands
        expected: usize,
        /// Given operands
        found: usize,
    },

    /// `Read` of an index never written
    #[error("No such index '{index}' in the block scope")]
    NoSuchIndex {
        /// Requested index
        index: Value,
    },

    /// Index into an unknown namespace
    #[error("Could not find namespace '{name}'")]
    NamespaceNotFound {
        /// Namespace name
        name: String,
    },

    /// Index of an unknown namespace member
    #[error("Could not find '{member}' in namespace '{namespace}'")]
    NamespaceMemberNotFound {
        /// Namespace name
        namespace: String,
        /// Member name
        member: String,
    },

    /// Non-declaration statement inside a namespace body
    #[error("Namespaces may only contain variable declarations")]
    NamespaceStatement,

    /// Import source without a known prefix
    #[error("Import '{import}' must start with 'std:' or 'module:'")]
    InvalidImportPrefix {
        /// Import source
        import: String,
    },

    /// Standard library import with no backing file
    #[error("Import '{import}' is not included in the standard library")]
    StdImportNotFound {
        /// Import source
        import: String,
    },

    /// Sibling module import with no backing file
    #[error("Import '{import}' could not be found next to this module")]
    ModuleImportNotFound {
        /// Import source
        import: String,
    },

    /// The imported module could not be read or parsed
    #[error("Import '{import}' could not be loaded: {reason}")]
    ImportUnreadable {
        /// Import source
        import: String,
        /// Read or parse failure
        reason: String,
    },

    /// The imported module raised a fatal error while loading or running
    #[error("Import '{import}' failed: {error}")]
    ImportFailed {
        /// Import source
        import: String,
        /// Error raised inside the imported module
        #[source]
        error: Box<EvalError>,
    },

    /// Division or modulus by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// `log` of a non-positive value
    #[error("Could not take the logarithm of {value}")]
    InvalidLogarithm {
        /// Operand
        value: Value,
    },

    /// `'` with a zero root
    #[error("Could not take the zeroth root")]
    ZeroRoot,

    /// String/array literal where an integer is required
    #[error("A {kind} literal can not be used as a value")]
    UnsupportedLiteral {
        /// Literal type
        kind: &'static str,
    },

    /// Native block reported an error
    #[error("Native block '{name}' failed: {message}")]
    Native {
        /// Block name
        name: String,
        /// Host message
        message: String,
    },
}

/// A fatal evaluation error with its diagnostic context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {position}")]
pub struct EvalError {
    /// What went wrong
    pub kind: ErrorKind,

    /// Where it went wrong
    pub position: Position,

    /// Call stack labels, outermost first
    pub callstack: Vec<String>,
}

impl EvalError {
    /// Create an error without call stack context.
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        Self {
            kind,
            position,
            callstack: Vec::new(),
        }
    }

    /// Attach a call stack snapshot.
    pub fn with_callstack(mut self, callstack: Vec<String>) -> Self {
        self.callstack = callstack;
        self
    }
}

impl From<ErrorKind> for EvalError {
    fn from(kind: ErrorKind) -> Self {
        EvalError::new(kind, Position::default())
    }
}

/// Severity of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Reported, execution continues
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// A reported condition that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious it is
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Where it happened
    pub position: Position,

    /// Call stack labels, outermost first
    pub callstack: Vec<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}", self.severity, self.message, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_error_display_includes_position() {
        let err = EvalError::new(
            ErrorKind::UndefinedVariable {
                name: "x".to_string(),
            },
            Position::new(3, 4),
        );
        assert_eq!(err.to_string(), "Could not find variable 'x' in the frame at 3:4");
    }

    #[test]
    fn test_thrown_message() {
        let kind = ErrorKind::Thrown { value: Value(7) };
        assert_eq!(kind.to_string(), "Bir process has thrown error with value '7'");
    }

    #[test]
    fn test_with_callstack() {
        let err = EvalError::from(ErrorKind::TopLevelReturn)
            .with_callstack(vec!["main".to_string()]);
        assert_eq!(err.callstack, vec!["main".to_string()]);
        assert_eq!(err.position, Position::default());
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            severity: Severity::Warning,
            message: "Expected 2 argument(s), found 1 while calling 'add'".to_string(),
            position: Position::new(1, 0),
            callstack: Vec::new(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "[WARNING] Expected 2 argument(s), found 1 while calling 'add' at 1:0"
        );
    }
}
