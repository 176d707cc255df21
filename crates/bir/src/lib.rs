//! # Bir
//!
//! Execution engine for Bir, a small integer-only scripting language.
//!
//! Bir programs are parsed by an external frontend into a JSON syntax
//! tree. This crate walks that tree: it owns scopes, blocks, the call
//! stack, module imports and the handful of native blocks that talk to
//! the host.
//!
//! ## Architecture
//!
//! - **Frontend**: turns source text into a [`Program`] ([`TreeFrontend`]
//!   for JSON trees, [`frontends::ExternalParser`] for the parser program)
//! - **Module**: one loaded file with its own scope stack, call stack and
//!   imports
//! - **Evaluator**: the [`Evaluate`] trait and [`eval::resolve_stack`]
//! - **Natives**: host functions installed as blocks, see [`native`]
//!
//! ## Example
//!
//! ```
//! use bir::{EngineConfig, Host, Module, TreeFrontend};
//!
//! let host = Host::with_frontend(EngineConfig::default(), TreeFrontend);
//! let mut repl = Module::anonymous(host);
//! repl.feed(r#"{"program": [{"operation": "variable_declaration", "kind": "const",
//!     "left": {"value": "x"},
//!     "right": {"operation": "primitive", "type": "int", "value": 41}}]}"#)
//!     .unwrap();
//! assert_eq!(repl.variable("x"), Some(bir::Value(41)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod block;
pub mod callstack;
pub mod config;
pub mod environment;
pub mod error;
pub mod eval;
pub mod frontend;
pub mod frontends;
pub mod module;
pub mod native;
pub mod stack;
pub mod value;

// Re-export main types
pub use ast::{Expression, Identifier, Position, Program, Statement};
pub use block::{Block, BlockKind, ModuleId};
pub use callstack::{CallFrame, CallStack, FrameKind};
pub use config::EngineConfig;
pub use environment::{Binding, BindingKind, Namespace, Namespaces, Scope, ScopeRef, ScopeStack};
pub use error::{BirError, Diagnostic, ErrorKind, EvalError, Result, Severity};
pub use eval::{resolve_stack, Evaluate};
pub use frontend::{Frontend, ParseError, TreeFrontend};
pub use module::{Host, Module};
pub use native::{CapturedIo, HostIo, NativeFn, NativeRegistry, NativeReturn, StdIo};
pub use value::Value;

/// Bir version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
