//! Call stack: active invocation and control-flow frames
//!
//! Frames drive three things: the recursion bound, the labels attached to
//! diagnostics, and finding the storage scope of the nearest genuine block
//! invocation for scope mutaters.

use std::fmt;

use crate::ast::{Body, Position};
use crate::error::{ErrorKind, EvalError};

/// Frames kept in an overflow report.
pub const OVERFLOW_SNAPSHOT_FRAMES: usize = 10;

/// What pushed a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Module body or REPL line
    Main,
    /// Block invocation
    Block,
    /// One-time `init` list of a block declaration
    Init,
    /// `for` iteration
    For,
    /// `while` iteration
    While,
    /// `if` body
    If,
    /// `elif` body
    Elif,
    /// `else` body
    Else,
    /// Selected `case` body
    SwitchCase,
    /// `default` body
    SwitchDefault,
    /// Native block call
    Native,
}

impl FrameKind {
    /// Whether this frame owns a block instance: a call, or the `init`
    /// list that builds the instance.
    pub fn is_invocation(self) -> bool {
        matches!(self, FrameKind::Block | FrameKind::Init)
    }

    /// Label prefix of control-flow frames.
    pub fn control_label(self) -> Option<&'static str> {
        match self {
            FrameKind::For => Some("for"),
            FrameKind::While => Some("while"),
            FrameKind::If => Some("if"),
            FrameKind::Elif => Some("elif"),
            FrameKind::Else => Some("else"),
            FrameKind::SwitchCase => Some("switch-case"),
            FrameKind::SwitchDefault => Some("switch-default"),
            FrameKind::Main | FrameKind::Block | FrameKind::Init | FrameKind::Native => None,
        }
    }
}

/// One entry of the call stack.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Diagnostic label
    pub label: String,

    /// Invocation or control flow
    pub kind: FrameKind,

    /// Where the frame was entered
    pub position: Position,

    /// Scope stack index of the frame's storage scope
    pub scope_index: usize,

    /// Statements being executed
    pub body: Body,
}

impl CallFrame {
    /// Create a frame.
    pub fn new(
        label: impl Into<String>,
        kind: FrameKind,
        position: Position,
        scope_index: usize,
        body: Body,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            position,
            scope_index,
            body,
        }
    }

    /// Frame of a control-flow body, labelled with its source location.
    pub fn control(
        kind: FrameKind,
        file: &str,
        position: Position,
        scope_index: usize,
        body: Body,
    ) -> Self {
        let prefix = kind.control_label().unwrap_or("anonymous");
        let label = format!("{}-block [{}->{}]", prefix, file, position);
        Self::new(label, kind, position, scope_index, body)
    }
}

impl fmt::Display for CallFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.position)
    }
}

/// Ordered list of active frames with a depth bound.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: usize,
}

impl CallStack {
    /// Create an empty call stack.
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame.
    pub fn push(&mut self, frame: CallFrame) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame.
    pub fn pop(&mut self) -> Option<CallFrame> {
        self.frames.pop()
    }

    /// The innermost frame.
    pub fn current(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Configured depth bound.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether no frame is active.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether the innermost frame is a module body.
    pub fn is_top_level(&self) -> bool {
        matches!(self.current(), None | Some(CallFrame { kind: FrameKind::Main, .. }))
    }

    /// Refuse a new invocation once the bound is reached.
    ///
    /// The error carries the first [`OVERFLOW_SNAPSHOT_FRAMES`] labels.
    pub fn check_depth(&self, position: Position) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            return Err(EvalError::new(
                ErrorKind::CallstackOverflow {
                    max: self.max_depth,
                },
                position,
            )
            .with_callstack(self.snapshot_bounded(OVERFLOW_SNAPSHOT_FRAMES)));
        }
        Ok(())
    }

    /// The nearest enclosing block invocation or `init` list.
    pub fn nearest_invocation(&self) -> Option<&CallFrame> {
        self.frames.iter().rev().find(|frame| frame.kind.is_invocation())
    }

    /// All labels, outermost first.
    pub fn snapshot(&self) -> Vec<String> {
        self.frames.iter().map(|frame| frame.label.clone()).collect()
    }

    /// At most `limit` labels, outermost first.
    pub fn snapshot_bounded(&self, limit: usize) -> Vec<String> {
        self.frames
            .iter()
            .take(limit)
            .map(|frame| frame.label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn frame(label: &str, kind: FrameKind) -> CallFrame {
        CallFrame::new(label, kind, Position::default(), 0, Rc::from(Vec::new()))
    }

    #[test]
    fn test_control_label() {
        let frame = CallFrame::control(
            FrameKind::SwitchCase,
            "main.bir",
            Position::new(3, 4),
            1,
            Rc::from(Vec::new()),
        );
        assert_eq!(frame.label, "switch-case-block [main.bir->3:4]");
    }

    #[test]
    fn test_top_level() {
        let mut stack = CallStack::new(10);
        assert!(stack.is_top_level());
        stack.push(frame("main", FrameKind::Main));
        assert!(stack.is_top_level());
        stack.push(frame("for-block", FrameKind::For));
        assert!(!stack.is_top_level());
    }

    #[test]
    fn test_nearest_invocation_skips_control_flow() {
        let mut stack = CallStack::new(10);
        stack.push(frame("main", FrameKind::Main));
        assert!(stack.nearest_invocation().is_none());

        stack.push(frame("counter", FrameKind::Block));
        stack.push(frame("if-block", FrameKind::If));
        stack.push(frame("for-block", FrameKind::For));
        assert_eq!(stack.nearest_invocation().map(|f| f.label.as_str()), Some("counter"));
    }

    #[test]
    fn test_init_frame_owns_its_instance() {
        let mut stack = CallStack::new(10);
        stack.push(frame("main", FrameKind::Main));
        stack.push(frame("outer", FrameKind::Block));
        stack.push(frame("inner:init", FrameKind::Init));
        stack.push(frame("while-block", FrameKind::While));
        assert_eq!(stack.nearest_invocation().map(|f| f.label.as_str()), Some("inner:init"));
    }

    #[test]
    fn test_overflow_snapshot_is_bounded() {
        let mut stack = CallStack::new(12);
        stack.push(frame("main", FrameKind::Main));
        for _ in 0..11 {
            stack.push(frame("loop", FrameKind::Block));
        }

        let err = stack.check_depth(Position::new(1, 0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CallstackOverflow { max: 12 });
        assert_eq!(err.callstack.len(), OVERFLOW_SNAPSHOT_FRAMES);
        assert_eq!(err.callstack[0], "main");
    }

    #[test]
    fn test_depth_below_bound_passes() {
        let mut stack = CallStack::new(2);
        stack.push(frame("main", FrameKind::Main));
        assert!(stack.check_depth(Position::default()).is_ok());
        stack.push(frame("f", FrameKind::Block));
        assert!(stack.check_depth(Position::default()).is_err());
        stack.pop();
        assert_eq!(stack.depth(), 1);
    }
}
