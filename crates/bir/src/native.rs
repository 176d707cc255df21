//! Host-native blocks
//!
//! A native block's body is a host function. It receives fully evaluated
//! verbs and arguments and answers with a value plus a status the
//! evaluator turns into a warning or a fatal error.
//!
//! The standard registry provides one native, `bir`, a byte-buffer bridge
//! to host I/O driven by numeric verbs.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// Verb constants
// ═══════════════════════════════════════════════════════════════════════

/// Append a byte to the buffer
pub const STD_PUSH: i64 = 1_000_000;
/// Dequeue a byte, or [`STD_DONE`] when empty
pub const STD_PULL: i64 = STD_PUSH + 1;
/// Read from a source into the buffer
pub const STD_READ: i64 = STD_PUSH + 2;
/// Write the buffer to a sink and clear it
pub const STD_WRITE: i64 = STD_PUSH + 3;
/// Console output sink
pub const STD_OUT: i64 = STD_PUSH + 4;
/// File source/sink
pub const STD_FILE: i64 = STD_PUSH + 5;
/// Returned by a pull from an empty buffer
pub const STD_DONE: i64 = STD_PUSH + 6;
/// Console input source
pub const STD_IN: i64 = STD_PUSH + 7;

/// Name of the standard native block.
pub const BRIDGE_NAME: &str = "bir";

// ═══════════════════════════════════════════════════════════════════════
// Native function interface
// ═══════════════════════════════════════════════════════════════════════

/// How a native call went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeStatus {
    /// Nothing to report
    Ok,
    /// Reported, execution continues
    Warn(String),
    /// Terminates the module
    Error(String),
}

/// Result of a native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeReturn {
    /// Value handed back to the caller
    pub value: Value,

    /// Warning or error flag
    pub status: NativeStatus,
}

impl NativeReturn {
    /// A plain value.
    pub fn ok(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            status: NativeStatus::Ok,
        }
    }

    /// A value with a warning.
    pub fn warn(value: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            status: NativeStatus::Warn(message.into()),
        }
    }

    /// A fatal failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            value: Value::NONE,
            status: NativeStatus::Error(message.into()),
        }
    }
}

/// Host function backing a native block: `(verbs, arguments)`.
#[derive(Clone)]
pub struct NativeFn(Rc<dyn Fn(&[Value], &[Value]) -> NativeReturn>);

impl NativeFn {
    /// Wrap a host function.
    pub fn new(f: impl Fn(&[Value], &[Value]) -> NativeReturn + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the host function.
    pub fn call(&self, verbs: &[Value], arguments: &[Value]) -> NativeReturn {
        (self.0)(verbs, arguments)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<native fn>")
    }
}

/// Natives installed into every module root scope of a host.
#[derive(Debug, Clone, Default)]
pub struct NativeRegistry {
    entries: Vec<(String, NativeFn)>,
}

impl NativeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard registry: the `bir` bridge over `io`.
    pub fn standard(io: impl HostIo + 'static) -> Self {
        let bridge = Rc::new(RefCell::new(NativeBridge::new(io)));
        let mut registry = Self::new();
        registry.register(
            BRIDGE_NAME,
            NativeFn::new(move |verbs, arguments| bridge.borrow_mut().dispatch(verbs, arguments)),
        );
        registry
    }

    /// Add a native block. A later registration of the same name wins.
    pub fn register(&mut self, name: impl Into<String>, function: NativeFn) {
        let name = name.into();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, function));
    }

    /// Registered natives in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NativeFn)> {
        self.entries.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// Look up a native by name.
    pub fn get(&self, name: &str) -> Option<&NativeFn> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, f)| f)
    }

    /// Number of registered natives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no natives are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Host I/O
// ═══════════════════════════════════════════════════════════════════════

/// Console access used by the bridge.
pub trait HostIo {
    /// Read one line of input, without its terminator.
    fn read_line(&mut self) -> io::Result<String>;

    /// Write bytes to the output.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Process stdin/stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdIo;

impl HostIo for StdIo {
    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    }
}

/// Scripted input and recorded output, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct CapturedIo {
    input: VecDeque<String>,
    output: Rc<RefCell<Vec<u8>>>,
}

impl CapturedIo {
    /// Captured I/O answering reads with `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: Rc::default(),
        }
    }

    /// Handle on everything written so far.
    pub fn output(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.output)
    }
}

impl HostIo for CapturedIo {
    fn read_line(&mut self) -> io::Result<String> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.borrow_mut().extend_from_slice(bytes);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// The `bir` bridge
// ═══════════════════════════════════════════════════════════════════════

/// Byte buffer shared by every module of a host.
pub struct NativeBridge {
    buffer: VecDeque<u8>,
    io: Box<dyn HostIo>,
}

impl fmt::Debug for NativeBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBridge")
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl NativeBridge {
    /// Create a bridge with an empty buffer.
    pub fn new(io: impl HostIo + 'static) -> Self {
        Self {
            buffer: VecDeque::new(),
            io: Box::new(io),
        }
    }

    /// Route a call on its first verb.
    pub fn dispatch(&mut self, verbs: &[Value], arguments: &[Value]) -> NativeReturn {
        let Some(verb) = verbs.first() else {
            return NativeReturn::error("Native 'bir' block needs at least 1 verb");
        };

        match verb.get() {
            STD_PUSH => self.push(arguments),
            STD_PULL => self.pull(),
            STD_READ => self.read(arguments),
            STD_WRITE => self.write(arguments),
            other => NativeReturn::warn(
                Value::NONE,
                format!("Native 'bir' block has no verb '{}'", other),
            ),
        }
    }

    fn push(&mut self, arguments: &[Value]) -> NativeReturn {
        match arguments.first() {
            Some(byte) => {
                self.buffer.push_back(byte.get() as u8);
                NativeReturn::ok(Value::NONE)
            }
            None => NativeReturn::error("Native 'bir' block's 'push' verb needs at least 1 argument"),
        }
    }

    fn pull(&mut self) -> NativeReturn {
        match self.buffer.pop_front() {
            Some(byte) => NativeReturn::ok(byte),
            None => NativeReturn::ok(STD_DONE),
        }
    }

    fn read(&mut self, arguments: &[Value]) -> NativeReturn {
        let Some(source) = arguments.first() else {
            return NativeReturn::error("Native 'bir' block's 'read' verb needs at least 1 argument");
        };

        match source.get() {
            STD_IN => match self.io.read_line() {
                Ok(line) => {
                    self.buffer.extend(line.bytes());
                    NativeReturn::ok(Value::NONE)
                }
                Err(e) => NativeReturn::error(format!("Could not read input: {}", e)),
            },
            STD_FILE => NativeReturn::warn(Value::NONE, "File input is not supported"),
            other => NativeReturn::warn(Value::NONE, format!("Unknown input source '{}'", other)),
        }
    }

    fn write(&mut self, arguments: &[Value]) -> NativeReturn {
        let Some(sink) = arguments.first() else {
            return NativeReturn::error("Native 'bir' block's 'write' verb needs at least 1 argument");
        };

        match sink.get() {
            STD_OUT => {
                let bytes: Vec<u8> = self.buffer.drain(..).collect();
                match self.io.write(&bytes) {
                    Ok(()) => NativeReturn::ok(Value::NONE),
                    Err(e) => NativeReturn::error(format!("Could not write output: {}", e)),
                }
            }
            STD_FILE => {
                self.buffer.clear();
                NativeReturn::warn(Value::NONE, "File output is not supported")
            }
            other => NativeReturn::warn(Value::NONE, format!("Unknown output sink '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: i64) -> Value {
        Value(n)
    }

    #[test]
    fn test_verb_constants_are_consecutive() {
        assert_eq!(STD_PULL, 1_000_001);
        assert_eq!(STD_OUT, 1_000_004);
        assert_eq!(STD_IN, 1_000_007);
    }

    #[test]
    fn test_push_then_write() {
        let io = CapturedIo::default();
        let output = io.output();
        let mut bridge = NativeBridge::new(io);

        for byte in b"hi" {
            let ret = bridge.dispatch(&[v(STD_PUSH)], &[v(*byte as i64)]);
            assert_eq!(ret.status, NativeStatus::Ok);
        }
        let ret = bridge.dispatch(&[v(STD_WRITE)], &[v(STD_OUT)]);
        assert_eq!(ret, NativeReturn::ok(Value::NONE));
        assert_eq!(output.borrow().as_slice(), b"hi");

        // The write cleared the buffer.
        assert_eq!(bridge.dispatch(&[v(STD_PULL)], &[]).value, v(STD_DONE));
    }

    #[test]
    fn test_pull_drains_then_reports_done() {
        let mut bridge = NativeBridge::new(CapturedIo::default());
        bridge.dispatch(&[v(STD_PUSH)], &[v(65)]);
        assert_eq!(bridge.dispatch(&[v(STD_PULL)], &[]).value, v(65));
        assert_eq!(bridge.dispatch(&[v(STD_PULL)], &[]).value, v(STD_DONE));
    }

    #[test]
    fn test_read_line_into_buffer() {
        let mut bridge = NativeBridge::new(CapturedIo::new(["ok"]));
        let ret = bridge.dispatch(&[v(STD_READ)], &[v(STD_IN)]);
        assert_eq!(ret.status, NativeStatus::Ok);
        assert_eq!(bridge.dispatch(&[v(STD_PULL)], &[]).value, v(b'o' as i64));
        assert_eq!(bridge.dispatch(&[v(STD_PULL)], &[]).value, v(b'k' as i64));

        let ret = bridge.dispatch(&[v(STD_READ)], &[v(STD_IN)]);
        assert!(matches!(ret.status, NativeStatus::Error(_)));
    }

    #[test]
    fn test_missing_verb_or_argument_is_an_error() {
        let mut bridge = NativeBridge::new(CapturedIo::default());
        assert!(matches!(bridge.dispatch(&[], &[]).status, NativeStatus::Error(_)));
        assert!(matches!(
            bridge.dispatch(&[v(STD_PUSH)], &[]).status,
            NativeStatus::Error(_)
        ));
    }

    #[test]
    fn test_unknown_verb_and_file_sink_warn() {
        let mut bridge = NativeBridge::new(CapturedIo::default());
        let ret = bridge.dispatch(&[v(42)], &[]);
        assert_eq!(ret.value, Value::NONE);
        assert!(matches!(ret.status, NativeStatus::Warn(_)));

        let ret = bridge.dispatch(&[v(STD_WRITE)], &[v(STD_FILE)]);
        assert!(matches!(ret.status, NativeStatus::Warn(_)));
    }

    #[test]
    fn test_standard_registry() {
        let registry = NativeRegistry::standard(CapturedIo::default());
        assert_eq!(registry.len(), 1);
        let bir = registry.get(BRIDGE_NAME).unwrap();
        assert_eq!(bir.call(&[v(STD_PULL)], &[]).value, v(STD_DONE));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = NativeRegistry::new();
        registry.register("f", NativeFn::new(|_, _| NativeReturn::ok(1i64)));
        registry.register("f", NativeFn::new(|_, _| NativeReturn::ok(2i64)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("f").unwrap().call(&[], &[]).value, v(2));
    }
}
