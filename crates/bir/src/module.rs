//! Module instances and import resolution
//!
//! A [`Module`] owns one scope stack, one call stack, the modules it
//! imported and its namespace registry. Every module of a program shares
//! one [`Host`]: configuration, frontend and native blocks.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::ast::{Identifier, Import, Position, Program};
use crate::block::{Block, BlockKind, ModuleId};
use crate::callstack::{CallFrame, CallStack, FrameKind};
use crate::config::EngineConfig;
use crate::environment::{Namespaces, Scope, ScopeStack};
use crate::error::{BirError, Diagnostic, ErrorKind, EvalError, Result, Severity};
use crate::eval::{self, FrameGuard};
use crate::frontend::Frontend;
use crate::frontends::ExternalParser;
use crate::native::{NativeRegistry, StdIo};
use crate::value::Value;

/// Parser executable used when the configuration names none.
pub const DEFAULT_PARSER: &str = "bir-parser";

const STD_PREFIX: &str = "std:";
const MODULE_PREFIX: &str = "module:";
const SOURCE_EXTENSION: &str = "bir";

// ═══════════════════════════════════════════════════════════════════════
// Host
// ═══════════════════════════════════════════════════════════════════════

/// State shared by every module of one program.
pub struct Host {
    config: EngineConfig,
    frontend: Box<dyn Frontend>,
    natives: NativeRegistry,
    next_module_id: Cell<u64>,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("config", &self.config)
            .field("frontend", &self.frontend.name())
            .field("natives", &self.natives)
            .field("next_module_id", &self.next_module_id.get())
            .finish()
    }
}

impl Host {
    /// Create a host from its parts.
    pub fn new(
        config: EngineConfig,
        frontend: impl Frontend + 'static,
        natives: NativeRegistry,
    ) -> Rc<Self> {
        Rc::new(Self {
            config,
            frontend: Box::new(frontend),
            natives,
            next_module_id: Cell::new(1),
        })
    }

    /// Host with the standard natives bound to the console.
    pub fn with_frontend(config: EngineConfig, frontend: impl Frontend + 'static) -> Rc<Self> {
        Self::new(config, frontend, NativeRegistry::standard(StdIo))
    }

    /// Host that runs the configured parser executable.
    pub fn from_config(config: EngineConfig) -> Rc<Self> {
        let parser = config
            .parser
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PARSER));
        Self::with_frontend(config, ExternalParser::new(parser))
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parser frontend.
    pub fn frontend(&self) -> &dyn Frontend {
        self.frontend.as_ref()
    }

    /// Natives installed into module roots.
    pub fn natives(&self) -> &NativeRegistry {
        &self.natives
    }

    /// Hand out the next module id; ids are unique per host.
    pub(crate) fn allocate_module_id(&self) -> ModuleId {
        let raw = self.next_module_id.get();
        self.next_module_id.set(raw + 1);
        ModuleId::new(raw)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Module
// ═══════════════════════════════════════════════════════════════════════

/// One running module.
#[derive(Debug)]
pub struct Module {
    pub(crate) id: ModuleId,
    path: Option<PathBuf>,
    dir: PathBuf,
    filename: String,
    program: Program,
    pub(crate) scopes: ScopeStack,
    pub(crate) callstack: CallStack,
    pub(crate) uses: Vec<Module>,
    pub(crate) namespaces: Namespaces,
    host: Rc<Host>,
    warnings: Vec<Diagnostic>,
}

impl Module {
    fn new(
        path: Option<PathBuf>,
        dir: PathBuf,
        filename: String,
        program: Program,
        host: Rc<Host>,
    ) -> Self {
        let id = host.allocate_module_id();

        let mut root = Scope::new();
        for (name, function) in host.natives().iter() {
            root.insert_block(Rc::new(Block::new(
                Identifier::synthetic(name),
                id,
                BlockKind::Native(function.clone()),
                Scope::new().into_ref(),
            )));
        }

        Self {
            id,
            path,
            dir,
            filename,
            program,
            scopes: ScopeStack::with_root(root.into_ref()),
            callstack: CallStack::new(host.config().maximum_callstack_size),
            uses: Vec::new(),
            namespaces: Namespaces::new(),
            host,
            warnings: Vec::new(),
        }
    }

    /// Read, parse and link a module file.
    ///
    /// Imports are loaded and run here; the module's own body runs on
    /// [`run`](Self::run).
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path, host: Rc<Host>) -> std::result::Result<Self, BirError> {
        let source = fs::read_to_string(path).map_err(|source| BirError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let program = host.frontend().parse(&source)?;

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(statements = program.program.len(), imports = program.imports.len(), "module parsed");
        Self::link(Some(path.to_path_buf()), dir, filename, program, host)
    }

    /// Link an already parsed program whose `module:` imports resolve
    /// against `dir`.
    pub fn from_program(
        program: Program,
        dir: impl Into<PathBuf>,
        host: Rc<Host>,
    ) -> std::result::Result<Self, BirError> {
        Self::link(None, dir.into(), "anonymous".to_string(), program, host)
    }

    /// A module with no file, for line-by-line input.
    pub fn anonymous(host: Rc<Host>) -> Self {
        let dir = std::env::current_dir().unwrap_or_default();
        Self::new(None, dir, "repl".to_string(), Program::empty(), host)
    }

    fn link(
        path: Option<PathBuf>,
        dir: PathBuf,
        filename: String,
        program: Program,
        host: Rc<Host>,
    ) -> std::result::Result<Self, BirError> {
        let imports = program.imports.clone();
        let mut module = Self::new(path, dir, filename, program, host);
        module.resolve_imports(&imports)?;
        Ok(module)
    }

    /// Run the module body to completion.
    pub fn run(&mut self) -> Result<Value> {
        let body = Rc::clone(&self.program.program);
        let scope_index = self.scopes.len() - 1;

        let mut guard = FrameGuard::new(self);
        guard.push_frame(CallFrame::new(
            "main",
            FrameKind::Main,
            Position::default(),
            scope_index,
            Rc::clone(&body),
        ));
        eval::resolve_stack(&mut guard, &body)
    }

    /// Parse and run one line of input.
    ///
    /// Each line gets its own scope, which stays on the stack so later
    /// lines see earlier declarations.
    pub fn feed(&mut self, line: &str) -> std::result::Result<Value, BirError> {
        let program = self.host.frontend().parse(line)?;
        self.resolve_imports(&program.imports)?;

        let scope_index = self.scopes.push_fresh();
        let body = program.program;

        let mut guard = FrameGuard::new(self);
        guard.push_frame(CallFrame::new(
            "main",
            FrameKind::Main,
            Position::default(),
            scope_index,
            Rc::clone(&body),
        ));
        Ok(eval::resolve_stack(&mut guard, &body)?)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Imports
    // ═══════════════════════════════════════════════════════════════════

    fn resolve_imports(&mut self, imports: &[Import]) -> Result<()> {
        for import in imports {
            self.resolve_import(import)?;
        }
        Ok(())
    }

    fn resolve_import(&mut self, import: &Import) -> Result<()> {
        let source = import.source.value.as_str();
        let path = self.import_path(source, import.position)?;
        debug!(import = source, path = %path.display(), "resolving import");

        let failed = |error: EvalError| {
            EvalError::new(
                ErrorKind::ImportFailed {
                    import: source.to_string(),
                    error: Box::new(error),
                },
                import.position,
            )
        };

        let mut child = Module::load(&path, Rc::clone(&self.host)).map_err(|e| match e {
            BirError::Eval(error) => failed(error),
            other => EvalError::new(
                ErrorKind::ImportUnreadable {
                    import: source.to_string(),
                    reason: other.to_string(),
                },
                import.position,
            ),
        })?;
        child.run().map_err(failed)?;

        let layer = child.scopes.current().borrow().exported();
        self.scopes.insert_scope_at_bottom(layer.into_ref());
        self.namespaces.merge(&child.namespaces);
        self.warnings.extend(child.warnings.drain(..));
        self.uses.push(child);
        Ok(())
    }

    fn import_path(&self, source: &str, position: Position) -> Result<PathBuf> {
        let file = |rest: &str| format!("{}.{}", rest, SOURCE_EXTENSION);

        if let Some(rest) = source.strip_prefix(STD_PREFIX) {
            let path = self.host.config().std_path.join(file(rest));
            if !path.is_file() {
                return Err(EvalError::new(
                    ErrorKind::StdImportNotFound {
                        import: source.to_string(),
                    },
                    position,
                ));
            }
            return Ok(path);
        }

        if let Some(rest) = source.strip_prefix(MODULE_PREFIX) {
            let path = self.dir.join(file(rest));
            if !path.is_file() {
                return Err(EvalError::new(
                    ErrorKind::ModuleImportNotFound {
                        import: source.to_string(),
                    },
                    position,
                ));
            }
            return Ok(path);
        }

        Err(EvalError::new(
            ErrorKind::InvalidImportPrefix {
                import: source.to_string(),
            },
            position,
        ))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════

    /// Build a fatal error carrying the current call stack.
    pub(crate) fn error(&self, kind: ErrorKind, position: Position) -> EvalError {
        EvalError::new(kind, position).with_callstack(self.callstack.snapshot())
    }

    /// Report a warning; kept on the module when verbosity allows.
    pub(crate) fn warn(&mut self, message: impl Into<String>, position: Position) {
        let message = message.into();
        warn!(module = %self.filename, %position, "{}", message);

        if self.host.config().records_warnings() {
            self.warnings.push(Diagnostic {
                severity: Severity::Warning,
                message,
                position,
                callstack: self.callstack.snapshot(),
            });
        }
    }

    /// Label prefix file name for control-flow frames.
    pub(crate) fn filename(&self) -> &str {
        &self.filename
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Unique id of this instance.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Source file, if the module was loaded from one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Directory `module:` imports resolve against.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The module's scope stack.
    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// The module's call stack.
    pub fn callstack(&self) -> &CallStack {
        &self.callstack
    }

    /// Imported module instances.
    pub fn uses(&self) -> &[Module] {
        &self.uses
    }

    /// Namespaces visible to this module.
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// Warnings recorded so far, imports' included.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Remove and return the recorded warnings.
    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    /// Shared host.
    pub fn host(&self) -> &Rc<Host> {
        &self.host
    }

    /// Look up a variable visible at the top of the scope stack.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.scopes.find_variable(name).map(|lookup| lookup.value)
    }
}
