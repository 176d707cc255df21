//! Engine configuration
//!
//! Mirrors `bir.config.json`. Finding the file and deciding whether to
//! apply it is up to the front end; [`EngineConfig::load_from_dir`] is the
//! conventional lookup.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::BirError;

/// Name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "bir.config.json";

/// Call stack depth used when the configuration does not set one.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 8000;

/// Settings shared by every module of a host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether the front end should colour its diagnostics
    pub colored_output: bool,

    /// `0` keeps warnings out of [`crate::Module::warnings`]
    pub verbosity_level: u8,

    /// Maximum call stack depth (stack overflow protection)
    pub maximum_callstack_size: usize,

    /// Root directory of `std:` imports
    pub std_path: PathBuf,

    /// Parser executable used by [`crate::frontends::ExternalParser`]
    pub parser: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let std_path = std::env::current_dir()
            .map(|cwd| cwd.join("std"))
            .unwrap_or_else(|_| PathBuf::from("std"));

        Self {
            colored_output: false,
            verbosity_level: 1,
            maximum_callstack_size: DEFAULT_MAX_CALL_DEPTH,
            std_path,
            parser: None,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a configuration file's contents.
    ///
    /// A `maximum_callstack_size` of `0` keeps the default.
    pub fn from_json_str(text: &str) -> Result<Self, BirError> {
        let mut config: EngineConfig = serde_json::from_str(text)?;
        if config.maximum_callstack_size == 0 {
            config.maximum_callstack_size = DEFAULT_MAX_CALL_DEPTH;
        }
        Ok(config)
    }

    /// Read `bir.config.json` from `dir`, if there is one.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Option<Self>, BirError> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&path).map_err(|source| BirError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_json_str(&text).map(Some)
    }

    /// Set a custom call depth limit.
    pub fn with_max_call_depth(mut self, max_depth: usize) -> Self {
        self.maximum_callstack_size = max_depth;
        self
    }

    /// Set the standard library root.
    pub fn with_std_path(mut self, std_path: impl Into<PathBuf>) -> Self {
        self.std_path = std_path.into();
        self
    }

    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u8) -> Self {
        self.verbosity_level = level;
        self
    }

    /// Set the parser executable.
    pub fn with_parser(mut self, parser: impl Into<PathBuf>) -> Self {
        self.parser = Some(parser.into());
        self
    }

    /// Whether warnings are kept on the module.
    pub fn records_warnings(&self) -> bool {
        self.verbosity_level >= 1
    }
}
