//! Concrete parser frontends
//!
//! [`crate::frontend::TreeFrontend`] covers pre-parsed input; this module
//! holds the frontends that talk to a parser outside the process.

pub mod external;

pub use external::ExternalParser;
