//! Load ES module files into a persistent REPL session.
//!
//! Files are rewritten into REPL-compatible code, preloaded one at a time into
//! a shared global context, and then an interactive prompt keeps evaluating
//! (rewritten) input against the same context.

pub mod config;
pub mod driver;
pub mod error;
pub mod frontend;
pub mod remap;
pub mod sentinel;

pub use config::{Args, Preload};
pub use driver::{argv_prelude, Driver};
pub use error::{LoadError, SessionError};
pub use frontend::{FrontEnd, Outcome, PromptOptions};
