//! Evaluation runtime for REPL-rewritten module code.
//!
//! Code is evaluated in named sessions that all share one persistent global
//! namespace. Submitting a unit never reports its outcome directly: every
//! completion value and thrown value is delivered on the session's listener,
//! independently of when (or whether) the runtime considers the unit done.

mod bridge;
mod context;
mod error;
mod evaluator;
mod event;
mod node;
mod protocol;

pub use bridge::bridge_code;
pub use context::SharedContext;
pub use error::Error;
pub use evaluator::{EventSink, Evaluator, Listener};
pub use event::{EvalEvent, Output, OutputSink, OutputStream, Thrown};
pub use node::{NodeConfig, NodeRuntime, NodeSession};

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
