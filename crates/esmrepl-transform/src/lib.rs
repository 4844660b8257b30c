/// ES module to REPL rewriter
///
/// Turns static `import`/`export` declarations and `import.meta` references
/// into statements that a script-style evaluation session accepts, so module
/// sources can be loaded one after another into a single shared namespace.

pub mod context;
pub mod error;
pub mod imports;
pub mod parser;
pub mod rewrite;
mod splice;

pub use context::{ContextId, TransformContext};
pub use error::{Result, SyntaxError, TransformError, PLACEHOLDER_FILE_NAME};
pub use imports::ImportBindings;
pub use rewrite::rewrite;
