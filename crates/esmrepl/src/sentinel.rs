//! Completion signalling for loaded units.
//!
//! The runtime cannot say when a unit with top-level `await` has been fully
//! processed, so every unit ends by throwing a marker error. Seeing exactly
//! that marker on the listener means the whole unit ran; anything else thrown
//! first is a real failure.

use esmrepl_eval::Thrown;
use esmrepl_transform::ContextId;

/// Source name the runtime reports in stack frames for a unit.
pub fn unit_name(id: &ContextId) -> String {
    format!("REPL_{}", id)
}

/// Single-use marker compared by message, never by error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    message: String,
}

impl Sentinel {
    pub fn for_context(id: &ContextId) -> Self {
        Self {
            message: format!("success_{}", id),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Statement appended as the last line of the unit.
    pub fn throw_statement(&self) -> String {
        let message = serde_json::Value::String(self.message.clone());
        format!("throw new Error({});", message)
    }

    /// Whether `thrown` is this marker and not a user error.
    pub fn matches(&self, thrown: &Thrown) -> bool {
        thrown.is_error && thrown.message == self.message
    }
}

/// Build a unit: one prelude line, the rewritten body, then the marker.
///
/// The prelude always takes exactly one line, so body line N is unit line N + 1.
pub fn assemble_unit(prelude: &str, body: &str, sentinel: &Sentinel) -> String {
    format!("{}\n{}\n{}", prelude, body, sentinel.throw_statement())
}
