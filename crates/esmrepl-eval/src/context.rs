//! The namespace every unit is evaluated against.

use std::fmt;

/// Handle to the single persistent namespace shared by all sessions.
///
/// Everything a unit declares at top level stays visible to every later unit
/// evaluated against the same context, from any session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedContext {
    name: String,
}

impl SharedContext {
    /// The runtime's global object.
    pub fn global() -> Self {
        Self {
            name: "global".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for SharedContext {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Display for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
