//! Embedded Node.js bridge script.

/// Source of the bridge the runtime process executes.
pub fn bridge_code() -> &'static str {
    include_str!("bridge.js")
}
