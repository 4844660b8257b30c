//! Outcomes reported by the evaluation runtime.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

/// Something a session observed while evaluating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalEvent {
    /// A unit finished without throwing; `value` is its rendered completion value.
    Completed { unit: String, value: String },
    /// A value was thrown.
    Thrown(Thrown),
}

/// A thrown value, as far as the runtime could describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thrown {
    /// Unit being evaluated when it was thrown; None once that unit had
    /// already finished (e.g. a failing timer callback).
    pub unit: Option<String>,
    /// Whether the value is an `Error` object (as opposed to `throw 42`).
    pub is_error: bool,
    /// `Error.name`, for error objects
    pub name: Option<String>,
    /// Error message, or the rendered value for non-errors
    pub message: String,
    pub stack: Option<String>,
}

impl Thrown {
    /// An `Error` object thrown while `unit` was running.
    pub fn error(unit: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.map(str::to_string),
            is_error: true,
            name: Some("Error".to_string()),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// The stack when there is one, otherwise `Name: message`.
    pub fn report(&self) -> String {
        if let Some(stack) = &self.stack {
            return stack.clone();
        }
        match (&self.name, self.is_error) {
            (Some(name), true) => format!("{}: {}", name, self.message),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

/// Stream the runtime's program output was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// A chunk of program output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub stream: OutputStream,
    pub data: String,
}

/// A sink for program output, allowing redirection away from stdout.
pub type OutputSink = UnboundedSender<Output>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_prefers_stack() {
        let thrown = Thrown::error(Some("REPL1"), "boom")
            .with_stack("Error: boom\n    at REPL1:1:7");
        assert_eq!(thrown.report(), "Error: boom\n    at REPL1:1:7");
    }

    #[test]
    fn test_report_without_stack() {
        let thrown = Thrown::error(None, "x is not defined").with_name("ReferenceError");
        assert_eq!(thrown.report(), "ReferenceError: x is not defined");

        let value = Thrown {
            unit: None,
            is_error: false,
            name: None,
            message: "42".to_string(),
            stack: None,
        };
        assert_eq!(value.to_string(), "42");
    }
}
