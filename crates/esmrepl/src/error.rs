//! Errors surfaced by the preload driver and the interactive front end.

use std::io;

use esmrepl_transform::TransformError;
use thiserror::Error;

/// Why a preloaded file stopped the session.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot resolve {path}: {source}")]
    Resolution {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Syntax(TransformError),

    /// Runtime failure whose stack points into the file.
    #[error("{stack}")]
    Attributed {
        path: String,
        line: usize,
        column: usize,
        stack: String,
    },

    /// Runtime failure with no frame in the file (e.g. thrown by a dependency).
    #[error("{}", unattributed(.message, .stack.as_deref()))]
    Unattributed {
        message: String,
        stack: Option<String>,
    },

    #[error(transparent)]
    Runtime(#[from] esmrepl_eval::Error),
}

fn unattributed(message: &str, stack: Option<&str>) -> String {
    match stack {
        Some(stack) if !stack.is_empty() => format!("{}\n{}", message, stack),
        _ => message.to_string(),
    }
}

/// Fatal errors of the interactive session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Runtime(#[from] esmrepl_eval::Error),

    #[error("line editor: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("input task failed: {0}")]
    Input(#[from] tokio::task::JoinError),
}
