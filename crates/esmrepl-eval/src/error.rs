//! Errors raised while talking to the evaluation runtime.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error talking to the evaluation runtime: {0}")]
    Io(#[from] io::Error),

    #[error("malformed runtime message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("evaluation runtime exited")]
    RuntimeExited,
}
