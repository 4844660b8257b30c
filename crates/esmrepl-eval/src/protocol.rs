//! Wire format between the host and the bridge: one JSON object per line.

use serde::{Deserialize, Serialize};

use crate::event::{EvalEvent, Output, OutputStream, Thrown};

/// Host to bridge.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Request<'a> {
    Eval {
        session: &'a str,
        context: &'a str,
        unit: &'a str,
        code: &'a str,
    },
}

/// Bridge to host.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Message {
    Ready {
        #[serde(default)]
        version: Option<String>,
    },
    Completed {
        session: String,
        unit: String,
        value: String,
    },
    Thrown {
        session: Option<String>,
        unit: Option<String>,
        is_error: bool,
        name: Option<String>,
        message: String,
        stack: Option<String>,
    },
    Output {
        stream: WireStream,
        data: String,
    },
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WireStream {
    Stdout,
    Stderr,
}

/// Where a decoded message should go.
#[derive(Debug, PartialEq)]
pub(crate) enum Routed {
    Ready(Option<String>),
    Session(Option<String>, EvalEvent),
    Output(Output),
}

impl Message {
    pub fn route(self) -> Routed {
        match self {
            Message::Ready { version } => Routed::Ready(version),
            Message::Completed {
                session,
                unit,
                value,
            } => Routed::Session(Some(session), EvalEvent::Completed { unit, value }),
            Message::Thrown {
                session,
                unit,
                is_error,
                name,
                message,
                stack,
            } => Routed::Session(
                session,
                EvalEvent::Thrown(Thrown {
                    unit,
                    is_error,
                    name,
                    message,
                    stack,
                }),
            ),
            Message::Output { stream, data } => Routed::Output(Output {
                stream: match stream {
                    WireStream::Stdout => OutputStream::Stdout,
                    WireStream::Stderr => OutputStream::Stderr,
                },
                data,
            }),
        }
    }
}
