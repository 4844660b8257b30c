//! Node.js-backed evaluation runtime.
//!
//! ## Process layout
//!
//! One `node` child process runs the embedded bridge script. Requests are
//! written to its stdin, one JSON object per line; a reader task parses its
//! stdout and routes each message:
//!
//! 1. `thrown` / `completed` go to the listener of the session they name
//! 2. `output` is forwarded to the output sink (or this process's stdout)
//! 3. `ready` completes startup
//!
//! When the child exits, every listener is closed.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::bridge::bridge_code;
use crate::context::SharedContext;
use crate::error::Error;
use crate::evaluator::{EventSink, Evaluator, Listener};
use crate::event::{Output, OutputSink, OutputStream};
use crate::protocol::{Message, Request, Routed};

/// How to start the runtime process.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Node.js executable
    pub program: PathBuf,
    /// Working directory of the runtime (defaults to ours)
    pub working_dir: Option<PathBuf>,
    /// Optional sink for program output. If None, output goes to stdout/stderr.
    pub output: Option<OutputSink>,
}

impl NodeConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            output: None,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn output_sink(mut self, sink: OutputSink) -> Self {
        self.output = Some(sink);
        self
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new("node")
    }
}

type Routes = Arc<Mutex<HashMap<String, EventSink>>>;

/// A running Node.js process evaluating units for any number of sessions.
pub struct NodeRuntime {
    child: Child,
    stdin: Arc<Mutex<ChildStdin>>,
    routes: Routes,
    reader: JoinHandle<()>,
    version: Option<String>,
}

impl NodeRuntime {
    /// Start the runtime and wait until the bridge is ready.
    pub async fn spawn(config: &NodeConfig) -> crate::Result<Self> {
        let mut command = Command::new(&config.program);
        command
            .arg("-e")
            .arg(bridge_code())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &config.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: config.program.display().to_string(),
            source,
        })?;
        let stdin = child.stdin.take().ok_or(Error::RuntimeExited)?;
        let stdout = child.stdout.take().ok_or(Error::RuntimeExited)?;

        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let (ready_tx, ready_rx) = oneshot::channel();
        let reader = tokio::spawn(route_messages(
            stdout,
            Arc::clone(&routes),
            config.output.clone(),
            ready_tx,
        ));

        let version = ready_rx.await.map_err(|_| Error::RuntimeExited)?;
        tracing::info!(program = %config.program.display(), ?version, "evaluation runtime ready");

        Ok(Self {
            child,
            stdin: Arc::new(Mutex::new(stdin)),
            routes,
            reader,
            version,
        })
    }

    /// Process id of the runtime, while it is running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Runtime version reported by the bridge.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Open (or reopen) a named session.
    ///
    /// Every session evaluates against the same global namespace; sessions
    /// only differ in where their events are delivered.
    pub async fn open_session(&self, name: &str) -> (NodeSession, Listener) {
        let (tx, rx) = unbounded_channel();
        self.routes.lock().await.insert(name.to_string(), tx);

        let session = NodeSession {
            name: name.to_string(),
            stdin: Arc::clone(&self.stdin),
        };
        (session, rx)
    }

    /// Stop the runtime process.
    pub async fn shutdown(mut self) -> crate::Result<()> {
        self.routes.lock().await.clear();
        if self.child.id().is_some() {
            self.child.kill().await?;
        }
        self.reader.abort();
        Ok(())
    }
}

/// A session's handle for submitting units.
#[derive(Clone)]
pub struct NodeSession {
    name: String,
    stdin: Arc<Mutex<ChildStdin>>,
}

impl NodeSession {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Evaluator for NodeSession {
    async fn eval(&mut self, code: &str, context: &SharedContext, unit: &str) -> crate::Result<()> {
        let request = Request::Eval {
            session: &self.name,
            context: context.name(),
            unit,
            code,
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        tracing::debug!(session = %self.name, unit, bytes = code.len(), "submitting unit");

        let mut stdin = self.stdin.lock().await;
        stdin.write_all(line.as_bytes()).await.map_err(closed_pipe)?;
        stdin.flush().await.map_err(closed_pipe)?;
        Ok(())
    }
}

/// A broken pipe means the runtime is gone.
fn closed_pipe(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::BrokenPipe {
        Error::RuntimeExited
    } else {
        Error::Io(e)
    }
}

/// Read bridge messages until the process closes its stdout.
async fn route_messages(
    stdout: ChildStdout,
    routes: Routes,
    output: Option<OutputSink>,
    ready: oneshot::Sender<Option<String>>,
) {
    let mut ready = Some(ready);
    let mut lines = BufReader::new(stdout).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read from evaluation runtime");
                break;
            }
        };

        let message = match serde_json::from_str::<Message>(&line) {
            Ok(message) => message,
            Err(e) => {
                // Something wrote past the bridge; show it rather than lose it.
                tracing::debug!(error = %e, "unframed runtime output");
                emit(
                    output.as_ref(),
                    Output {
                        stream: OutputStream::Stdout,
                        data: format!("{}\n", line),
                    },
                );
                continue;
            }
        };

        match message.route() {
            Routed::Ready(version) => {
                if let Some(ready) = ready.take() {
                    let _ = ready.send(version);
                }
            }
            Routed::Output(chunk) => emit(output.as_ref(), chunk),
            Routed::Session(session, event) => {
                let routes = routes.lock().await;
                let sink = session.as_deref().and_then(|name| routes.get(name));
                match sink {
                    Some(sink) => {
                        if sink.send(event).is_err() {
                            tracing::warn!(?session, "session listener closed, dropping event");
                        }
                    }
                    None => tracing::warn!(?session, ?event, "event for unknown session"),
                }
            }
        }
    }

    tracing::info!("evaluation runtime closed its output");
    routes.lock().await.clear();
}

/// Send output to the sink, or write it straight through.
fn emit(sink: Option<&OutputSink>, chunk: Output) {
    if let Some(sink) = sink {
        // Ignore errors - if the sink is gone, nobody is listening
        let _ = sink.send(chunk);
        return;
    }
    let result = match chunk.stream {
        OutputStream::Stdout => {
            let mut out = std::io::stdout().lock();
            out.write_all(chunk.data.as_bytes()).and_then(|_| out.flush())
        }
        OutputStream::Stderr => {
            let mut err = std::io::stderr().lock();
            err.write_all(chunk.data.as_bytes()).and_then(|_| err.flush())
        }
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to write program output");
    }
}
