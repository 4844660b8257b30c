//! The interactive prompt.
//!
//! Every submission goes through the rewriter with one context that lives for
//! the whole session, so `import.meta` is declared at most once. Submissions
//! run in their own session on the shared context and have their completion
//! value echoed, the way a plain REPL would.

use std::future::Future;
use std::path::PathBuf;

use esmrepl_eval::{EvalEvent, Evaluator, Listener, SharedContext, Thrown};
use esmrepl_transform::{rewrite, TransformContext, TransformError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::SessionError;

const CONTINUATION_PROMPT: &str = "... ";

/// What became of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rendered completion value
    Value(String),
    Thrown(Thrown),
    /// The input ends mid-statement; more lines are needed.
    Incomplete,
    /// Waiting was abandoned. Anything the unit throws later is reported
    /// before the next prompt.
    Interrupted,
}

/// A submission that reached the runtime, or one that never needed to.
enum Submitted {
    Unit(String),
    Done(Outcome),
}

/// Settings for the prompt loop.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    pub prompt: String,
    pub history: Option<PathBuf>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            history: None,
        }
    }
}

pub struct FrontEnd<E> {
    evaluator: E,
    listener: Listener,
    /// Errors raised late by code that was preloaded in another session.
    background: Option<Listener>,
    context: SharedContext,
    transform: TransformContext,
    submissions: usize,
}

impl<E: Evaluator> FrontEnd<E> {
    pub fn new(
        evaluator: E,
        listener: Listener,
        context: SharedContext,
        transform: TransformContext,
    ) -> Self {
        Self {
            evaluator,
            listener,
            background: None,
            context,
            transform,
            submissions: 0,
        }
    }

    pub fn with_background(mut self, listener: Listener) -> Self {
        self.background = Some(listener);
        self
    }

    pub fn transform_context(&self) -> &TransformContext {
        &self.transform
    }

    /// Rewrite and evaluate `input`, waiting for its value or error.
    ///
    /// Rewrite failures come back as thrown `SyntaxError`s, not as `Err`.
    pub async fn submit(&mut self, input: &str) -> Result<Outcome, SessionError> {
        self.submit_until(input, std::future::pending()).await
    }

    /// Like `submit`, but stop waiting as soon as `interrupt` resolves.
    pub async fn submit_until(
        &mut self,
        input: &str,
        interrupt: impl Future<Output = ()>,
    ) -> Result<Outcome, SessionError> {
        let unit = match self.send(input).await? {
            Submitted::Unit(unit) => unit,
            Submitted::Done(outcome) => return Ok(outcome),
        };

        tokio::select! {
            outcome = self.wait(&unit) => outcome,
            () = interrupt => {
                tracing::debug!(unit = %unit, "stopped waiting for unit");
                Ok(Outcome::Interrupted)
            }
        }
    }

    async fn send(&mut self, input: &str) -> Result<Submitted, SessionError> {
        let code = match rewrite(input, &mut self.transform) {
            Ok(code) => code,
            Err(e) if e.is_incomplete() => return Ok(Submitted::Done(Outcome::Incomplete)),
            Err(e) => return Ok(Submitted::Done(Outcome::Thrown(rewrite_failure(e)))),
        };

        self.submissions += 1;
        let unit = format!("REPL{}", self.submissions);
        self.evaluator.eval(&code, &self.context, &unit).await?;
        Ok(Submitted::Unit(unit))
    }

    /// Wait for the outcome of `unit`. Cancel-safe: no event is lost when
    /// the future is dropped.
    async fn wait(&mut self, unit: &str) -> Result<Outcome, SessionError> {
        loop {
            let event = self
                .listener
                .recv()
                .await
                .ok_or(esmrepl_eval::Error::RuntimeExited)?;

            match event {
                EvalEvent::Completed { unit: done, value } if done == unit => {
                    return Ok(Outcome::Value(value));
                }
                EvalEvent::Thrown(thrown) if thrown.unit.as_deref() == Some(unit) => {
                    return Ok(Outcome::Thrown(thrown));
                }
                EvalEvent::Thrown(thrown) => report_thrown(&thrown),
                EvalEvent::Completed { unit: other, .. } => {
                    tracing::debug!(unit = %other, "stale completion");
                }
            }
        }
    }

    /// Print everything thrown since the last prompt without blocking.
    fn drain_pending(&mut self) {
        while let Ok(event) = self.listener.try_recv() {
            if let EvalEvent::Thrown(thrown) = event {
                report_thrown(&thrown);
            }
        }
        if let Some(background) = &mut self.background {
            while let Ok(event) = background.try_recv() {
                if let EvalEvent::Thrown(thrown) = event {
                    report_thrown(&thrown);
                }
            }
        }
    }

    /// Read, evaluate and print until `.exit` or end of input.
    pub async fn run(mut self, options: &PromptOptions) -> Result<(), SessionError> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &options.history {
            if let Err(e) = editor.load_history(path) {
                tracing::debug!(path = %path.display(), "no history loaded: {}", e);
            }
        }

        let mut buffer = String::new();
        loop {
            self.drain_pending();

            let prompt = if buffer.is_empty() {
                options.prompt.clone()
            } else {
                CONTINUATION_PROMPT.to_string()
            };
            let (returned, line) = tokio::task::spawn_blocking(move || {
                let line = editor.readline(&prompt);
                (editor, line)
            })
            .await?;
            editor = returned;

            match line {
                Ok(line) => {
                    if buffer.is_empty() && line.trim() == ".exit" {
                        break;
                    }
                    if buffer.is_empty() && line.trim().is_empty() {
                        continue;
                    }
                    buffer.push_str(&line);
                    buffer.push('\n');

                    let outcome = self.submit_until(&buffer, ctrl_c()).await?;
                    if outcome == Outcome::Incomplete {
                        continue;
                    }

                    let entry = buffer.trim_end().to_string();
                    buffer.clear();
                    remember(&mut editor, &entry, options.history.as_deref());

                    match outcome {
                        Outcome::Value(value) => println!("{}", value),
                        Outcome::Thrown(thrown) => report_thrown(&thrown),
                        Outcome::Interrupted => eprintln!("Interrupted"),
                        Outcome::Incomplete => {}
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    if buffer.is_empty() {
                        println!("(To exit, press Ctrl+D or type .exit)");
                    }
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

/// Resolves on Ctrl-C. Once this has been polled the signal no longer ends
/// the process. The runtime receives the same signal and breaks out of a
/// running script by itself.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn remember(editor: &mut DefaultEditor, entry: &str, history: Option<&std::path::Path>) {
    if let Err(e) = editor.add_history_entry(entry) {
        tracing::warn!("failed to record history entry: {}", e);
        return;
    }
    if let Some(path) = history {
        if let Err(e) = editor.append_history(path) {
            tracing::warn!(path = %path.display(), "failed to save history: {}", e);
        }
    }
}

fn report_thrown(thrown: &Thrown) {
    eprintln!("Uncaught {}", thrown.report());
}

/// Present a rewrite failure the same way as a runtime `SyntaxError`.
fn rewrite_failure(err: TransformError) -> Thrown {
    match err {
        TransformError::Syntax(e) => Thrown::error(
            None,
            format!("{} ({}:{})", e.message, e.line, e.column),
        )
        .with_name("SyntaxError"),
        other => Thrown::error(None, other.to_string()).with_name("SyntaxError"),
    }
}
