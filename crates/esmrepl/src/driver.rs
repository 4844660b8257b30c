//! Preloading files into the shared context.
//!
//! Each file becomes one unit: a one-line prelude, the rewritten module body,
//! and a trailing sentinel throw. Files load strictly in order; the next file
//! is only submitted after the previous sentinel has been observed.

use std::path::{Path, PathBuf};

use esmrepl_eval::{EvalEvent, Evaluator, Listener, SharedContext, Thrown};
use esmrepl_transform::{rewrite, ContextId, TransformContext};

use crate::error::LoadError;
use crate::remap::remap_stack;
use crate::sentinel::{assemble_unit, unit_name, Sentinel};

/// Prelude making a preloaded program see `[runtime, program, args...]` as its argv.
pub fn argv_prelude(program: &str, args: &[String]) -> String {
    let argv: Vec<serde_json::Value> = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(|arg| serde_json::Value::String(arg.to_string()))
        .collect();
    format!(
        "process.argv = [process.argv[0]].concat({});",
        serde_json::Value::Array(argv)
    )
}

/// Loads files, one at a time, through a hidden session.
pub struct Driver<E> {
    evaluator: E,
    listener: Listener,
    context: SharedContext,
    /// Context of the most recently loaded file, or of the working directory.
    current: TransformContext,
}

impl<E: Evaluator> Driver<E> {
    pub fn new(
        evaluator: E,
        listener: Listener,
        context: SharedContext,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            evaluator,
            listener,
            context,
            current: TransformContext::for_directory(working_dir),
        }
    }

    pub fn current(&self) -> &TransformContext {
        &self.current
    }

    /// Hand over the current context and the hidden session's listener.
    ///
    /// The listener keeps receiving errors thrown late by preloaded code.
    pub fn into_parts(self) -> (TransformContext, Listener) {
        (self.current, self.listener)
    }

    /// Load `files` in order, stopping at the first failure.
    pub async fn load_all(&mut self, files: &[PathBuf]) -> Result<(), LoadError> {
        for file in files {
            self.load_file(file, "").await?;
        }
        Ok(())
    }

    /// Load one file, with `prelude` (a single line) evaluated right before it.
    ///
    /// Errors are reported against `path` exactly as given.
    pub async fn load_file(&mut self, path: &Path, prelude: &str) -> Result<(), LoadError> {
        let display = path.display().to_string();
        let resolved = std::path::absolute(path).map_err(|source| LoadError::Resolution {
            path: display.clone(),
            source,
        })?;

        let source = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|source| LoadError::Io {
                path: display.clone(),
                source,
            })?;

        let mut ctx = TransformContext::for_file(resolved);
        let body = rewrite(&source, &mut ctx).map_err(|e| LoadError::Syntax(e.with_file(&display)))?;

        let sentinel = Sentinel::for_context(ctx.id());
        let unit = unit_name(ctx.id());
        let code = assemble_unit(prelude, &body, &sentinel);
        let file = &display;
        tracing::debug!(file = %file, unit = %unit, "loading file");

        self.current = ctx;
        self.run_unit(&code, &unit, &sentinel, &display).await
    }

    /// Define `__dirname` and `__filename` from the current context, unless
    /// preloaded code already set them.
    pub async fn seed_location_globals(&mut self) -> Result<(), LoadError> {
        let directory = serde_json::Value::String(self.current.directory().display().to_string());
        let filename = self
            .current
            .file()
            .map(|file| serde_json::Value::String(file.display().to_string()).to_string())
            .unwrap_or_else(|| "undefined".to_string());
        let body = format!(
            "if (typeof __dirname === \"undefined\") {{ globalThis.__dirname = {}; }}\n\
             if (typeof __filename === \"undefined\") {{ globalThis.__filename = {}; }}",
            directory, filename,
        );

        let id = ContextId::fresh();
        let sentinel = Sentinel::for_context(&id);
        let unit = unit_name(&id);
        let code = assemble_unit("", &body, &sentinel);
        self.run_unit(&code, &unit, &sentinel, "<location globals>").await
    }

    /// Submit a unit and wait until its sentinel, or something else, is thrown.
    async fn run_unit(
        &mut self,
        code: &str,
        unit: &str,
        sentinel: &Sentinel,
        origin: &str,
    ) -> Result<(), LoadError> {
        self.evaluator.eval(code, &self.context, unit).await?;

        loop {
            let event = self
                .listener
                .recv()
                .await
                .ok_or(LoadError::Runtime(esmrepl_eval::Error::RuntimeExited))?;

            match event {
                EvalEvent::Completed { unit: completed, .. } => {
                    // Preloading is silent; completion values are not shown.
                    tracing::trace!(unit = %completed, "ignoring completion value");
                }
                EvalEvent::Thrown(thrown) if sentinel.matches(&thrown) => {
                    tracing::debug!(unit, "unit finished");
                    return Ok(());
                }
                EvalEvent::Thrown(thrown) => return Err(attribute(thrown, unit, origin)),
            }
        }
    }
}

/// Turn a runtime failure into a load error pointing at the file when possible.
fn attribute(thrown: Thrown, unit: &str, path: &str) -> LoadError {
    let remapped = thrown
        .stack
        .as_deref()
        .and_then(|stack| remap_stack(stack, unit, path));

    match remapped {
        Some(remapped) => LoadError::Attributed {
            path: path.to_string(),
            line: remapped.line,
            column: remapped.column,
            stack: remapped.stack,
        },
        None => LoadError::Unattributed {
            message: thrown.message,
            stack: thrown.stack,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_prelude() {
        let prelude = argv_prelude("prog.js", &["--flag".to_string(), "a \"b\"".to_string()]);
        assert_eq!(
            prelude,
            r#"process.argv = [process.argv[0]].concat(["prog.js","--flag","a \"b\""]);"#
        );
        assert!(!prelude.contains('\n'));
    }

    #[test]
    fn test_attribute_without_unit_frame() {
        let thrown = Thrown::error(Some("REPL_x"), "boom")
            .with_stack("Error: boom\n    at helper (/lib/dep.js:4:9)");
        match attribute(thrown, "REPL_x", "a.js") {
            LoadError::Unattributed { message, stack } => {
                assert_eq!(message, "boom");
                assert!(stack.is_some());
            }
            other => panic!("expected unattributed error, got {other:?}"),
        }
    }

    #[test]
    fn test_attribute_non_error_value() {
        let mut thrown = Thrown::error(Some("REPL_x"), "42");
        thrown.is_error = false;
        thrown.name = None;
        assert_eq!(attribute(thrown, "REPL_x", "a.js").to_string(), "42");
    }
}
