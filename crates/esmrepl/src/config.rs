//! Command line configuration.

use std::path::{Path, PathBuf};

use clap::Parser;

/// Preload ES module files into a REPL, then keep evaluating module syntax.
#[derive(Parser, Debug, Clone)]
#[command(name = "esmrepl", version, about)]
pub struct Args {
    /// Run the first FILE as a program, passing the remaining values as its arguments
    #[arg(long)]
    pub native: bool,

    /// Node.js executable used to evaluate code
    #[arg(long, env = "ESMREPL_NODE", default_value = "node", value_name = "PATH")]
    pub node: PathBuf,

    /// History file for the interactive prompt, kept in the line editor's own
    /// format (empty disables history)
    #[arg(long, env = "ESMREPL_HISTORY", value_name = "PATH")]
    pub history: Option<String>,

    /// Prompt shown for new input
    #[arg(long, default_value = "> ")]
    pub prompt: String,

    /// Files to preload, in order
    #[arg(value_name = "FILE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub files: Vec<String>,
}

/// What to load before the interactive prompt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preload {
    Files(Vec<PathBuf>),
    Program { program: PathBuf, args: Vec<String> },
}

impl Args {
    pub fn preload(&self) -> Result<Preload, String> {
        if !self.native {
            return Ok(Preload::Files(self.files.iter().map(PathBuf::from).collect()));
        }
        match self.files.split_first() {
            Some((program, args)) => Ok(Preload::Program {
                program: PathBuf::from(program),
                args: args.to_vec(),
            }),
            None => Err("--native requires a program file".to_string()),
        }
    }

    pub fn history_path(&self) -> Option<&Path> {
        self.history
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(Path::new)
    }
}
