/// Prints what a module source looks like after REPL rewriting

use std::path::PathBuf;
use std::process;

use anyhow::Context as _;
use clap::Parser;
use esmrepl_transform::{rewrite, TransformContext};

#[derive(Parser, Debug)]
#[command(name = "esm-rewrite")]
#[command(about = "Show the REPL-evaluable form of an ES module source")]
#[command(version)]
struct Args {
    /// Module source file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print the context id and metadata url after the rewritten text
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let path = std::path::absolute(&args.input)
        .with_context(|| format!("cannot resolve {}", args.input.display()))?;
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let mut ctx = TransformContext::for_file(&path);
    let output = rewrite(&source, &mut ctx)
        .map_err(|e| e.with_file(args.input.display().to_string()))?;

    println!("{}", output);

    if args.verbose {
        eprintln!("context id: {}", ctx.id());
        eprintln!("module url: {}", ctx.module_url());
        eprintln!("import.meta referenced: {}", ctx.meta_referenced());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{:#}", e);
        process::exit(1);
    }
}
