use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use esmrepl::{argv_prelude, Args, Driver, FrontEnd, LoadError, Preload, PromptOptions};
use esmrepl_eval::{NodeConfig, NodeRuntime, NodeSession, SharedContext};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let preload = match args.preload() {
        Ok(preload) => preload,
        Err(message) => Args::command()
            .error(clap::error::ErrorKind::MissingRequiredArgument, message)
            .exit(),
    };

    let working_dir = std::env::current_dir()?;
    let runtime = NodeRuntime::spawn(&NodeConfig::new(&args.node).working_dir(&working_dir)).await?;
    tracing::debug!(version = ?runtime.version(), "runtime ready");

    let context = SharedContext::global();
    let (hidden, listener) = runtime.open_session("preload").await;
    let mut driver = Driver::new(hidden, listener, context.clone(), working_dir);

    if let Err(e) = preload_all(&mut driver, &preload).await {
        eprintln!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    let (transform, background) = driver.into_parts();
    let (visible, listener) = runtime.open_session("interactive").await;
    let options = PromptOptions {
        prompt: args.prompt.clone(),
        history: args.history_path().map(|path| path.to_path_buf()),
    };
    FrontEnd::new(visible, listener, context, transform)
        .with_background(background)
        .run(&options)
        .await?;

    runtime.shutdown().await?;
    Ok(ExitCode::SUCCESS)
}

async fn preload_all(driver: &mut Driver<NodeSession>, preload: &Preload) -> Result<(), LoadError> {
    match preload {
        Preload::Files(files) => driver.load_all(files).await?,
        Preload::Program { program, args } => {
            let prelude = argv_prelude(&program.display().to_string(), args);
            driver.load_file(program, &prelude).await?;
        }
    }
    driver.seed_location_globals().await
}
