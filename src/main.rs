// src/main.rs

use vcsrun::{VcsrunError, cli, logging, run};

/// Conventional exit status for a process ended by SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if let Some(VcsrunError::Cancelled) = err.downcast_ref::<VcsrunError>() {
                std::process::exit(EXIT_INTERRUPTED);
            }
            eprintln!("vcsrun error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
