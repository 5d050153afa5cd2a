use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "failover", version, about = "Resilient multi-strategy operation runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

/// Diagnostics go to stderr so `--format json` output stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("FAILOVER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Validate { path, output } => cmd::validate::validate_cmd(&path, output).await,
        Command::Operations { path, output } => {
            cmd::operations::operations_cmd(path.as_deref(), output).await
        }
        Command::Plan {
            path,
            operation,
            vars,
            output,
            retry,
        } => cmd::plan::plan_cmd(path.as_deref(), operation.as_deref(), vars, output, retry).await,
        Command::Run {
            path,
            operation,
            vars,
            output,
            session,
            retry,
            events,
        } => cmd::run::run_cmd(&path, &operation, vars, output, session, retry, events).await,
        Command::Unassign {
            technician,
            location,
            output,
            session,
            retry,
            events,
        } => {
            cmd::unassign::unassign_cmd(&technician, &location, output, session, retry, events)
                .await
        }
    }
}
