use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check an operation document without running it.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List operations; the built-in ones when no document is given.
    Operations {
        path: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show strategy order and retry schedule without calling anything.
    Plan {
        path: Option<PathBuf>,
        #[arg(long)]
        operation: Option<String>,
        #[command(flatten)]
        vars: VarsArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        retry: RetryArgs,
    },
    /// Execute one operation from a document against a live service.
    Run {
        path: PathBuf,
        /// `operationId` to execute.
        operation: String,
        #[command(flatten)]
        vars: VarsArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        session: SessionArgs,
        #[command(flatten)]
        retry: RetryArgs,
        #[command(flatten)]
        events: EventsArgs,
    },
    /// Remove a technician's assignment to a location.
    Unassign {
        #[arg(long, value_name = "ID")]
        technician: String,
        #[arg(long, value_name = "ID")]
        location: String,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        session: SessionArgs,
        #[command(flatten)]
        retry: RetryArgs,
        #[command(flatten)]
        events: EventsArgs,
    },
}
