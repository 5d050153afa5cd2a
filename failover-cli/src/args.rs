use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct VarsArgs {
    /// JSON or YAML object of template variables.
    #[arg(long)]
    pub vars: Option<PathBuf>,
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set_vars: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SessionArgs {
    #[arg(long, env = "FAILOVER_BASE_URL")]
    pub base_url: Option<String>,
    /// Environment variable holding the bearer token.
    #[arg(long, default_value = "FAILOVER_TOKEN")]
    pub token_env: String,
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long = "header", value_name = "NAME=VALUE")]
    pub headers: Vec<String>,
    #[arg(long, default_value_t = 30000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    #[arg(long, alias = "max-retries-per-strategy")]
    pub max_attempts: Option<usize>,
    #[arg(long)]
    pub base_delay: Option<u64>,
    #[arg(long)]
    pub max_delay: Option<u64>,
    #[arg(long)]
    pub jitter: Option<String>,
    /// Replaces the default non-retryable set (400,404,405).
    #[arg(long, value_delimiter = ',', value_name = "STATUS")]
    pub non_retryable: Vec<u16>,
    #[arg(long)]
    pub deadline: Option<u64>,
    #[arg(long)]
    pub attempt_timeout: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct EventsArgs {
    /// none, stdout (JSON lines; stderr under `--format json`) or tracing.
    #[arg(long, default_value = "tracing")]
    pub events: String,
    #[arg(long)]
    pub webhook_url: Option<String>,
    /// Include attempt/fallback counters in the result.
    #[arg(long)]
    pub metrics: bool,
}
