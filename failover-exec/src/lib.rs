#![forbid(unsafe_code)]

//! Runtime for remote operations that can be reached through several call shapes.
//!
//! Strategies are tried in priority order; transient failures are retried with
//! backoff inside a strategy, "wrong endpoint" failures fall through to the next
//! one, and the caller gets exactly one terminal [`ExecutionResult`].

pub mod compile;
pub mod executor;
pub mod operations;
pub mod retry;
pub mod session;
pub mod strategy;

pub use crate::compile::{CompileError, CompiledOperation, CompiledStrategy, Compiler, MissingVariable};
pub use crate::executor::{ExecutionError, ExecutionResult, ExecutorConfig, ResilientExecutor};
pub use crate::operations::{OperationRunner, RunError};
pub use crate::session::SessionContext;
pub use crate::strategy::{Invoke, Strategy, StrategyError};
