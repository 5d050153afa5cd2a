mod common;
mod document;
mod method;
mod operation;
mod retry;
mod strategy;
mod verify;

pub use common::{AnyValue, Extensions};
pub use document::FailoverDocument;
pub use method::HttpMethod;
pub use operation::OperationSpec;
pub use retry::{JitterMode, RetrySpec};
pub use strategy::StrategySpec;
pub use verify::VerifySpec;
