pub(crate) mod document;
pub(crate) mod operation;
pub(crate) mod retry;
pub(crate) mod strategy;
