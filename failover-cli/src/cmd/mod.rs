pub mod config;
pub mod operations;
pub mod plan;
pub mod run;
pub mod unassign;
pub mod validate;
