pub mod deployment;
pub mod error;
