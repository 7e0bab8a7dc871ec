//! CLI command implementations.

pub mod common;
pub mod experiment;
pub mod scaling;
pub mod solve;
pub mod version;
