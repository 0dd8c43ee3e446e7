//! Domain types shared by config, infra and use cases.

pub mod environment;

pub use environment::{DatabaseState, Environment};
