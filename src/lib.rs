pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod seed;

pub use application::{init_test_app, Application};
pub use config::Config;
pub use error::AppError;
