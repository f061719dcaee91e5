//! Bench matcher library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod output;
pub mod pipeline;

pub use error::{Result, BenchMatcherError};
pub use config::Config;
