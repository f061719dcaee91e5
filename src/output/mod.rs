//! Output module: JSON result files and console rendering

pub mod formatter;
pub mod writer;
