//! Library components of the `patmine` command line tool.

pub mod config;
pub mod logging;
