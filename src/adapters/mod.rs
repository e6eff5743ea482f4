//! External-facing implementations: file-backed data and the CLI surface.

pub mod cli;
pub mod file_data;

pub use file_data::FileCandleProvider;
