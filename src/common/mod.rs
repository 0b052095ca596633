mod constants;
mod errors;
mod file_operations;
mod logger;

pub use constants::*;
pub use errors::BenchError;
pub use file_operations::{atomic_save_json, read_json, FileOperationError};
#[cfg(test)]
pub use logger::init_test_logger;
pub use logger::get_logger;
