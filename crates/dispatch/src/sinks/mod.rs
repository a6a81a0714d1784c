//! Consumer implementations of [`contracts::BatchHandler`]

mod console;
mod file;

pub use console::ConsoleSink;
pub use file::FileSink;
