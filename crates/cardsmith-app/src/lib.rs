//! Cardsmith Application
//!
//! Command-line shell that wires the editor to the filesystem, the terminal
//! and the CPU renderer.

mod app;
mod file_ops;
mod terminal;

pub use app::{App, AppConfig, AppError};
pub use file_ops::{DirectoryAssetLoader, FileSink, load_fonts};
pub use terminal::{LogSoundPlayer, TerminalPrompt};
