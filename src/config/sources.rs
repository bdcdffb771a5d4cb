//! Configuration sources, in increasing precedence.

pub mod global_file;
pub mod config_dir;
pub mod env;
