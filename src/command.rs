//! Device commands whose success is defined by the state the printer ends up in.

pub mod print;
pub mod retry;

pub use print::PrintCommands;
pub use retry::{CommandRetryExecutor, RetryPolicy, StateReached};
