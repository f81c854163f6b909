//! Process-wide logging setup shared by every binary in the workspace.

pub mod tracing;

pub use self::tracing::{LogFormat, init, init_with};
