//! Tool registry and execution.

mod error;
mod executor;
mod tool;

pub use error::ToolError;
pub use executor::ToolExecutor;
pub use tool::{SharedTool, Tool, ToolContext, ToolDescriptor};
