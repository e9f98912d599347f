pub mod check;
pub mod error;
pub mod inventory;
pub mod model;
pub mod report;
pub mod source;

pub use error::{Result, ToolError};
