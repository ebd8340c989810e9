//! Agent Tools
//!
//! Tools the model may call while answering. The bot ships a single one,
//! `celestial_visibility`.

pub mod celestial_visibility;
pub mod error;
mod registry;
pub mod r#trait;

pub use celestial_visibility::CelestialVisibilityTool;
pub use error::{Result, ToolError};
pub use registry::ToolRegistry;
pub use r#trait::{Tool, ToolExecutionContext, ToolResult};
