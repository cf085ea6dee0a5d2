//! Core domain models for toolprovider
//!
//! This module contains the fundamental types used throughout the application:
//! - Tool requests and resolution strategies
//! - Tool name aliases and vetted plugin sources
//! - Install results and environment activations

mod install;
mod request;
mod tool;

pub use install::{EnvironmentActivation, ToolInstallResult};
pub use request::{ResolutionStrategy, ToolRequest};
pub use tool::{canonical_tool_name, ToolPlugin};
