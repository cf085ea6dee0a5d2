//! toolprovider - tool version resolution and provisioning library
//!
//! This library turns abstract tool declarations (`nodejs = "20:latest"`)
//! into concrete installed versions through a pluggable version manager:
//! - asdf (including classic bash asdf)
//! - mise
//!
//! The resolution engine in [`version`] is pure; [`provider`] wraps the
//! external binaries behind the [`provider::ToolProvider`] trait.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod provider;
pub mod version;
