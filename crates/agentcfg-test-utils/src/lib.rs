//! Shared test utilities for the agentcfg workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`] - ready-made agent, model and tool definitions and
//!   document sets built from them
//! - [`dir`] - [`TestConfigDir`] builder for on-disk configuration layouts

pub mod dir;
pub mod fixtures;

pub use dir::TestConfigDir;
