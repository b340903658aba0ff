//! Configuration module for HTML rewriting
//!
//! This module provides the `RewriteConfig` struct and its type-safe builder
//! for configuring the rewrite pipeline with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, ConfigError, RewriteConfigBuilder, WithOutputDir};
pub use types::{RewriteConfig, RewriterKind};
