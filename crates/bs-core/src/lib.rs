//! Core types, configuration, and errors for better-search.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Entry`] - a discovered filesystem object (name + absolute path)
//! - [`SearchQuery`], [`MatchMode`], [`Category`] - query description
//! - [`Config`] and its sections ([`IndexConfig`], [`SearchConfig`])
//! - [`ConfigError`] for configuration failures
//! - The `FxHashMap` alias used for the filename index

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{Config, IndexConfig, SearchConfig};
pub use error::ConfigError;
pub use hash::FxHashMap;
pub use types::{Category, Entry, MatchMode, SearchQuery};
