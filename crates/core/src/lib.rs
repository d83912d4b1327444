//! Core types for Tally
//!
//! This crate provides:
//! - The change notification model (Docker events wire format)
//! - Debounce policy and runtime configuration
//! - The error taxonomy shared by every stage
//! - The `Inventory` trait used by templates to query live resources

pub mod config;
pub mod error;
pub mod event;
pub mod inventory;

// Re-exports
pub use config::{example_config, Config, DebounceConfig, DebouncePolicy};
pub use error::{Result, TallyError};
pub use event::{Actor, Notification};
pub use inventory::{Inventory, ResourceKind};
