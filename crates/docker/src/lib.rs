//! Docker Engine integration for Tally
//!
//! This crate provides:
//! - Daemon connection setup from the Docker CLI environment (bollard)
//! - The live event subscription (`DockerEvents`)
//! - Inventory list/inspect calls used by templates (`DockerInventory`)

pub mod client;
pub mod events;
pub mod inventory;

pub use client::{connect, Transport};
pub use events::DockerEvents;
pub use inventory::DockerInventory;
