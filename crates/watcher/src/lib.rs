//! Event intake for Tally
//!
//! This crate provides:
//! - The `EventSource` seam and the `Subscription` handle it returns
//! - Debouncing of the raw notification feed into render requests

pub mod debounce;
pub mod source;

pub use debounce::{DebounceState, Debouncer, Trigger};
pub use source::{EventSource, Subscription, SubscriptionFeed};
