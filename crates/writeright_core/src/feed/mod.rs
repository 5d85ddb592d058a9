//! In-process change feeds.
//!
//! # Responsibility
//! - Push the owner's full current goal list to registered observers after
//!   every goal mutation.
//!
//! # Invariants
//! - Observers only ever receive goals owned by the user they subscribed for.
//! - Delivery is synchronous, on the mutating caller's thread.

pub mod goal_feed;
