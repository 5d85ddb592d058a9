//! Domain model for writing goals and their owners.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep invariant checks next to the data they protect.
//!
//! # Invariants
//! - Every goal is identified by a stable `GoalId` and owned by one `UserId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod account;
pub mod goal;
