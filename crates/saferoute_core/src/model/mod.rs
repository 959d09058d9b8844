//! Domain model for crowd-sourced incident reports and shelters.
//!
//! # Responsibility
//! - Define canonical data structures used by the verifier and listers.
//! - Own the coordinate/category validation rules shared by every write path.
//!
//! # Invariants
//! - A stored `Report` is `VERIFIED` iff its score reaches the threshold.
//! - Reports are immutable once stored; there is no update or delete model.

pub mod report;
pub mod shelter;
