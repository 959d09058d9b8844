//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into submit/list use cases.
//! - Keep API and CLI layers decoupled from storage details.

pub mod list_service;
pub mod verify_service;
