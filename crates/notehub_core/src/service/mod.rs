//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the operations views invoke.
//! - Keep view/FFI layers decoupled from storage details and failures.

pub mod note_service;
