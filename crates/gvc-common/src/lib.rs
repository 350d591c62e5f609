//! Common types and utilities for the gvc resolver.
//!
//! This crate provides foundational types used across all gvc crates:
//! - Source spans (`Span`)
//! - Diagnostic records, codes and message templates
//! - Resolver limits and thresholds

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostics produced by the resolver
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, diagnostic_codes,
    diagnostic_messages, format_message,
};

// Centralized limits and thresholds
pub mod limits;

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod diagnostics_tests;
