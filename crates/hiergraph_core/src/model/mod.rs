//! Domain model shared by every build stage.
//!
//! # Responsibility
//! - Define hierarchy fields, directions and the flat field table.
//! - Define document entries, raw metadata values and normalized records.

pub mod document;
pub mod hierarchy;
