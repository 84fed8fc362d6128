//! Schema data structures.
//!
//! This module provides the static model a bindable type is described by and
//! the tree the printer and reconciler work on:
//!
//! - [`types`] - type descriptors and shape classification
//! - [`value`] - encoded values held by schema leaves
//! - [`member`] - per-member descriptors of bindable types
//! - [`schema`] - targets and the schema tree built from them

/// Type descriptors and shape classification.
pub mod types;

/// Encoded values.
pub mod value;

/// Static member descriptors.
pub mod member;

/// Targets and schema trees.
pub mod schema;
