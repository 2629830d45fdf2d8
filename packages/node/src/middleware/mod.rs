//! Per-route middleware, outermost first:
//!
//! 1. [`constraint`]: 404 for a path relationship outside the strict schema.
//! 2. [`params`]: URL/body reconciliation into the request extensions.
//! 3. [`strict`]: 400 for a body or path relationship outside the schema.

pub mod constraint;
pub mod params;
pub mod strict;
