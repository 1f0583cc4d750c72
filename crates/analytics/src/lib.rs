//! # TrendLens Analytics Engine
//!
//! This crate turns raw per-symbol closing prices into the aligned price table,
//! normalized trends, daily returns and the return correlation matrix.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every function takes immutable inputs and returns a fresh
//!   result, so the same frozen input always produces bit-identical output.
//!
//! ## Public API
//!
//! - `align`: outer-join on date with forward-then-backward fill.
//! - `AnalyticsEngine`: normalization, returns and correlation.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod align;
pub mod engine;
pub mod error;

// Re-export the key components to create a clean, public-facing API.
pub use align::{align, Alignment};
pub use engine::{pearson, AnalyticsEngine};
pub use error::AnalyticsError;
