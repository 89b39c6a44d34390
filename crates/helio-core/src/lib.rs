//! Helio Core
//!
//! This crate contains the foundation utilities shared by the Helio chart
//! engine crates: logical/physical geometry primitives, logging setup, and
//! profiling macros.

pub mod geometry;
pub mod logging;
pub mod profiling;
