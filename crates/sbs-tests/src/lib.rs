//! Integration test crate for SBS Studio.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple sbs crates to verify they work together.

#[cfg(test)]
mod pipeline;

#[cfg(test)]
mod session;
