#![forbid(unsafe_code)]
//! Hashing and filesystem helpers shared by the javelin crates.

pub mod error;
pub mod fs;
pub mod hash;
