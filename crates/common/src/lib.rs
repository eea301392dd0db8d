//! Common types, wire bodies, and errors shared across `sot` crates.

pub mod error;
pub mod outcome;
pub mod protocol;

pub use error::SotError;
pub use outcome::Outcome;
