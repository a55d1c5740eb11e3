//! Verdict Types
//!
//! This crate defines the value model shared by the Verdict crates. Every fact held in a
//! fact store is a [`FactValue`]; the engine itself treats values as opaque and only the
//! rules written against them look inside.

#![warn(missing_docs)]

mod types;
pub use types::FactValue;
