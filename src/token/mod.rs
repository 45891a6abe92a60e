//! Mint inspection
//!
//! - `classifier`: fetch the mint account and classify its owning program
//! - `extensions`: Token-2022 extension block
//! - `metadata`: metadata side-record PDA and binary layout
//! - `cache`: owner lookup cache used by the verifier

mod cache;
mod classifier;
mod extensions;
mod metadata;

pub use cache::*;
pub use classifier::*;
pub use extensions::*;
pub use metadata::*;
