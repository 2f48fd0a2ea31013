//! This file is the root of the `spikepack` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`stream`, `kernels`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types most callers need, so that
//!     `use spikepack::{StreamEncoder, StreamDecoder, CodecConfig}` is enough.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One 16-bit mono PCM sample, stored unsigned.
pub type Sample = u16;

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod kernels;
pub mod stream;
pub mod utils;

//==================================================================================
// 2. Re-exports
//==================================================================================
pub use cache::FrequencyCache;
pub use config::CodecConfig;
pub use error::{Result, SpikepackError};
pub use stream::{DecoderStats, EncoderStats, StreamDecoder, StreamEncoder};
