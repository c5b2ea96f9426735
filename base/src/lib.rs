//! The `base` crate defines the Elliott 900-series things which are
//! useful in both an emulator and other associated tools.  The idea
//! is that a tool which only needs to read or write store images or
//! instructions would depend on the base crate but would not need to
//! depend on the emulator library itself.

mod error;
mod types;
mod word;

pub mod initial_orders;
pub mod instruction;
pub mod prelude;

pub use crate::error::{AddressParseError, ConversionFailed};
pub use crate::types::Address;
pub use crate::word::Word;
