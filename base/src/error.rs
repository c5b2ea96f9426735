//! Basic error reporting.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Represents a failure to convert a native value into one of the
/// fixed-width types defined in the base crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionFailed {
    TooLarge,
    TooSmall,
}

impl Error for ConversionFailed {}

impl Display for ConversionFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConversionFailed::TooLarge => f.write_str("value is too large"),
            ConversionFailed::TooSmall => f.write_str("value is too small"),
        }
    }
}

/// Signals that some text could not be understood as an address.
///
/// Addresses are written either as a plain decimal number or in
/// module form, `m^a`, where `m` is the number of an 8K store module
/// and `a` is an offset within it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressParseError {
    Empty,
    NotANumber(String),
    ModuleTooLarge(u32),
    OffsetTooLarge(u32),
    TooLarge(u32),
}

impl Error for AddressParseError {}

impl Display for AddressParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            AddressParseError::Empty => f.write_str("malformed address: address is empty"),
            AddressParseError::NotANumber(s) => {
                write!(f, "malformed address: '{s}' is not a decimal number")
            }
            AddressParseError::ModuleTooLarge(m) => {
                write!(f, "malformed address: there is no store module {m}")
            }
            AddressParseError::OffsetTooLarge(a) => {
                write!(f, "malformed address: offset {a} does not fit in a module")
            }
            AddressParseError::TooLarge(n) => {
                write!(f, "malformed address: {n} is too large to be an address")
            }
        }
    }
}
