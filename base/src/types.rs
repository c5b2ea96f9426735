//! Store addresses.
//!
//! The 900 series addresses its store in 8K-word modules.  An
//! instruction's operand field holds only 13 bits, enough to name a
//! location within one module; the module itself comes from the
//! address the instruction was fetched from, or from the B register
//! when the instruction is B-modified.
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use super::error::{AddressParseError, ConversionFailed};
use super::word::Word;

#[cfg(test)]
use test_strategy::Arbitrary;

/// A 16-bit store address.  Only addresses below
/// [`Address::STORE_SIZE`] name real store locations, but larger
/// values can arise from B-modification and must be representable so
/// that they can be reported when they are rejected.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u16);

impl Address {
    /// Number of words in one store module.
    pub const MODULE_SIZE: u16 = 8192;
    /// Mask selecting the offset within a module (and the operand
    /// field of an instruction).
    pub const OFFSET_MASK: u16 = Self::MODULE_SIZE - 1;
    /// Mask selecting the module number bits of an address.
    pub const MODULE_MASK: u16 = 0o160_000;
    /// The largest module number which can be written in `m^a` form.
    pub const MAX_MODULE: u16 = 7;
    /// Number of words of store fitted to the emulated machine.
    pub const STORE_SIZE: usize = 16384;

    pub const ZERO: Address = Address(0);

    pub const fn new(n: u16) -> Address {
        Address(n)
    }

    /// Builds an address from the bottom 16 bits of `n`.
    pub const fn from_bits_masked(n: u32) -> Address {
        Address((n & 0xFFFF) as u16)
    }

    /// Builds an address in module form.  Fails if `module` or
    /// `offset` is out of range.
    pub fn from_module_offset(module: u16, offset: u16) -> Result<Address, AddressParseError> {
        if module > Self::MAX_MODULE {
            Err(AddressParseError::ModuleTooLarge(module.into()))
        } else if offset > Self::OFFSET_MASK {
            Err(AddressParseError::OffsetTooLarge(offset.into()))
        } else {
            Ok(Address(module * Self::MODULE_SIZE + offset))
        }
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn module(self) -> u16 {
        self.0 / Self::MODULE_SIZE
    }

    /// The module number in place, i.e. with the offset bits cleared.
    pub const fn module_bits(self) -> u16 {
        self.0 & Self::MODULE_MASK
    }

    pub const fn offset(self) -> u16 {
        self.0 & Self::OFFSET_MASK
    }

    /// Returns the store index for this address, if the address
    /// falls within the store.
    pub fn index(self) -> Option<usize> {
        let i = usize::from(self.0);
        (i < Self::STORE_SIZE).then_some(i)
    }

    pub const fn is_in_store(self) -> bool {
        (self.0 as usize) < Self::STORE_SIZE
    }

    pub const fn successor(self) -> Address {
        Address(self.0.wrapping_add(1))
    }
}

impl From<u16> for Address {
    fn from(n: u16) -> Address {
        Address(n)
    }
}

impl From<Address> for u16 {
    fn from(a: Address) -> u16 {
        a.0
    }
}

impl From<Address> for u32 {
    fn from(a: Address) -> u32 {
        a.0.into()
    }
}

impl From<Address> for usize {
    fn from(a: Address) -> usize {
        a.0.into()
    }
}

impl From<Address> for Word {
    fn from(a: Address) -> Word {
        Word::from(a.0)
    }
}

impl TryFrom<u32> for Address {
    type Error = ConversionFailed;
    fn try_from(n: u32) -> Result<Address, ConversionFailed> {
        u16::try_from(n)
            .map(Address)
            .map_err(|_| ConversionFailed::TooLarge)
    }
}

impl TryFrom<Word> for Address {
    type Error = ConversionFailed;
    fn try_from(w: Word) -> Result<Address, ConversionFailed> {
        Address::try_from(w.bits())
    }
}

/// Accepts either a plain decimal number or the module form `m^a`.
impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Address, AddressParseError> {
        fn number(s: &str) -> Result<u32, AddressParseError> {
            if s.is_empty() {
                return Err(AddressParseError::Empty);
            }
            s.parse::<u32>()
                .map_err(|_| AddressParseError::NotANumber(s.to_string()))
        }

        let s = s.trim();
        if s.is_empty() {
            return Err(AddressParseError::Empty);
        }
        match s.split_once('^') {
            Some((module, offset)) => {
                let module = number(module)?;
                let offset = number(offset)?;
                let module =
                    u16::try_from(module).map_err(|_| AddressParseError::ModuleTooLarge(module))?;
                let offset =
                    u16::try_from(offset).map_err(|_| AddressParseError::OffsetTooLarge(offset))?;
                Address::from_module_offset(module, offset)
            }
            None => {
                let n = number(s)?;
                Address::try_from(n).map_err(|_| AddressParseError::TooLarge(n))
            }
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}^{:04}", self.module(), self.offset())
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Address({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_display() {
        assert_eq!(Address::new(8181).to_string(), "0^8181");
        assert_eq!(Address::new(8192).to_string(), "1^0000");
        assert_eq!(Address::new(8192 + 17).to_string(), "1^0017");
    }

    #[test]
    fn test_module_fields() {
        let a = Address::new(0o160_000 | 5);
        assert_eq!(a.module(), 7);
        assert_eq!(a.module_bits(), 0o160_000);
        assert_eq!(a.offset(), 5);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!("8181".parse(), Ok(Address::new(8181)));
        assert_eq!(" 12 ".parse(), Ok(Address::new(12)));
        assert_eq!(
            "70000".parse::<Address>(),
            Err(AddressParseError::TooLarge(70000))
        );
    }

    #[test]
    fn test_parse_module_form() {
        assert_eq!("1^17".parse(), Ok(Address::new(8209)));
        assert_eq!("0^8181".parse(), Ok(Address::new(8181)));
        // A zero offset is a perfectly good address.
        assert_eq!("1^0".parse(), Ok(Address::new(8192)));
        assert_eq!(
            "8^0".parse::<Address>(),
            Err(AddressParseError::ModuleTooLarge(8))
        );
        assert_eq!(
            "1^8192".parse::<Address>(),
            Err(AddressParseError::OffsetTooLarge(8192))
        );
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!("".parse::<Address>(), Err(AddressParseError::Empty));
        assert_eq!("1^".parse::<Address>(), Err(AddressParseError::Empty));
        assert_eq!(
            "x".parse::<Address>(),
            Err(AddressParseError::NotANumber("x".to_string()))
        );
        assert_eq!(
            "-4".parse::<Address>(),
            Err(AddressParseError::NotANumber("-4".to_string()))
        );
    }

    #[test]
    fn test_index() {
        assert_eq!(Address::new(16383).index(), Some(16383));
        assert_eq!(Address::new(16384).index(), None);
        assert!(!Address::new(0xFFFF).is_in_store());
    }

    #[proptest]
    fn display_parses_back(a: Address) {
        assert_eq!(a.to_string().parse::<Address>(), Ok(a));
    }
}
