//! The 18-bit word of the 900 series.
//!
//! Words are held as unsigned bit patterns in the range 0..=0o777777
//! and reinterpreted as two's complement signed values where an
//! operation needs a sign.  Every operation which produces a new
//! word reduces its result modulo 2^18, so a [`Word`] can never hold
//! an out-of-range bit pattern.
use std::fmt::{self, Debug, Display, Formatter, Octal};
use std::ops::{BitAnd, BitOr};

use super::error::ConversionFailed;


#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word {
    bits: u32,
}

impl Word {
    pub const BITS: u32 = 18;
    const MODULUS: u32 = 1 << Self::BITS;
    pub const VALUE_BITS: u32 = Self::MODULUS - 1;
    pub const SIGN_BIT: u32 = 1 << (Self::BITS - 1);

    pub const ZERO: Word = Word { bits: 0 };
    pub const ONE: Word = Word { bits: 1 };
    pub const MAX: Word = Word {
        bits: Self::VALUE_BITS,
    };

    /// The most negative value, -131072.
    pub const MIN_SIGNED: i32 = -(Self::SIGN_BIT as i32);

    /// Builds a word from the bottom 18 bits of `n`, discarding the
    /// rest.
    pub const fn truncate(n: u32) -> Word {
        Word {
            bits: n & Self::VALUE_BITS,
        }
    }

    /// Builds a word from the bottom 18 bits of the two's complement
    /// representation of `n`.  This is the reduction modulo 2^18
    /// applied after multiplication, division and shifts.
    pub const fn from_signed(n: i64) -> Word {
        Word {
            bits: (n & Self::VALUE_BITS as i64) as u32,
        }
    }

    pub const fn bits(self) -> u32 {
        self.bits
    }

    pub const fn is_zero(self) -> bool {
        self.bits == 0
    }

    /// True when the sign bit (bit 18, counting from 1) is set.
    pub const fn is_negative(self) -> bool {
        self.bits & Self::SIGN_BIT != 0
    }

    /// Sign-extends the word.
    pub const fn to_signed(self) -> i32 {
        if self.is_negative() {
            self.bits as i32 - Self::MODULUS as i32
        } else {
            self.bits as i32
        }
    }

    pub const fn wrapping_add(self, rhs: Word) -> Word {
        Word::truncate(self.bits + rhs.bits)
    }

    pub const fn wrapping_sub(self, rhs: Word) -> Word {
        Word::truncate(self.bits + Self::MODULUS - rhs.bits)
    }

    /// Shifts the word left by `places` and merges `low` into the
    /// vacated bits, as character input does.
    pub const fn shift_in(self, places: u32, low: u32) -> Word {
        Word::truncate((self.bits << places) | low)
    }
}

impl From<u8> for Word {
    fn from(n: u8) -> Word {
        Word { bits: n.into() }
    }
}

impl From<u16> for Word {
    fn from(n: u16) -> Word {
        Word { bits: n.into() }
    }
}

impl From<Word> for u32 {
    fn from(w: Word) -> u32 {
        w.bits
    }
}

impl From<Word> for i64 {
    /// Yields the unsigned bit pattern.  Use [`Word::to_signed`] for
    /// the signed value.
    fn from(w: Word) -> i64 {
        i64::from(w.bits)
    }
}

impl TryFrom<u32> for Word {
    type Error = ConversionFailed;
    fn try_from(n: u32) -> Result<Word, ConversionFailed> {
        if n > Self::VALUE_BITS {
            Err(ConversionFailed::TooLarge)
        } else {
            Ok(Word { bits: n })
        }
    }
}

/// Accepts both the unsigned bit pattern (0..=262143) and the signed
/// value (-131072..=131071) of a word.  Store images in the wild
/// contain both forms.
impl TryFrom<i64> for Word {
    type Error = ConversionFailed;
    fn try_from(n: i64) -> Result<Word, ConversionFailed> {
        if n < i64::from(Self::MIN_SIGNED) {
            Err(ConversionFailed::TooSmall)
        } else if n > i64::from(Self::VALUE_BITS) {
            Err(ConversionFailed::TooLarge)
        } else {
            Ok(Word::from_signed(n))
        }
    }
}

impl BitAnd for Word {
    type Output = Word;
    fn bitand(self, rhs: Word) -> Word {
        Word {
            bits: self.bits & rhs.bits,
        }
    }
}

impl BitAnd<u32> for Word {
    type Output = Word;
    fn bitand(self, rhs: u32) -> Word {
        Word {
            bits: self.bits & rhs,
        }
    }
}

impl BitOr<u32> for Word {
    type Output = Word;
    fn bitor(self, rhs: u32) -> Word {
        Word::truncate(self.bits | rhs)
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        Display::fmt(&self.bits, f)
    }
}

impl Octal for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        Octal::fmt(&self.bits, f)
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "&{:06o}", self.bits)
    }
}
