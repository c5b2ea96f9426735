//! Implementations of the arithmetic functions
//! - 1 (add): [`ControlUnit::op_add`]
//! - 2 (negate and add): [`ControlUnit::op_negate_add`]
//! - 6 (collate): [`ControlUnit::op_collate`]
//! - 10 (increment in store): [`ControlUnit::op_increment`]
//! - 12 (multiply): [`ControlUnit::op_multiply`]
//! - 13 (divide): [`ControlUnit::op_divide`]
//! - 14 (shift): [`ControlUnit::op_shift`]
//!
//! Multiply, divide and shift work on the double-length register
//! A:Q, with A holding the more significant half.  Q carries only 17
//! significant bits in a double-length product; its least
//! significant bit is used as a rounding indicator.

use base::prelude::*;

use crate::alarm::{Alarm, StopReason};
use crate::control::ControlUnit;
use crate::memory::Store;

/// Builds the sign-extended 36-bit value of A:Q.
fn double_length(a: Word, q: Word) -> i64 {
    (i64::from(a.to_signed()) << Word::BITS) | i64::from(q.bits())
}

impl ControlUnit {
    pub(crate) fn op_add(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        self.a = self.a.wrapping_add(store.read(m)?);
        Ok(())
    }

    /// A := store\[m\] - A.
    pub(crate) fn op_negate_add(
        &mut self,
        store: &mut Store,
        m: Address,
    ) -> Result<(), StopReason> {
        self.a = store.read(m)?.wrapping_sub(self.a);
        Ok(())
    }

    pub(crate) fn op_collate(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        self.a = self.a & store.read(m)?;
        Ok(())
    }

    pub(crate) fn op_increment(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        let w = store.read(m)?;
        store.write(m, w.wrapping_add(Word::ONE))?;
        Ok(())
    }

    pub(crate) fn op_multiply(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        let multiplier = i64::from(self.a.to_signed());
        let product = multiplier * i64::from(store.read(m)?.to_signed());
        let q = Word::from_signed(product << 1);
        self.q = if multiplier < 0 { q | 1 } else { q };
        self.a = Word::from_signed(product >> (Word::BITS - 1));
        Ok(())
    }

    pub(crate) fn op_divide(
        &mut self,
        store: &mut Store,
        m: Address,
        at: Address,
        instruction: Instruction,
    ) -> Result<(), StopReason> {
        let divisor = i64::from(store.read(m)?.to_signed());
        if divisor == 0 {
            return Err(Alarm::DivideByZero { at, instruction }.into());
        }
        let quotient = Word::from_signed((double_length(self.a, self.q) / divisor) >> 1);
        self.a = quotient | 1;
        self.q = quotient & 0o777_776;
        Ok(())
    }

    pub(crate) fn op_shift(&mut self, shift: ShiftOperation) {
        let aq = double_length(self.a, self.q);
        let places = u32::from(shift.effective_places());
        let shifted = match shift {
            ShiftOperation::Left(_) => aq << places,
            // Arithmetic, since aq is signed.
            ShiftOperation::Right(_) => aq >> places,
        };
        self.q = Word::from_signed(shifted);
        self.a = Word::from_signed(shifted >> Word::BITS);
    }
}
