use base::prelude::*;

use crate::alarm::StopReason;
use crate::control::ControlUnit;
use crate::diagnostics::Diagnostics;
use crate::memory::Store;

/// ## Jumps
///
/// - 7 (jump if zero): [`ControlUnit::op_jump_if_zero`]
/// - 8 (jump): [`ControlUnit::op_jump`]
/// - 9 (jump if negative): [`ControlUnit::op_jump_if_negative`]
///
/// A jump sets the SCR to the effective address.  A taken conditional
/// jump may also have itself traced.
impl ControlUnit {
    pub(crate) fn op_jump_if_zero(
        &mut self,
        store: &mut Store,
        m: Address,
        diag: &mut Diagnostics,
    ) -> Result<(), StopReason> {
        if self.a.is_zero() {
            diag.note_jump_taken();
            self.set_sequence_control(store, m)?;
        }
        Ok(())
    }

    pub(crate) fn op_jump(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        self.set_sequence_control(store, m)?;
        Ok(())
    }

    pub(crate) fn op_jump_if_negative(
        &mut self,
        store: &mut Store,
        m: Address,
        diag: &mut Diagnostics,
    ) -> Result<(), StopReason> {
        if self.a.is_negative() {
            diag.note_jump_taken();
            self.set_sequence_control(store, m)?;
        }
        Ok(())
    }
}
