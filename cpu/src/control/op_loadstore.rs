//! Implementations of the load and store functions
//! - 0 (load B): [`ControlUnit::op_load_b`]
//! - 3 (store Q): [`ControlUnit::op_store_q`]
//! - 4 (load A): [`ControlUnit::op_load_a`]
//! - 5 (store A): [`ControlUnit::op_store_a`]
//! - 11 (store S): [`ControlUnit::op_store_s`]

use tracing::{event, Level};

use base::prelude::*;

use crate::alarm::StopReason;
use crate::control::{ControlUnit, PriorityLevel};
use crate::diagnostics::Diagnostics;
use crate::memory::Store;

impl ControlUnit {
    /// Function 0.  The word goes to both Q and the B register.
    pub(crate) fn op_load_b(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        self.q = store.read(m)?;
        store.write(self.level.b_register(), self.q)?;
        Ok(())
    }

    /// Function 3.  Only the top 17 bits of Q are stored.
    pub(crate) fn op_store_q(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        store.write(m, Word::truncate(self.q.bits() >> 1))?;
        Ok(())
    }

    /// Function 4.
    pub(crate) fn op_load_a(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        self.a = store.read(m)?;
        Ok(())
    }

    /// Function 5.  Programs at priority level 1 cannot overwrite the
    /// initial orders.
    pub(crate) fn op_store_a(
        &mut self,
        store: &mut Store,
        m: Address,
        diag: &mut Diagnostics,
    ) -> Result<(), StopReason> {
        if self.level == PriorityLevel::Level1 && is_initial_orders(m) {
            event!(Level::WARN, "ignoring write of {:?} to {m}", self.a);
            diag.report_general(format_args!(
                "Write to initial instructions ignored in priority level 1"
            ));
            return Ok(());
        }
        store.write(m, self.a)?;
        Ok(())
    }

    /// Function 11.  Stores the offset part of the SCR (which already
    /// points at the next instruction).  The module part goes to Q.
    pub(crate) fn op_store_s(&mut self, store: &mut Store, m: Address) -> Result<(), StopReason> {
        let scr = self.sequence_control(store)?;
        self.q = scr & u32::from(Address::MODULE_MASK);
        store.write(m, scr & u32::from(Address::OFFSET_MASK))?;
        Ok(())
    }
}
