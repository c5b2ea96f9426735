//! Function 15: input, output and the level terminate instruction.
//!
//! Character input shifts A left seven places and places the new
//! character in the vacated bits.  Character output sends the bottom
//! eight bits of A.

use tracing::{event, Level};

use base::prelude::*;

use crate::alarm::StopReason;
use crate::control::{ControlUnit, PriorityLevel};
use crate::diagnostics::Diagnostics;
use crate::io::DeviceManager;

const CHARACTER_SHIFT: u32 = 7;
const OUTPUT_MASK: u32 = 0o377;

impl ControlUnit {
    pub(crate) fn op_io(
        &mut self,
        op: IoOperation,
        devices: &mut DeviceManager,
        diag: &mut Diagnostics,
    ) -> Result<(), StopReason> {
        let output = (self.a.bits() & OUTPUT_MASK) as u8;
        match op {
            IoOperation::ReadTape => {
                let ch = devices.reader.read(diag)?;
                self.a = self.a.shift_in(CHARACTER_SHIFT, ch.into());
            }
            IoOperation::ReadTeletype => {
                let ch = devices.teletype.read(diag)?;
                self.a = self.a.shift_in(CHARACTER_SHIFT, ch.into());
            }
            IoOperation::MovePlotter => devices.plotter.move_pen(self.a.bits(), diag),
            IoOperation::PunchTape => devices.punch.punch(output, diag)?,
            IoOperation::WriteTeletype => devices.teletype.write(output, diag)?,
            IoOperation::LevelTerminate => {
                event!(
                    Level::INFO,
                    "level terminate: leaving priority level {}",
                    self.level.number()
                );
                self.level = PriorityLevel::Level4;
            }
        }
        Ok(())
    }
}
