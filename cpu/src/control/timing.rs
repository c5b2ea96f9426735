//! Instruction timing.
//!
//! Each instruction adds its execution time to the simulated clock.
//! The figures are the 903's, in microseconds.  Where the time
//! depends on the outcome (conditional jumps, the plotter) it depends
//! only on the accumulator, which those instructions do not change,
//! so the whole estimate can be made before the instruction runs.

use base::prelude::*;

/// Extra time taken by a B-modified instruction.
pub(crate) const B_MODIFICATION: u64 = 6;

/// Plotter commands which raise or lower the pen take longer than a
/// bare step.
const PLOTTER_SLOW_COMMAND: u32 = 16;

pub(crate) fn estimate_instruction_micros(op: &Operation, a: Word) -> u64 {
    match op {
        Operation::LoadB => 30,
        Operation::Add => 23,
        Operation::NegateAdd => 26,
        Operation::StoreQ => 25,
        Operation::LoadA => 23,
        Operation::StoreA => 25,
        Operation::Collate => 23,
        Operation::JumpIfZero => {
            // A zero accumulator is charged both the taken time and
            // the time for a sign bit test which finds no bits set.
            if a.is_zero() {
                28 + 20
            } else {
                21
            }
        }
        Operation::Jump => 23,
        Operation::JumpIfNegative => {
            // The untaken time is always charged.
            if a.is_negative() {
                20 + 25
            } else {
                20
            }
        }
        Operation::Increment => 24,
        Operation::StoreS => 30,
        Operation::Multiply | Operation::Divide => 79,
        Operation::Shift(shift) => 24 + 7 * u64::from(shift.effective_places()),
        Operation::Io(io) => match io {
            IoOperation::ReadTape => 4000,
            IoOperation::ReadTeletype => 100_000,
            IoOperation::MovePlotter => {
                if a.bits() >= PLOTTER_SLOW_COMMAND {
                    20_000
                } else {
                    3300
                }
            }
            IoOperation::PunchTape => 9091,
            IoOperation::WriteTeletype => 100_000,
            IoOperation::LevelTerminate => 19,
        },
    }
}
