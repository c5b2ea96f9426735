//! Emulates the processor of the 900 series.
//!
//! Within this emulator, the control unit performs the following
//! functions:
//!
//! - Instruction fetch, including advancing the sequence control
//!   register (SCR)
//! - Effective address formation (module-relative or B-modified)
//! - Decoding and dispatch of the sixteen functions
//! - Keeping track of the priority level
//! - Counting instructions and accumulating the simulated time
//!
//! The SCR and B register are not held here.  The 900 series keeps
//! them in store, at locations which depend on the priority level.
use std::time::Duration;

use tracing::{event, span, Level};

mod op_arith;
mod op_io;
mod op_jump;
mod op_loadstore;
pub mod timing;

#[cfg(test)]
mod tests;

use base::prelude::*;

use crate::alarm::{Alarm, StopReason};
use crate::clock::{BasicClock, Clock};
use crate::diagnostics::Diagnostics;
use crate::io::DeviceManager;
use crate::memory::Store;

/// The priority levels the emulator supports.  Each level has its own
/// SCR and B register, at fixed store locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityLevel {
    #[default]
    Level1,
    Level4,
}

impl PriorityLevel {
    /// Store locations of (SCR, B), indexed by level.
    const REGISTERS: [(u16, u16); 2] = [(0, 1), (6, 7)];

    const fn registers(self) -> (u16, u16) {
        match self {
            PriorityLevel::Level1 => Self::REGISTERS[0],
            PriorityLevel::Level4 => Self::REGISTERS[1],
        }
    }

    /// Where this level keeps its sequence control register.
    pub const fn scr(self) -> Address {
        Address::new(self.registers().0)
    }

    /// Where this level keeps its B register.
    pub const fn b_register(self) -> Address {
        Address::new(self.registers().1)
    }

    pub const fn number(self) -> u8 {
        match self {
            PriorityLevel::Level1 => 1,
            PriorityLevel::Level4 => 4,
        }
    }
}

/// Instruction counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub instructions: u64,
    function_counts: [u64; Function::COUNT],
}

impl ExecutionStats {
    pub fn function_count(&self, f: Function) -> u64 {
        self.function_counts[usize::from(f.number())]
    }

    /// `n` as a whole-number percentage of all instructions executed.
    pub fn percentage(&self, n: u64) -> u64 {
        if self.instructions == 0 {
            0
        } else {
            n * 100 / self.instructions
        }
    }

    fn record(&mut self, f: Function) {
        self.function_counts[usize::from(f.number())] += 1;
    }
}

/// Describes an instruction which has just been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedInstruction {
    /// The location the instruction was fetched from.
    pub at: Address,
    pub instruction: Instruction,
}

/// The registers and state of the processor.
#[derive(Debug, Default)]
pub struct ControlUnit {
    a: Word,
    q: Word,
    level: PriorityLevel,
    clock: BasicClock,
    stats: ExecutionStats,
}

impl ControlUnit {
    pub fn new() -> ControlUnit {
        ControlUnit::default()
    }

    pub fn accumulator(&self) -> Word {
        self.a
    }

    pub fn q_register(&self) -> Word {
        self.q
    }

    pub fn level(&self) -> PriorityLevel {
        self.level
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.now()
    }

    /// Current contents of the SCR of the active priority level.
    pub fn sequence_control(&self, store: &Store) -> Result<Word, Alarm> {
        store.read(self.level.scr())
    }

    pub fn set_sequence_control(&self, store: &mut Store, to: Address) -> Result<(), Alarm> {
        store.write(self.level.scr(), Word::from(to))
    }

    /// Current contents of the B register of the active priority
    /// level.
    pub fn b_register(&self, store: &Store) -> Result<Word, Alarm> {
        store.read(self.level.b_register())
    }

    /// Fetches, decodes and executes one instruction.
    pub fn execute_instruction(
        &mut self,
        store: &mut Store,
        devices: &mut DeviceManager,
        diag: &mut Diagnostics,
    ) -> Result<ExecutedInstruction, StopReason> {
        self.stats.instructions += 1;

        let scr = self.level.scr();
        let last_scr = store.read(scr)?;
        store.write(scr, last_scr.wrapping_add(Word::ONE))?;
        let at = Address::try_from(last_scr)
            .ok()
            .filter(|a| a.is_in_store())
            .ok_or(Alarm::AddressOutOfRange(last_scr.bits()))?;

        let instruction = Instruction::from(store.read(at)?);
        let function = instruction.function();
        self.stats.record(function);

        let span = span!(
            Level::TRACE,
            "execute",
            at=%at,
            inst=%instruction,
            function=function.name()
        );
        let _enter = span.enter();

        let field = instruction.operand() | at.module_bits();
        let m = if instruction.is_b_modified() {
            let b = self.b_register(store)?;
            self.clock.consume_micros(timing::B_MODIFICATION);
            Address::from_bits_masked(u32::from(field) + b.bits())
        } else {
            Address::new(field)
        };

        let op = Operation::decode(function, m).map_err(|failure| Alarm::Unsupported {
            at,
            instruction,
            failure,
        })?;
        event!(Level::TRACE, "{op:?} with effective address {m}");
        self.clock
            .consume_micros(timing::estimate_instruction_micros(&op, self.a));

        match op {
            Operation::LoadB => self.op_load_b(store, m),
            Operation::Add => self.op_add(store, m),
            Operation::NegateAdd => self.op_negate_add(store, m),
            Operation::StoreQ => self.op_store_q(store, m),
            Operation::LoadA => self.op_load_a(store, m),
            Operation::StoreA => self.op_store_a(store, m, diag),
            Operation::Collate => self.op_collate(store, m),
            Operation::JumpIfZero => self.op_jump_if_zero(store, m, diag),
            Operation::Jump => self.op_jump(store, m),
            Operation::JumpIfNegative => self.op_jump_if_negative(store, m, diag),
            Operation::Increment => self.op_increment(store, m),
            Operation::StoreS => self.op_store_s(store, m),
            Operation::Multiply => self.op_multiply(store, m),
            Operation::Divide => self.op_divide(store, m, at, instruction),
            Operation::Shift(shift) => {
                self.op_shift(shift);
                Ok(())
            }
            Operation::Io(io) => self.op_io(io, devices, diag),
        }?;
        Ok(ExecutedInstruction { at, instruction })
    }
}
