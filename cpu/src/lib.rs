//! This crate emulates the Elliott 903: the store, the control unit,
//! the paper tape and teletype peripherals, the plotter and the
//! diagnostics which show what a program is doing.
#![crate_name = "cpu"]

mod alarm;
mod clock;
mod config;
mod control;
mod diagnostics;
mod emulator;
mod io;
mod memory;
#[cfg(test)]
mod testing;

pub use alarm::{Alarm, Device, StopReason};
pub use clock::{BasicClock, Clock, Elapsed};
pub use config::{Config, ConfigError, PlotterConfig, TraceConfig};
pub use control::{ControlUnit, ExecutedInstruction, ExecutionStats, PriorityLevel};
pub use diagnostics::{Console, Diagnostics, TraceLine, Verbosity};
pub use emulator::{Emulator, Outputs};
pub use io::{DeviceManager, Plotter, Punch, Reader, Teletype, REEL};
pub use memory::Store;
