//! Alarms and the other reasons the emulator stops.
//!
//! Every way in which a run can end is a [`StopReason`].  Some of
//! these are the normal way for a program to finish (a dynamic stop,
//! running off the end of the input tape) and some are fatal
//! [`Alarm`]s.  All of them reach the run loop through `?` and all of
//! them lead to the same shutdown sequence; they differ only in what
//! is reported and in the process exit code.
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

use base::prelude::*;

/// The files the emulator reads and writes.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Device {
    Reader,
    Punch,
    TeletypeInput,
    TeletypeOutput,
    Plotter,
    Store,
    StopFile,
    ReaderResidue,
    Diagnostics,
}

impl Display for Device {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Device::Reader => "paper tape input",
            Device::Punch => "paper tape punch",
            Device::TeletypeInput => "teletype input",
            Device::TeletypeOutput => "teletype output",
            Device::Plotter => "plotter output",
            Device::Store => "store image",
            Device::StopFile => "stop",
            Device::ReaderResidue => "residual paper tape",
            Device::Diagnostics => "diagnostics",
        })
    }
}

/// A fatal condition.  Any of these ends the run with exit code 1.
#[derive(Debug)]
pub enum Alarm {
    /// An instruction fetch or operand access named a location
    /// outside the store.  The value is the offending address, which
    /// for a fetch may be any 18-bit word.
    AddressOutOfRange(u32),
    /// A shift or input/output instruction with an unassigned
    /// operand.
    Unsupported {
        at: Address,
        instruction: Instruction,
        failure: DecodeFailure,
    },
    DivideByZero {
        at: Address,
        instruction: Instruction,
    },
    /// A file could not be opened, read or written.
    Io {
        device: Device,
        path: PathBuf,
        error: io::Error,
    },
    /// The store image holds more words than the store.
    StoreImageTooLarge { path: PathBuf },
    /// The store image holds something other than a word value.
    StoreImageFormat { path: PathBuf, token: String },
    /// The operator interrupted the run.
    Interrupted,
}

impl Alarm {
    pub fn io(device: Device, path: impl Into<PathBuf>, error: io::Error) -> Alarm {
        Alarm::Io {
            device,
            path: path.into(),
            error,
        }
    }
}

impl Display for Alarm {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Alarm::AddressOutOfRange(addr) => {
                write!(f, "Address outside of available store ({addr})")
            }
            Alarm::Unsupported {
                at,
                instruction,
                failure,
            } => write!(f, "{failure} at {at} ({instruction})"),
            Alarm::DivideByZero { at, instruction } => {
                write!(f, "Division by zero at {at} ({instruction})")
            }
            Alarm::Io {
                device,
                path,
                error,
            } => write!(
                f,
                "Problem with {device} file {}: {error}",
                path.display()
            ),
            Alarm::StoreImageTooLarge { path } => write!(
                f,
                "{} exceeds store capacity ({})",
                path.display(),
                Address::STORE_SIZE
            ),
            Alarm::StoreImageFormat { path, token } => {
                write!(f, "Format error in file {} at '{token}'", path.display())
            }
            Alarm::Interrupted => f.write_str("Execution terminated by interrupt"),
        }
    }
}

impl Error for Alarm {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Alarm::Io { error, .. } => Some(error),
            Alarm::Unsupported { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

/// Why a run ended.
#[derive(Debug)]
pub enum StopReason {
    /// The program jumped to the instruction it had just executed.
    DynamicStop(Address),
    ReaderExhausted,
    TeletypeExhausted,
    InstructionLimit,
    /// Too much was punched or read from the teletype.
    Overrun(Device),
    Alarm(Alarm),
}

impl StopReason {
    pub const fn exit_code(&self) -> i32 {
        match self {
            StopReason::DynamicStop(_) => 0,
            StopReason::Alarm(_) => 1,
            StopReason::ReaderExhausted => 2,
            StopReason::TeletypeExhausted => 4,
            StopReason::InstructionLimit => 8,
            StopReason::Overrun(_) => 16,
        }
    }
}

impl From<Alarm> for StopReason {
    fn from(alarm: Alarm) -> StopReason {
        StopReason::Alarm(alarm)
    }
}

impl Display for StopReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            StopReason::DynamicStop(addr) => write!(f, "Dynamic stop at {addr}"),
            StopReason::ReaderExhausted => f.write_str("Run off end of input tape"),
            StopReason::TeletypeExhausted => f.write_str("Run off end of teleprinter input"),
            StopReason::InstructionLimit => f.write_str("Instruction limit reached"),
            StopReason::Overrun(Device::TeletypeInput) => {
                f.write_str("Excessive input from teletype")
            }
            StopReason::Overrun(Device::Punch) => f.write_str("Excessive output to punch"),
            StopReason::Overrun(device) => write!(f, "Excessive use of {device}"),
            StopReason::Alarm(alarm) => write!(f, "*** {alarm}"),
        }
    }
}
