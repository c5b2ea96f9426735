//! Diagnostic output: reports, instruction traces and the end-of-run
//! summary.
//!
//! This output is part of what the emulator does for its user, so its
//! format is fixed.  It is separate from the `tracing` events the
//! crate emits for developers.
//!
//! The teletype printer and the diagnostic stream usually share a
//! terminal, so they are managed together by [`Console`]: before any
//! diagnostic line is written, a partly printed teletype line is
//! finished off.
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};
use std::time::Duration;

use tracing::{event, Level};

use base::prelude::*;

use super::alarm::{Alarm, Device};
use super::clock::Elapsed;
use super::config::Config;
use super::control::ExecutionStats;
use super::memory::Store;


/// The verbosity bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity(u8);

impl Verbosity {
    /// Lifecycle reports and the end-of-run summary.
    pub const GENERAL: u8 = 1;
    /// Trace taken jumps while tracing.
    pub const JUMPS: u8 = 2;
    /// Trace every instruction while tracing.
    pub const INSTRUCTIONS: u8 = 4;
    /// Report every character transferred to or from a device.
    pub const CHARACTERS: u8 = 8;

    const ALL: u8 = 15;

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn general(self) -> bool {
        self.0 & Self::GENERAL != 0
    }

    pub const fn jumps(self) -> bool {
        self.0 & Self::JUMPS != 0
    }

    pub const fn instructions(self) -> bool {
        self.0 & Self::INSTRUCTIONS != 0
    }

    pub const fn characters(self) -> bool {
        self.0 & Self::CHARACTERS != 0
    }
}

impl TryFrom<u8> for Verbosity {
    type Error = u8;
    fn try_from(n: u8) -> Result<Verbosity, u8> {
        if n > Self::ALL {
            Err(n)
        } else {
            Ok(Verbosity(n))
        }
    }
}

/// The teletype printer and the diagnostic stream.
pub struct Console {
    teletype: Box<dyn Write>,
    diagnostics: Box<dyn Write>,
    last_printed: Option<u8>,
}

impl Console {
    pub fn new(teletype: Box<dyn Write>, diagnostics: Box<dyn Write>) -> Console {
        Console {
            teletype,
            diagnostics,
            last_printed: None,
        }
    }

    /// Prints one character on the teletype.
    pub fn print(&mut self, ch: u8) -> Result<(), Alarm> {
        self.echo(ch)?;
        self.last_printed = Some(ch);
        Ok(())
    }

    /// Prints a character typed at the keyboard.  Typed characters
    /// do not count towards the line [`Console::finish_line`] ends.
    pub fn echo(&mut self, ch: u8) -> Result<(), Alarm> {
        self.teletype
            .write_all(&[ch])
            .map_err(|e| Alarm::io(Device::TeletypeOutput, "<stdout>", e))
    }

    /// Ends a partly printed teletype line.
    pub fn finish_line(&mut self) -> io::Result<()> {
        if matches!(self.last_printed, Some(ch) if ch != b'\n') {
            self.teletype.write_all(b"\n")?;
        }
        self.last_printed = None;
        self.teletype.flush()
    }

    /// Writes a line of diagnostics.  Failure to write diagnostics
    /// does not stop the run.
    pub fn report(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.finish_line() {
            event!(Level::WARN, "failed to write to the teletype: {e}");
        }
        if let Err(e) = writeln!(self.diagnostics, "{args}") {
            event!(Level::WARN, "failed to write diagnostics: {e}");
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.finish_line()?;
        self.diagnostics.flush()
    }
}

/// One line of instruction trace.
#[derive(Debug, Clone, Copy)]
pub struct TraceLine {
    /// Instructions executed so far, including this one.
    pub count: u64,
    /// Where the instruction was fetched from.
    pub at: Address,
    pub instruction: Instruction,
    pub a: Word,
    pub q: Word,
    pub b: Word,
}

impl Display for TraceLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let function = self.instruction.function();
        let marker = match (self.instruction.is_b_modified(), function.is_two_digit()) {
            (true, true) => " /",
            (true, false) => "  /",
            (false, true) => "  ",
            (false, false) => "   ",
        };
        let operand = self.instruction.operand() | self.at.module_bits();
        write!(
            f,
            "{:10}   {}{}{} {:4} A={:+8} (&{:06o}) Q={:+8} (&{:06o}) B={:+7} ({})",
            self.count,
            self.at,
            marker,
            function,
            operand,
            self.a.to_signed(),
            self.a.bits(),
            self.q.to_signed(),
            self.q.bits(),
            self.b.to_signed(),
            Address::from_bits_masked(self.b.bits()),
        )
    }
}

/// Watches one store location for changes.
#[derive(Debug, Clone, Copy)]
struct Monitor {
    address: Address,
    last: Word,
}

/// Decides which instructions are traced, and writes reports.
pub struct Diagnostics {
    console: Console,
    verbosity: Verbosity,
    /// The trace window is open.
    tracing: bool,
    /// Trace the current instruction whatever the verbosity.
    trace_one: bool,
    start: Option<Address>,
    count: Option<u64>,
    rtrace: Option<u64>,
    abandon_at: Option<u64>,
    monitor: Option<Monitor>,
}

impl Diagnostics {
    /// Instructions traced after the restricted trace starts.
    pub const RTRACE_WINDOW: u64 = 1000;

    pub fn new(console: Console, config: &Config) -> Diagnostics {
        Diagnostics {
            console,
            verbosity: config.verbosity(),
            tracing: false,
            trace_one: false,
            start: config.trace.start,
            count: config.trace.count,
            rtrace: config.trace.rtrace,
            abandon_at: config.abandon,
            monitor: config.monitor.map(|address| Monitor {
                address,
                last: Word::ZERO,
            }),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// Writes a report unconditionally.
    pub fn report(&mut self, args: fmt::Arguments<'_>) {
        self.console.report(args);
    }

    /// Writes a lifecycle report if general reporting is enabled.
    pub fn report_general(&mut self, args: fmt::Arguments<'_>) {
        if self.verbosity.general() {
            self.console.report(args);
        }
    }

    /// Reports a character transfer if character reporting is
    /// enabled.  Tape and teletype transfers also have the current
    /// instruction traced.
    pub fn report_character(&mut self, args: fmt::Arguments<'_>, trace: bool) {
        if self.verbosity.characters() {
            if trace {
                self.trace_one = true;
            }
            self.console.report(args);
        }
    }

    /// Called when a conditional jump is taken.
    pub fn note_jump_taken(&mut self) {
        self.trace_one = self.tracing && self.verbosity.jumps();
    }

    /// Records the current contents of the monitored location, so
    /// that only later changes are reported.
    pub fn start_monitoring(&mut self, store: &Store) {
        if let Some(monitor) = self.monitor.as_mut() {
            if let Ok(w) = store.read(monitor.address) {
                monitor.last = w;
            }
        }
    }

    /// Reports a change to the monitored location.
    pub fn check_monitor(&mut self, store: &Store) {
        let Some(monitor) = self.monitor.as_mut() else {
            return;
        };
        let Ok(now) = store.read(monitor.address) else {
            return;
        };
        if now != monitor.last {
            let was = monitor.last;
            monitor.last = now;
            self.trace_one = true;
            self.console.report(format_args!(
                "Monitored location changed from {was} to {now}"
            ));
        }
    }

    /// Opens the trace window if a trigger has been reached.  `count`
    /// is the number of instructions executed so far, `at` the address
    /// of the instruction just executed.
    pub fn update_triggers(&mut self, count: u64, at: Address) {
        if self.start == Some(at) || self.count.is_some_and(|n| count >= n) {
            self.tracing = true;
        }
        if self.rtrace == Some(count) {
            event!(Level::DEBUG, "restricted trace starts at instruction {count}");
            self.tracing = true;
            self.abandon_at = Some(count + Self::RTRACE_WINDOW);
        }
    }

    /// Decides whether the instruction just executed is traced.
    pub fn take_trace_request(&mut self) -> bool {
        if self.trace_one {
            self.trace_one = false;
            true
        } else {
            self.tracing && self.verbosity.instructions()
        }
    }

    pub fn trace(&mut self, line: &TraceLine) {
        self.console.report(format_args!("{line}"));
    }

    /// True once the run has executed as many instructions as it is
    /// allowed.
    pub fn limit_reached(&self, count: u64) -> bool {
        self.abandon_at.is_some_and(|n| count >= n)
    }

    /// Writes the end-of-run summary if general reporting is enabled.
    pub fn summary(&mut self, exit_code: i32, stats: &ExecutionStats, elapsed: Duration) {
        if !self.verbosity.general() {
            return;
        }
        self.report(format_args!("exit code {exit_code}"));
        self.report(format_args!("Function code count"));
        for row in Function::ALL.chunks(4) {
            let line: String = row
                .iter()
                .map(|f| {
                    let n = stats.function_count(*f);
                    format!("{:4}: {:8} ({:3}%)", f.number(), n, stats.percentage(n))
                })
                .collect();
            self.report(format_args!("{line}"));
        }
        self.report(format_args!(
            "{} instructions executed in {} of simulated time",
            stats.instructions,
            Elapsed(elapsed)
        ));
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.console.flush()
    }
}
