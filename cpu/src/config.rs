//! Emulator configuration.
//!
//! [`Config`] carries everything the command line can set.  The
//! defaults are the historic file names used by the 900-series tool
//! chain, all in the current directory.
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use base::prelude::*;

use super::diagnostics::Verbosity;

/// Paper size and nib size of the plotter, in plotter steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotterConfig {
    pub width: u32,
    pub height: u32,
    pub pen: u32,
}

impl PlotterConfig {
    pub const MAX_PEN: u32 = 12;
}

impl Default for PlotterConfig {
    fn default() -> PlotterConfig {
        PlotterConfig {
            width: 3600,
            height: 3600,
            pen: 4,
        }
    }
}

/// The conditions which switch on instruction tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceConfig {
    /// Start tracing when an instruction is fetched from here.
    pub start: Option<Address>,
    /// Start tracing once this many instructions have executed.
    pub count: Option<u64>,
    /// Trace 1000 instructions from this instruction count onward,
    /// then stop the run.
    pub rtrace: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub reader_path: PathBuf,
    pub punch_path: PathBuf,
    pub teletype_input_path: PathBuf,
    pub plot_path: PathBuf,
    pub store_path: PathBuf,
    pub stop_path: PathBuf,
    /// Where unread paper tape is copied at the end of the run.  This
    /// is the canonical reader file even when `reader_path` has been
    /// changed, so that the next run picks up where this one left off.
    pub residue_path: PathBuf,
    /// Set when diagnostics go to a file rather than stderr.
    pub diagnostics_path: Option<PathBuf>,
    /// The initial setting of the operator's keys (the starting
    /// address).
    pub jump: Address,
    pub plotter: PlotterConfig,
    pub verbose: u8,
    pub abandon: Option<u64>,
    pub trace: TraceConfig,
    pub monitor: Option<Address>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            reader_path: PathBuf::from(".reader"),
            punch_path: PathBuf::from(".punch"),
            teletype_input_path: PathBuf::from(".ttyin"),
            plot_path: PathBuf::from(".plot.png"),
            store_path: PathBuf::from(".store"),
            stop_path: PathBuf::from(".stop"),
            residue_path: PathBuf::from(".reader"),
            diagnostics_path: None,
            jump: INITIAL_ORDERS_ENTRY,
            plotter: PlotterConfig::default(),
            verbose: 0,
            abandon: None,
            trace: TraceConfig::default(),
            monitor: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    JumpOutOfRange(Address),
    PenTooLarge(u32),
    VerbosityTooLarge(u8),
    EmptyPaper { width: u32, height: u32 },
    NotInStore { what: &'static str, address: Address },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConfigError::JumpOutOfRange(a) => write!(
                f,
                "jump address {} is not in module 0 (it must be less than {})",
                a.bits(),
                Address::MODULE_SIZE
            ),
            ConfigError::PenTooLarge(n) => write!(
                f,
                "pen size {n} is too large (the maximum is {})",
                PlotterConfig::MAX_PEN
            ),
            ConfigError::VerbosityTooLarge(n) => {
                write!(f, "verbosity {n} is too large (the maximum is 15)")
            }
            ConfigError::EmptyPaper { width, height } => {
                write!(f, "plotter paper {width}x{height} has no area")
            }
            ConfigError::NotInStore { what, address } => write!(
                f,
                "{what} address {address} ({}) is outside the store",
                address.bits()
            ),
        }
    }
}

impl Error for ConfigError {}

impl Config {
    /// Checks the configuration and resolves interactions between
    /// settings.  A restricted trace (`rtrace`) replaces any other
    /// trace trigger.
    pub fn validate(mut self) -> Result<Config, ConfigError> {
        if self.jump.bits() >= Address::MODULE_SIZE {
            return Err(ConfigError::JumpOutOfRange(self.jump));
        }
        if self.plotter.pen > PlotterConfig::MAX_PEN {
            return Err(ConfigError::PenTooLarge(self.plotter.pen));
        }
        if self.plotter.width == 0 || self.plotter.height == 0 {
            return Err(ConfigError::EmptyPaper {
                width: self.plotter.width,
                height: self.plotter.height,
            });
        }
        if Verbosity::try_from(self.verbose).is_err() {
            return Err(ConfigError::VerbosityTooLarge(self.verbose));
        }
        for (what, address) in [("monitor", self.monitor), ("start", self.trace.start)] {
            if let Some(address) = address {
                if !address.is_in_store() {
                    return Err(ConfigError::NotInStore { what, address });
                }
            }
        }
        if self.trace.rtrace.is_some() {
            self.trace.start = None;
            self.trace.count = None;
        }
        Ok(self)
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::try_from(self.verbose).unwrap_or_default()
    }

    /// Describes the configuration, one line per setting, as shown at
    /// start-up when general reporting is enabled.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.diagnostics_path {
            lines.push(format!(
                "Diagnostic logging directed to {}",
                path.display()
            ));
        }
        lines.push(format!(
            "Paper tape will be read from {}",
            self.reader_path.display()
        ));
        lines.push(format!(
            "Paper tape will be punched to {}",
            self.punch_path.display()
        ));
        lines.push(format!(
            "Teletype input will be read from {}",
            self.teletype_input_path.display()
        ));
        lines.push(format!(
            "Plotter output will go to {}",
            self.plot_path.display()
        ));
        lines.push(format!(
            "Plotter paper width {}, height {}",
            self.plotter.width, self.plotter.height
        ));
        lines.push(format!("Plotter pen size {} steps", self.plotter.pen));
        lines.push(format!(
            "Store image will be read from {}",
            self.store_path.display()
        ));
        lines.push(format!(
            "Execution will commence at address {} ({})",
            self.jump,
            self.jump.bits()
        ));
        if let Some(n) = self.abandon {
            lines.push(format!(
                "Execution will be abandoned after {n} instructions executed"
            ));
        }
        if let Some(n) = self.trace.count {
            lines.push(format!("Tracing will start after {n} instructions executed"));
        }
        if let Some(a) = self.trace.start {
            lines.push(format!(
                "Tracing will start from location {} onwards",
                a.bits()
            ));
        }
        if let Some(n) = self.trace.rtrace {
            lines.push(format!(
                "Limited tracing will start after {n} instructions executed"
            ));
        }
        if let Some(a) = self.monitor {
            lines.push(format!("Location {a} ({}) will be monitored", a.bits()));
        }
        lines
    }
}
