//! The emulated machine as a whole.
//!
//! [`Emulator`] owns the store, the processor, the peripherals and
//! the diagnostics.  A run has three phases:
//!
//! 1. [`Emulator::new`] prepares the store (clear, load the saved
//!    image, load the initial orders) and sets the starting address.
//! 2. [`Emulator::run`] executes instructions until something stops
//!    the run, and returns the [`StopReason`].
//! 3. [`Emulator::shutdown`] reports the outcome, saves the store and
//!    the unread tape, closes the peripherals and returns the exit
//!    code.
//!
//! Shutdown is the same whatever stopped the run.
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{event, Level};

use base::prelude::*;

use crate::alarm::{Alarm, Device, StopReason};
use crate::config::Config;
use crate::control::ControlUnit;
use crate::diagnostics::{Console, Diagnostics, TraceLine};
use crate::io::DeviceManager;
use crate::memory::Store;


/// Where the teletype printer and the diagnostics go.
pub struct Outputs {
    pub teletype: Box<dyn Write>,
    pub diagnostics: Box<dyn Write>,
}

pub struct Emulator {
    config: Config,
    store: Store,
    control: ControlUnit,
    devices: DeviceManager,
    diag: Diagnostics,
    running: Arc<AtomicBool>,
}

impl Emulator {
    /// Sets up the machine ready to run.  Fails if the saved store
    /// image cannot be read; in that case nothing is written back.
    pub fn new(config: Config, outputs: Outputs) -> Result<Emulator, Alarm> {
        let mut diag = Diagnostics::new(
            Console::new(outputs.teletype, outputs.diagnostics),
            &config,
        );
        for line in config.describe() {
            diag.report_general(format_args!("{line}"));
        }

        let mut store = Store::new();
        store.clear();
        diag.report_general(format_args!(
            "Store ({} words) cleared",
            Address::STORE_SIZE
        ));
        let store_path = config.store_path.display();
        match store.load_image(&config.store_path)? {
            Some(n) => diag.report_general(format_args!("{n} words read in from {store_path}")),
            None => diag.report_general(format_args!(
                "No {store_path} file found, store left empty"
            )),
        }
        store.load_initial_orders();
        diag.report_general(format_args!("Initial orders loaded"));

        let control = ControlUnit::new();
        control.set_sequence_control(&mut store, config.jump)?;
        diag.report_general(format_args!(
            "Starting execution from location {}",
            config.jump
        ));
        event!(Level::INFO, "starting execution at {}", config.jump);
        diag.start_monitoring(&store);

        Ok(Emulator {
            devices: DeviceManager::new(&config),
            config,
            store,
            control,
            diag,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// The run continues while this flag is set.  Clearing it (from
    /// an interrupt handler, say) stops the run before the next
    /// instruction.
    pub fn run_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn control(&self) -> &ControlUnit {
        &self.control
    }

    pub fn devices(&self) -> &DeviceManager {
        &self.devices
    }

    /// Runs until the program stops or something goes wrong.
    pub fn run(&mut self) -> StopReason {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                return Alarm::Interrupted.into();
            }
            if let Err(reason) = self.step() {
                event!(Level::INFO, "execution stopped: {reason}");
                return reason;
            }
        }
    }

    /// Executes one instruction, then checks whether the run should
    /// stop.
    pub fn step(&mut self) -> Result<(), StopReason> {
        let executed =
            self.control
                .execute_instruction(&mut self.store, &mut self.devices, &mut self.diag)?;
        let count = self.control.stats().instructions;

        self.diag.check_monitor(&self.store);
        self.diag.update_triggers(count, executed.at);
        if self.diag.take_trace_request() {
            let line = TraceLine {
                count,
                at: executed.at,
                instruction: executed.instruction,
                a: self.control.accumulator(),
                q: self.control.q_register(),
                b: self.control.b_register(&self.store)?,
            };
            self.diag.trace(&line);
        }

        if self.diag.limit_reached(count) {
            return Err(StopReason::InstructionLimit);
        }

        // A jump to itself is how a program says it has finished.
        if self.control.sequence_control(&self.store)? == Word::from(executed.at) {
            self.record_stop(executed.at)?;
            return Err(StopReason::DynamicStop(executed.at));
        }
        Ok(())
    }

    fn record_stop(&self, at: Address) -> Result<(), Alarm> {
        let path = &self.config.stop_path;
        fs::write(path, at.bits().to_string()).map_err(|e| Alarm::io(Device::StopFile, path, e))
    }

    /// Reports why the run stopped, saves the state the next run needs
    /// and closes everything.  Returns the process exit code.
    pub fn shutdown(mut self, reason: &StopReason) -> i32 {
        let mut exit_code = reason.exit_code();
        match reason {
            StopReason::Alarm(alarm) => {
                event!(Level::ERROR, "{alarm}");
                self.diag.report(format_args!("{reason}"));
            }
            StopReason::Overrun(_) => self.diag.report(format_args!("{reason}")),
            _ => self.diag.report_general(format_args!("{reason}")),
        }
        self.diag.summary(
            exit_code,
            self.control.stats(),
            self.control.elapsed(),
        );

        let store_path = &self.config.store_path;
        match self.store.save_image(store_path) {
            Ok(()) => self.diag.report_general(format_args!(
                "{} words written out to {}",
                Address::STORE_SIZE,
                store_path.display()
            )),
            Err(alarm) => {
                self.diag.report(format_args!("*** {alarm}"));
                exit_code = 1;
            }
        }

        let residue_path = &self.config.residue_path;
        self.diag.report_general(format_args!(
            "Copying over residual input to {}",
            residue_path.display()
        ));
        if let Err(alarm) = self.devices.reader.save_residue(residue_path) {
            self.diag.report(format_args!("*** {alarm}"));
            exit_code = 1;
        }

        if let Err(alarm) = self.devices.close(&mut self.diag) {
            self.diag.report(format_args!("*** {alarm}"));
            exit_code = 1;
        }

        self.diag.report_general(format_args!("Exiting {exit_code}"));
        if let Err(e) = self.diag.flush() {
            event!(Level::WARN, "failed to flush output: {e}");
        }
        exit_code
    }
}
