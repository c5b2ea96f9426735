//! Simulation of elapsed time in the simulated system.
//!
//! The emulator does not try to run at the speed of the real machine.
//! Instead each instruction adds its documented execution time to a
//! simulated clock, and the total is reported at the end of the run.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Clock is a simulated system clock.
pub trait Clock {
    /// Retrieves the current (simulated) time.
    fn now(&self) -> Duration;

    /// The caller calls `consume` to simulate the passing of a
    /// duration `interval`.
    fn consume(&mut self, interval: &Duration);
}

/// BasicClock provides a simulated clock.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use cpu::BasicClock;
/// use cpu::Clock;
/// let mut clk = BasicClock::new();
/// clk.consume(&Duration::from_micros(23));
/// assert_eq!(clk.now(), Duration::from_micros(23));
/// ```
#[derive(Debug, Default)]
pub struct BasicClock {
    /// Elapsed time as measured by the simulated clock.
    simulator_elapsed: Duration,
}

impl BasicClock {
    pub fn new() -> BasicClock {
        BasicClock {
            simulator_elapsed: Duration::ZERO,
        }
    }

    pub fn consume_micros(&mut self, micros: u64) {
        self.consume(&Duration::from_micros(micros));
    }
}

impl Clock for BasicClock {
    fn now(&self) -> Duration {
        self.simulator_elapsed
    }

    fn consume(&mut self, interval: &Duration) {
        self.simulator_elapsed += *interval;
    }
}

/// Renders a duration as "H hours, M minutes and S.SS seconds".
#[derive(Debug, Clone, Copy)]
pub struct Elapsed(pub Duration);

impl Display for Elapsed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        const MICROS_PER_MINUTE: u128 = 60_000_000;
        const MICROS_PER_HOUR: u128 = 60 * MICROS_PER_MINUTE;
        let micros = self.0.as_micros();
        let hours = micros / MICROS_PER_HOUR;
        let minutes = (micros % MICROS_PER_HOUR) / MICROS_PER_MINUTE;
        let seconds = (micros % MICROS_PER_MINUTE) as f64 / 1e6;
        write!(f, "{hours} hours, {minutes} minutes and {seconds:.2} seconds")
    }
}

#[test]
fn test_elapsed_rendering() {
    assert_eq!(
        Elapsed(Duration::ZERO).to_string(),
        "0 hours, 0 minutes and 0.00 seconds"
    );
    assert_eq!(
        Elapsed(Duration::from_micros(3_600_000_000 + 2 * 60_000_000 + 3_250_000)).to_string(),
        "1 hours, 2 minutes and 3.25 seconds"
    );
}

#[test]
fn test_consume_accumulates() {
    let mut clk = BasicClock::new();
    clk.consume_micros(30);
    clk.consume_micros(79);
    assert_eq!(clk.now(), Duration::from_micros(109));
}
