//! This module emulates the peripherals: the paper tape reader and
//! punch, the teletype and the incremental plotter.
//!
//! ## Files
//!
//! Every peripheral is backed by a file.  Files are opened the first
//! time the program uses the device, so a program which never punches
//! does not create an empty punch file.  Everything opened is closed
//! at the end of the run, however the run ends.
//!
//! | Device         | Default file | Content                        |
//! | -------------- | ------------ | ------------------------------ |
//! | Tape reader    | `.reader`    | raw tape characters            |
//! | Tape punch     | `.punch`     | raw tape characters            |
//! | Teletype input | `.ttyin`     | raw keyboard characters        |
//! | Teletype print | stdout       | printable characters only      |
//! | Plotter        | `.plot.png`  | RGB image of the plotter paper |
//!
//! The punch and the teletype input stop the run after a full reel
//! of tape, which otherwise would indicate a runaway program.  A reel
//! takes [`REEL`] characters plus one; the next is an overrun.
use std::io::{self, Read};

use tracing::{event, Level};

use crate::alarm::Alarm;
use crate::config::Config;
use crate::diagnostics::Diagnostics;

mod dev_plotter;
mod dev_punch;
mod dev_reader;
mod dev_teletype;

pub use dev_plotter::Plotter;
pub use dev_punch::Punch;
pub use dev_reader::Reader;
pub use dev_teletype::Teletype;

/// Characters on a 1000 foot reel of paper tape, at ten characters
/// to the inch.
pub const REEL: usize = 10 * 12 * 1000;

/// True when `used` characters overfill a reel.
fn overruns_reel(used: usize) -> bool {
    used > REEL + 1
}

/// Reads one character, returning `None` at end of file.
fn read_char<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    input.bytes().next().transpose()
}

pub struct DeviceManager {
    pub reader: Reader,
    pub punch: Punch,
    pub teletype: Teletype,
    pub plotter: Plotter,
}

impl DeviceManager {
    pub fn new(config: &Config) -> DeviceManager {
        DeviceManager {
            reader: Reader::new(config.reader_path.clone()),
            punch: Punch::new(config.punch_path.clone()),
            teletype: Teletype::new(config.teletype_input_path.clone()),
            plotter: Plotter::new(config.plot_path.clone(), config.plotter),
        }
    }

    /// Closes every open device.  A failure to finish the punch output
    /// is returned; a failure to write the plot is only reported, since
    /// it does not affect anything the next run will read.
    pub fn close(&mut self, diag: &mut Diagnostics) -> Result<(), Alarm> {
        event!(Level::DEBUG, "closing devices");
        self.reader.close();
        self.teletype.close();
        let punched = self.punch.close();
        self.plotter.save(diag);
        punched
    }
}
