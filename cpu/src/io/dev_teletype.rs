//! The teletype.
//!
//! Keyboard input comes from a file and is echoed to the printer, as
//! with a real teletype in local-echo mode.  Printed output goes to
//! the [`Console`](crate::diagnostics::Console).  The printer only
//! prints newline and the character codes 32 to 122; anything else
//! (including carriage return and runout) is dropped.
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use tracing::{event, Level};

use crate::alarm::{Alarm, Device, StopReason};
use crate::diagnostics::Diagnostics;

use super::{overruns_reel, read_char};

const CHARACTER_MASK: u8 = 0o177;

fn printable(ch: u8) -> Option<u8> {
    match ch {
        b'\n' | 32..=122 => Some(ch),
        _ => None,
    }
}

#[derive(Debug)]
pub struct Teletype {
    input_path: PathBuf,
    input: Option<BufReader<File>>,
    characters_read: usize,
}

impl Teletype {
    pub fn new(input_path: PathBuf) -> Teletype {
        Teletype {
            input_path,
            input: None,
            characters_read: 0,
        }
    }

    fn input(&mut self, diag: &mut Diagnostics) -> Result<&mut BufReader<File>, Alarm> {
        let input = match self.input.take() {
            Some(input) => input,
            None => {
                let file = File::open(&self.input_path)
                    .map_err(|e| Alarm::io(Device::TeletypeInput, &self.input_path, e))?;
                event!(
                    Level::DEBUG,
                    "reading teletype input from {}",
                    self.input_path.display()
                );
                diag.report_general(format_args!(
                    "Teletype input file {} opened",
                    self.input_path.display()
                ));
                BufReader::new(file)
            }
        };
        Ok(self.input.insert(input))
    }

    /// Reads a character from the keyboard, and echoes it.
    pub fn read(&mut self, diag: &mut Diagnostics) -> Result<u8, StopReason> {
        self.characters_read += 1;
        if overruns_reel(self.characters_read) {
            return Err(StopReason::Overrun(Device::TeletypeInput));
        }
        let ch = read_char(self.input(diag)?);
        match ch.map_err(|e| Alarm::io(Device::TeletypeInput, &self.input_path, e))? {
            Some(ch) => {
                diag.report_character(format_args!("Read character {ch} from teletype"), true);
                diag.console_mut().echo(ch)?;
                Ok(ch)
            }
            None => Err(StopReason::TeletypeExhausted),
        }
    }

    /// Prints a character.  Only the bottom seven bits are used.
    pub fn write(&mut self, ch: u8, diag: &mut Diagnostics) -> Result<(), StopReason> {
        let ch = ch & CHARACTER_MASK;
        let printed = printable(ch);
        match printed {
            Some(p) => diag.report_character(
                format_args!("Character {ch} output to teletype({})", char::from(p)),
                true,
            ),
            None => diag.report_character(
                format_args!("Character {ch} output to teletype - ignored"),
                true,
            ),
        }
        if let Some(p) = printed {
            diag.console_mut().print(p)?;
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.input = None;
    }
}

#[test]
fn test_printable() {
    assert_eq!(printable(b'\n'), Some(b'\n'));
    assert_eq!(printable(b' '), Some(b' '));
    assert_eq!(printable(b'z'), Some(b'z'));
    assert_eq!(printable(b'{'), None);
    assert_eq!(printable(b'\r'), None);
    assert_eq!(printable(0), None);
}
