//! Paper tape reader.
//!
//! Tape is read one character at a time from the reader file.  When
//! the tape runs out the run stops, since that is how a real 903
//! behaves when a program asks for more tape than it has been given.
//!
//! At the end of the run the unread part of the tape is written out
//! again, so that the next run carries on reading from where this one
//! stopped.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{event, Level};

use crate::alarm::{Alarm, Device, StopReason};
use crate::diagnostics::Diagnostics;

use super::read_char;

#[derive(Debug)]
pub struct Reader {
    path: PathBuf,
    tape: Option<BufReader<File>>,
}

impl Reader {
    pub fn new(path: PathBuf) -> Reader {
        Reader { path, tape: None }
    }

    pub fn is_open(&self) -> bool {
        self.tape.is_some()
    }

    fn tape(&mut self, diag: &mut Diagnostics) -> Result<&mut BufReader<File>, Alarm> {
        let tape = match self.tape.take() {
            Some(tape) => tape,
            None => {
                let file = File::open(&self.path)
                    .map_err(|e| Alarm::io(Device::Reader, &self.path, e))?;
                event!(Level::DEBUG, "opened paper tape {}", self.path.display());
                diag.report_general(format_args!(
                    "Paper tape reader file {} opened",
                    self.path.display()
                ));
                BufReader::new(file)
            }
        };
        Ok(self.tape.insert(tape))
    }

    pub fn read(&mut self, diag: &mut Diagnostics) -> Result<u8, StopReason> {
        let ch = read_char(self.tape(diag)?);
        match ch.map_err(|e| Alarm::io(Device::Reader, &self.path, e))? {
            Some(ch) => {
                diag.report_character(format_args!("Paper tape character {ch:3} read"), true);
                Ok(ch)
            }
            None => Err(StopReason::ReaderExhausted),
        }
    }

    /// Reads the rest of the tape, if the reader was used.
    pub fn remainder(&mut self) -> Result<Option<Vec<u8>>, Alarm> {
        match self.tape.as_mut() {
            None => Ok(None),
            Some(tape) => {
                let mut rest = Vec::new();
                tape.read_to_end(&mut rest)
                    .map_err(|e| Alarm::io(Device::Reader, &self.path, e))?;
                Ok(Some(rest))
            }
        }
    }

    /// Writes the unread part of the tape to `to`.  Nothing is written
    /// if the program never used the reader.  The remainder is read in
    /// full before `to` is created, as `to` is usually the file being
    /// read.
    pub fn save_residue(&mut self, to: &Path) -> Result<(), Alarm> {
        if let Some(rest) = self.remainder()? {
            std::fs::write(to, &rest).map_err(|e| Alarm::io(Device::ReaderResidue, to, e))?;
            event!(
                Level::INFO,
                "saved {} characters of unread tape to {}",
                rest.len(),
                to.display()
            );
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.tape = None;
    }
}
