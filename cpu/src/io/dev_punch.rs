//! Paper tape punch.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::{event, Level};

use crate::alarm::{Alarm, Device, StopReason};
use crate::diagnostics::Diagnostics;

use super::overruns_reel;

#[derive(Debug)]
pub struct Punch {
    path: PathBuf,
    tape: Option<BufWriter<File>>,
    punched: usize,
}

impl Punch {
    pub fn new(path: PathBuf) -> Punch {
        Punch {
            path,
            tape: None,
            punched: 0,
        }
    }

    fn tape(&mut self, diag: &mut Diagnostics) -> Result<&mut BufWriter<File>, Alarm> {
        let tape = match self.tape.take() {
            Some(tape) => tape,
            None => {
                let file = File::create(&self.path)
                    .map_err(|e| Alarm::io(Device::Punch, &self.path, e))?;
                event!(Level::DEBUG, "punching to {}", self.path.display());
                diag.report_general(format_args!(
                    "Paper tape punch file {} opened",
                    self.path.display()
                ));
                BufWriter::new(file)
            }
        };
        Ok(self.tape.insert(tape))
    }

    pub fn punch(&mut self, ch: u8, diag: &mut Diagnostics) -> Result<(), StopReason> {
        self.punched += 1;
        if overruns_reel(self.punched) {
            return Err(StopReason::Overrun(Device::Punch));
        }
        let written = self.tape(diag)?.write_all(&[ch]);
        written.map_err(|e| Alarm::io(Device::Punch, &self.path, e))?;
        diag.report_character(format_args!("Paper tape character {ch} punched"), true);
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), Alarm> {
        match self.tape.take() {
            Some(mut tape) => tape
                .flush()
                .map_err(|e| Alarm::io(Device::Punch, &self.path, e)),
            None => Ok(()),
        }
    }
}
