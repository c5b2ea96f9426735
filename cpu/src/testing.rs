//! Helpers shared by the unit tests.
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::diagnostics::Console;

/// A writer whose output can be inspected after it has been handed
/// over as a `Box<dyn Write>`.
#[derive(Clone, Default)]
pub(crate) struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Returns a console together with the captures of its teletype and
/// diagnostic output.
pub(crate) fn captured_console() -> (Console, Capture, Capture) {
    let teletype = Capture::default();
    let diagnostics = Capture::default();
    let console = Console::new(Box::new(teletype.clone()), Box::new(diagnostics.clone()));
    (console, teletype, diagnostics)
}
