//! The store (main memory) and its persistent image.
//!
//! The machine has 16384 words of store.  The registers which the
//! 900 series keeps in store (the sequence control register and the
//! B register of each priority level) are ordinary locations here;
//! see `control` for which.
//!
//! Between runs the store is kept in a text file holding one decimal
//! number per word, so that a program loaded by one run is still
//! there for the next.
use std::fs;
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

use tracing::{event, Level};

use base::prelude::*;

use super::alarm::{Alarm, Device};

const WORDS_PER_LINE: usize = 10;

pub struct Store {
    words: Vec<Word>,
}

impl Default for Store {
    fn default() -> Store {
        Store::new()
    }
}

impl Store {
    pub fn new() -> Store {
        Store {
            words: vec![Word::ZERO; Address::STORE_SIZE],
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(Word::ZERO);
    }

    /// Returns the store index of `addr`, or raises an alarm if it is
    /// outside the store.
    pub fn check(addr: Address) -> Result<usize, Alarm> {
        addr.index()
            .ok_or_else(|| Alarm::AddressOutOfRange(addr.bits().into()))
    }

    pub fn read(&self, addr: Address) -> Result<Word, Alarm> {
        Store::check(addr).map(|i| self.words[i])
    }

    pub fn write(&mut self, addr: Address, value: Word) -> Result<(), Alarm> {
        let i = Store::check(addr)?;
        self.words[i] = value;
        Ok(())
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Overwrites the top of module 0 with the bootstrap loader.
    pub fn load_initial_orders(&mut self) {
        let start = usize::from(INITIAL_ORDERS_START);
        self.words[start..start + INITIAL_ORDERS_LEN].copy_from_slice(&initial_orders());
    }

    /// Fills the store from the text image `text`, starting at
    /// location 0.  Returns the number of words read.  Locations
    /// beyond the end of the image are left alone.
    pub fn parse_image(&mut self, text: &str, path: &Path) -> Result<usize, Alarm> {
        let mut count = 0;
        for token in text.split_whitespace() {
            let value = token
                .parse::<i64>()
                .ok()
                .and_then(|n| Word::try_from(n).ok())
                .ok_or_else(|| Alarm::StoreImageFormat {
                    path: path.to_path_buf(),
                    token: token.to_string(),
                })?;
            match self.words.get_mut(count) {
                Some(w) => *w = value,
                None => {
                    return Err(Alarm::StoreImageTooLarge {
                        path: path.to_path_buf(),
                    });
                }
            }
            count += 1;
        }
        Ok(count)
    }

    /// Loads the store image at `path`.  A missing file is not an
    /// error; the store is left as it is and `None` is returned.
    pub fn load_image(&mut self, path: &Path) -> Result<Option<usize>, Alarm> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let count = self.parse_image(&text, path)?;
                event!(
                    Level::INFO,
                    "read {count} words of store image from {}",
                    path.display()
                );
                Ok(Some(count))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                event!(Level::DEBUG, "no store image at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(Alarm::io(Device::Store, path, e)),
        }
    }

    /// Writes the whole store as text, ten words to a line.
    pub fn write_image<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.words.chunks(WORDS_PER_LINE) {
            for w in line {
                write!(out, "{w:7}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn save_image(&self, path: &Path) -> Result<(), Alarm> {
        let fail = |e| Alarm::io(Device::Store, path, e);
        let file = fs::File::create(path).map_err(fail)?;
        let mut out = BufWriter::new(file);
        self.write_image(&mut out)
            .and_then(|()| out.flush())
            .map_err(fail)?;
        event!(Level::INFO, "saved store image to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_of(store: &Store) -> String {
        let mut buf = Vec::new();
        store.write_image(&mut buf).expect("writing to memory cannot fail");
        String::from_utf8(buf).expect("store images are ASCII")
    }

    #[test]
    fn test_bounds() {
        let mut store = Store::new();
        assert!(store.write(Address::new(16383), Word::ONE).is_ok());
        assert_eq!(store.read(Address::new(16383)).ok(), Some(Word::ONE));
        assert!(matches!(
            store.read(Address::new(16384)),
            Err(Alarm::AddressOutOfRange(16384))
        ));
        assert!(matches!(
            store.write(Address::new(0xFFFF), Word::ONE),
            Err(Alarm::AddressOutOfRange(65535))
        ));
    }

    #[test]
    fn test_image_layout() {
        let mut store = Store::new();
        store
            .write(Address::new(0), Word::from_signed(-3))
            .expect("in range");
        store.write(Address::new(9), Word::ONE).expect("in range");
        let text = image_of(&store);
        let lines: Vec<&str> = text.lines().collect();
        // 16384 words at ten per line, the last line holding four.
        assert_eq!(lines.len(), 1639);
        assert_eq!(
            lines[0],
            " 262141      0      0      0      0      0      0      0      0      1"
        );
        assert_eq!(lines[1638].len(), 28);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_parse_accepts_signed_and_unsigned() {
        let mut store = Store::new();
        let n = store
            .parse_image("-3 262141\n  +7\n\n12", Path::new("x"))
            .expect("image should be valid");
        assert_eq!(n, 4);
        assert_eq!(store.words()[0], store.words()[1]);
        assert_eq!(store.words()[2].bits(), 7);
        assert_eq!(store.words()[3].bits(), 12);
    }

    #[test]
    fn test_parse_rejects_junk() {
        let mut store = Store::new();
        assert!(matches!(
            store.parse_image("1 2 three", Path::new("x")),
            Err(Alarm::StoreImageFormat { token, .. }) if token == "three"
        ));
        assert!(matches!(
            store.parse_image("262144", Path::new("x")),
            Err(Alarm::StoreImageFormat { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_oversized_image() {
        let mut store = Store::new();
        let text = "0 ".repeat(Address::STORE_SIZE + 1);
        assert!(matches!(
            store.parse_image(&text, Path::new("x")),
            Err(Alarm::StoreImageTooLarge { .. })
        ));
        let text = "0 ".repeat(Address::STORE_SIZE);
        assert_eq!(
            store.parse_image(&text, Path::new("x")).ok(),
            Some(Address::STORE_SIZE)
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
        let path = dir.path().join("store");
        let mut store = Store::new();
        store.load_initial_orders();
        store.write(Address::new(100), Word::MAX).expect("in range");
        store.save_image(&path).expect("save should succeed");

        let mut reloaded = Store::new();
        assert_eq!(
            reloaded.load_image(&path).ok(),
            Some(Some(Address::STORE_SIZE))
        );
        assert_eq!(reloaded.words(), store.words());
    }

    #[test]
    fn test_missing_image_is_not_an_error() {
        let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
        let mut store = Store::new();
        assert_eq!(
            store.load_image(&dir.path().join("absent")).ok(),
            Some(None)
        );
        assert!(store.words().iter().all(|w| w.is_zero()));
    }

    #[test]
    fn test_initial_orders_placement() {
        let mut store = Store::new();
        store.load_initial_orders();
        assert_eq!(store.words()[8180].bits(), 262_141);
        assert_eq!(store.words()[8191], initial_orders()[11]);
        assert!(store.words()[8179].is_zero());
    }
}
