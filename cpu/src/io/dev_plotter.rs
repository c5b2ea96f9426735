//! Incremental (step) plotter.
//!
//! Each plotter command is a six-bit code:
//!
//! | Bit | Meaning   |
//! | --- | --------- |
//! | 1   | East      |
//! | 2   | West      |
//! | 4   | North     |
//! | 8   | South     |
//! | 16  | Pen up    |
//! | 32  | Pen down  |
//!
//! The paper is a white raster of one pixel per plotter step.  The
//! pen cannot move past the east or west edges of the paper, but it
//! can run off the top or bottom; marks made there are lost.
//!
//! Paper is only allocated when the program first uses the plotter,
//! and the plot is saved as a PNG file at the end of the run.
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{event, Level};

use crate::config::PlotterConfig;
use crate::diagnostics::Diagnostics;

const EAST: u32 = 1;
const WEST: u32 = 2;
const NORTH: u32 = 4;
const SOUTH: u32 = 8;
const PEN_UP: u32 = 16;
const PEN_DOWN: u32 = 32;
const COMMAND_BITS: u32 = 0o77;

const WHITE: u8 = 0xFF;
const BLACK: u8 = 0x00;
const BYTES_PER_PIXEL: usize = 3;

/// Where the pen starts, measured from the west and south edges.
const START_X: i64 = 1500;
const START_FROM_BOTTOM: i64 = 200;

const TITLE: &str = "Elliott 903 Plotter Output";

/// Plotter paper and the pen on it.
struct Paper {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    x: i64,
    y: i64,
    pen_down: bool,
    /// Half the side of the square the nib draws.
    radius: i64,
}

impl Paper {
    fn new(config: PlotterConfig) -> Result<Paper, String> {
        let width = usize::try_from(config.width).map_err(|e| e.to_string())?;
        let height = usize::try_from(config.height).map_err(|e| e.to_string())?;
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| format!("paper of {width}x{height} steps is too large"))?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|e| e.to_string())?;
        pixels.resize(len, WHITE);
        Ok(Paper {
            width,
            height,
            pixels,
            x: START_X,
            y: i64::from(config.height) - START_FROM_BOTTOM,
            pen_down: false,
            radius: i64::from((config.pen / 3).max(1)),
        })
    }

    fn pixel_offset(&self, x: i64, y: i64) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|x| *x < self.width)?;
        let y = usize::try_from(y).ok().filter(|y| *y < self.height)?;
        Some((y * self.width + x) * BYTES_PER_PIXEL)
    }

    fn pixel(&self, x: i64, y: i64) -> Option<[u8; 3]> {
        let i = self.pixel_offset(x, y)?;
        self.pixels
            .get(i..i + BYTES_PER_PIXEL)
            .and_then(|p| p.try_into().ok())
    }

    fn step(&mut self, command: u32) {
        let width = i64::try_from(self.width).unwrap_or(i64::MAX);
        if command & EAST != 0 && self.x < width {
            self.x += 1;
        }
        if command & WEST != 0 && self.x > 0 {
            self.x -= 1;
        }
        if command & NORTH != 0 {
            self.y -= 1;
        }
        if command & SOUTH != 0 {
            self.y += 1;
        }
        if command & PEN_UP != 0 {
            self.pen_down = false;
        }
        if command & PEN_DOWN != 0 {
            self.pen_down = true;
        }
        if self.pen_down {
            self.ink();
        }
    }

    /// Draws a square nib mark centred on the pen.
    fn ink(&mut self) {
        let r = self.radius;
        for y in self.y - r..=self.y + r {
            for x in self.x - r..=self.x + r {
                if let Some(i) = self.pixel_offset(x, y) {
                    self.pixels[i..i + BYTES_PER_PIXEL].fill(BLACK);
                }
            }
        }
    }

    fn write_png(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let file = File::create(path)?;
        let w = BufWriter::new(file);
        let mut encoder = png::Encoder::new(w, u32::try_from(self.width)?, u32::try_from(self.height)?);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.add_text_chunk("Title".to_string(), TITLE.to_string())?;
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(())
    }
}

enum PaperState {
    Unused,
    /// Allocating the paper failed; plotter commands are ignored.
    Unavailable,
    Loaded(Paper),
}

pub struct Plotter {
    path: PathBuf,
    config: PlotterConfig,
    paper: PaperState,
}

impl Plotter {
    pub fn new(path: PathBuf, config: PlotterConfig) -> Plotter {
        Plotter {
            path,
            config,
            paper: PaperState::Unused,
        }
    }

    pub fn is_in_use(&self) -> bool {
        matches!(self.paper, PaperState::Loaded(_))
    }

    fn load_paper(&mut self, diag: &mut Diagnostics) {
        self.paper = match Paper::new(self.config) {
            Ok(paper) => {
                event!(
                    Level::DEBUG,
                    "allocated {}x{} plotter paper",
                    paper.width,
                    paper.height
                );
                diag.report_general(format_args!("Starting plotting"));
                PaperState::Loaded(paper)
            }
            Err(e) => {
                event!(Level::WARN, "could not allocate plotter paper: {e}");
                diag.report(format_args!("*** Unable to allocate plotter paper: {e}"));
                PaperState::Unavailable
            }
        };
    }

    /// Obeys a plotter command.  Only the bottom six bits of `command`
    /// are used.
    pub fn move_pen(&mut self, command: u32, diag: &mut Diagnostics) {
        if matches!(self.paper, PaperState::Unused) {
            self.load_paper(diag);
        }
        if let PaperState::Loaded(paper) = &mut self.paper {
            let command = command & COMMAND_BITS;
            diag.report_character(format_args!("Plotter code {command:o} output"), false);
            paper.step(command);
        }
    }

    /// Colour of the paper at (x, y), where y counts down from the top
    /// edge.  `None` if nothing has been plotted or the point is off
    /// the paper.
    pub fn pixel(&self, x: i64, y: i64) -> Option<[u8; 3]> {
        match &self.paper {
            PaperState::Loaded(paper) => paper.pixel(x, y),
            _ => None,
        }
    }

    /// Current pen position.
    pub fn pen_position(&self) -> Option<(i64, i64)> {
        match &self.paper {
            PaperState::Loaded(paper) => Some((paper.x, paper.y)),
            _ => None,
        }
    }

    /// Writes the plot, if anything was plotted.  Failure is reported
    /// but does not stop the rest of the shutdown.
    pub fn save(&mut self, diag: &mut Diagnostics) {
        if let PaperState::Loaded(paper) = &self.paper {
            match paper.write_png(&self.path) {
                Ok(()) => event!(Level::INFO, "saved plot to {}", self.path.display()),
                Err(e) => {
                    event!(Level::WARN, "failed to save plot: {e}");
                    diag.report(format_args!(
                        "*** Could not write plotter output file {}: {e}",
                        self.path.display()
                    ));
                }
            }
        }
    }
}
