//! Command-line front end for the Elliott 903 emulator.
//!
//! Each run picks up the state left by the previous one: the store
//! image, and whatever paper tape the last run did not read.  The
//! exit code says why the run stopped.
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use clap::ArgAction::{Help, Set, SetTrue};
use clap::Parser;
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

use base::prelude::*;
use cpu::{Alarm, Config, ConfigError, Emulator, Outputs, PlotterConfig, TraceConfig};

const LOG_FILE: &str = "log.txt";

/// Emulator for the Elliott 903 computer
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None, disable_help_flag = true)]
struct Cli {
    /// Paper tape reader input
    #[clap(action = Set, long, value_name = "FILE", default_value = ".reader")]
    reader: PathBuf,

    /// Paper tape punch output
    #[clap(action = Set, long, value_name = "FILE", default_value = ".punch")]
    punch: PathBuf,

    /// Teletype input
    #[clap(action = Set, long, value_name = "FILE", default_value = ".ttyin")]
    ttyin: PathBuf,

    /// Plotter output
    #[clap(action = Set, long, value_name = "FILE", default_value = ".plot.png")]
    plot: PathBuf,

    /// Store image
    #[clap(action = Set, long, value_name = "FILE", default_value = ".store")]
    store: PathBuf,

    /// Send diagnostics to the file log.txt instead of stderr
    #[clap(action = SetTrue, short = 'd', long)]
    dfile: bool,

    /// Abandon the run after this many instructions
    #[clap(action = Set, short = 'a', long)]
    abandon: Option<u64>,

    /// Plotter paper height in steps
    #[clap(action = Set, short = 'h', long, default_value_t = PlotterConfig::default().height)]
    height: u32,

    /// Plotter paper width in steps
    #[clap(action = Set, short = 'w', long, default_value_t = PlotterConfig::default().width)]
    width: u32,

    /// Start execution at this address (less than 8192)
    #[clap(action = Set, short = 'j', long, default_value_t = INITIAL_ORDERS_ENTRY.bits())]
    jump: u16,

    /// Report changes to this location (decimal, or module^offset)
    #[clap(action = Set, short = 'm', long, value_name = "ADDRESS")]
    monitor: Option<Address>,

    /// Plotter pen size in steps
    #[clap(action = Set, short = 'p', long, alias = "Pen", default_value_t = PlotterConfig::default().pen)]
    pen: u32,

    /// Trace 1000 instructions after the first N, then stop
    #[clap(action = Set, short = 'r', long, value_name = "N")]
    rtrace: Option<u64>,

    /// Start tracing when this location is reached
    #[clap(action = Set, short = 's', long, value_name = "ADDRESS")]
    start: Option<Address>,

    /// Start tracing after N instructions
    #[clap(action = Set, short = 't', long, value_name = "N")]
    trace: Option<u64>,

    /// Verbosity: 1 general reports, 2 jumps, 4 instructions, 8 characters
    #[clap(action = Set, short = 'v', long, default_value_t = 0)]
    verbose: u8,

    /// Print help
    #[clap(short = '?', long, action = Help)]
    help: Option<bool>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            reader_path: self.reader.clone(),
            punch_path: self.punch.clone(),
            teletype_input_path: self.ttyin.clone(),
            plot_path: self.plot.clone(),
            store_path: self.store.clone(),
            diagnostics_path: self.dfile.then(|| PathBuf::from(LOG_FILE)),
            jump: Address::new(self.jump),
            plotter: PlotterConfig {
                width: self.width,
                height: self.height,
                pen: self.pen,
            },
            verbose: self.verbose,
            abandon: self.abandon,
            trace: TraceConfig {
                start: self.start,
                count: self.trace,
                rtrace: self.rtrace,
            },
            monitor: self.monitor,
            ..Config::default()
        }
    }
}

#[derive(Debug)]
enum Fail {
    InitialisationFailure(String),
    BadConfiguration(ConfigError),
    LogFile(io::Error),
    /// The store image could not be loaded, so the run never started.
    Startup(Alarm),
}

impl Display for Fail {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fail::InitialisationFailure(msg) => f.write_str(msg.as_str()),
            Fail::BadConfiguration(e) => write!(f, "invalid arguments: {e}"),
            Fail::LogFile(e) => write!(f, "Cannot open log file {LOG_FILE}: {e}"),
            Fail::Startup(alarm) => write!(f, "*** {alarm}"),
        }
    }
}

impl Error for Fail {}

fn init_logging() -> Result<(), Fail> {
    // RUST_LOG selects which developer trace messages are printed.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
    {
        Err(e) => {
            return Err(Fail::InitialisationFailure(format!(
                "failed to initialise tracing filter (perhaps there is a problem with environment variables): {e}"
            )));
        }
        Ok(layer) => layer,
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn run_emulator(cli: Cli) -> Result<i32, Fail> {
    let config = cli.config().validate().map_err(Fail::BadConfiguration)?;

    let diagnostics: Box<dyn Write> = match &config.diagnostics_path {
        Some(path) => {
            let file = File::create(path).map_err(Fail::LogFile)?;
            eprintln!("Diagnostics are being sent to file {}", path.display());
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stderr()),
    };
    let outputs = Outputs {
        teletype: Box::new(io::stdout()),
        diagnostics,
    };

    let mut emulator = Emulator::new(config, outputs).map_err(Fail::Startup)?;
    let running = emulator.run_flag();
    ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)).map_err(|e| {
        Fail::InitialisationFailure(format!("failed to install interrupt handler: {e}"))
    })?;

    let reason = emulator.run();
    event!(Level::INFO, "run ended with exit code {}", reason.exit_code());
    Ok(emulator.shutdown(&reason))
}

/// Prints a usage message and returns the exit code for it.
fn report_usage(e: &clap::Error) -> i32 {
    if let Err(print_error) = e.print() {
        event!(Level::WARN, "failed to print usage message: {print_error}");
    }
    // Help and version requests are not failures.
    if e.use_stderr() {
        1
    } else {
        0
    }
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("{e}");
        std::process::exit(1);
    }
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => std::process::exit(report_usage(&e)),
    };
    match run_emulator(cli) {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(code) => {
            std::process::exit(code);
        }
    }
}
