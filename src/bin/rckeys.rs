use clap::{ArgAction, Args, Parser, Subcommand};
use log::{Level, LevelFilter, Metadata, Record};
use rckeys::{event::EventKind, inputdev::DEFAULT_DEVICE_NAME, lircd::DEFAULT_SOCKET};
use std::{path::PathBuf, time::Duration};

mod commands;

#[derive(Parser)]
#[command(
    name = "rckeys",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Remote control key events",
    subcommand_required = true
)]
struct App {
    /// Increase message verbosity
    #[arg(long, short, action = ArgAction::Count, global = true, conflicts_with = "quiet")]
    verbose: u8,

    /// Silence all warnings
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive remote control input and print key events
    Listen(Listen),
    /// Run a replay script and print key events
    Replay(Replay),
    /// List input devices which can be probed
    List,
    /// Load a key table and print its entries
    Keytable(Keytable),
}

#[derive(Args)]
struct Classify {
    /// Key table with command and key names
    #[arg(long = "keytable", short = 'k', name = "KEYTABLE")]
    keytable: Option<PathBuf>,

    /// Take an escalating repeat counter on a dropped key as release
    #[arg(long = "release-on-repeat-escalation")]
    release_on_repeat_escalation: bool,

    /// Only print these events
    #[arg(long = "events", short = 'e', value_delimiter = ',', name = "EVENTS")]
    events: Vec<EventKind>,
}

#[derive(Args)]
struct Listen {
    #[clap(flatten)]
    classify: Classify,

    /// Use the input device whose name contains this
    #[arg(
        long = "device-name",
        short = 'n',
        default_value = DEFAULT_DEVICE_NAME,
        help_heading = "SOURCES"
    )]
    device_name: String,

    /// Do not probe input devices
    #[arg(long = "no-device", help_heading = "SOURCES")]
    no_device: bool,

    /// Path to lircd socket
    #[arg(long = "lircd", short = 'l', default_value = DEFAULT_SOCKET, help_heading = "SOURCES")]
    lircd: PathBuf,

    /// Do not connect to lircd
    #[arg(long = "no-lircd", help_heading = "SOURCES")]
    no_lircd: bool,

    /// Print kernel uevents
    #[arg(long = "uevents", short = 'u', help_heading = "SOURCES")]
    uevents: bool,

    /// Longest wait for input in each poll cycle, e.g. 100ms
    #[arg(long = "poll-timeout", short = 't', value_parser = humantime::parse_duration, default_value = "100ms")]
    poll_timeout: Duration,
}

#[derive(Args)]
struct Replay {
    #[clap(flatten)]
    classify: Classify,

    /// Replay script
    #[arg(name = "SCRIPT")]
    script: PathBuf,
}

#[derive(Args)]
struct Keytable {
    /// Key table file
    #[arg(name = "KEYTABLE")]
    keytable: PathBuf,
}

impl Classify {
    fn wanted(&self, kind: EventKind) -> bool {
        self.events.is_empty() || self.events.contains(&kind)
    }
}

fn main() {
    let args = App::parse();

    log::set_logger(&CLI_LOGGER).unwrap();

    let level = if args.quiet {
        LevelFilter::Error
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    log::set_max_level(level);

    match &args.command {
        Commands::Listen(listen) => commands::listen::listen(listen),
        Commands::Replay(replay) => commands::replay::replay(replay),
        Commands::List => commands::list::list(),
        Commands::Keytable(keytable) => commands::keytable::keytable(keytable),
    }
}

static CLI_LOGGER: CliLogger = CliLogger;

struct CliLogger;

impl log::Log for CliLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{}: {}",
                match record.level() {
                    Level::Trace => "trace",
                    Level::Debug => "debug",
                    Level::Info => "info",
                    Level::Warn => "warn",
                    Level::Error => "error",
                },
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
