use std::io::Write;

use log::{set_logger, set_max_level, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static LOGGER: TerminalLogger = TerminalLogger;

const FRAME: Color = Color::Rgb(0x7f, 0x8c, 0x8d);

/// Writes `[ level target ] message` lines to stderr, coloured by level.
pub struct TerminalLogger;

impl TerminalLogger {
    pub fn setup(level: LevelFilter) -> Result<(), SetLoggerError> {
        set_logger(&LOGGER).map(|()| set_max_level(level))
    }

    fn level_color(level: Level) -> Color {
        match level {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info => Color::Green,
            Level::Debug => Color::Cyan,
            Level::Trace => Color::Magenta,
        }
    }

    fn write_record(stream: &mut StandardStream, record: &Record) -> std::io::Result<()> {
        stream.set_color(ColorSpec::new().set_fg(Some(FRAME)))?;
        write!(stream, "[ ")?;
        stream.set_color(ColorSpec::new().set_fg(Some(Self::level_color(record.level()))))?;
        write!(stream, "{:<5} {}", record.level(), record.target())?;
        stream.set_color(ColorSpec::new().set_fg(Some(FRAME)))?;
        write!(stream, " ] ")?;
        stream.reset()?;
        writeln!(stream, "{}", record.args())
    }
}

impl Log for TerminalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut stream = StandardStream::stderr(ColorChoice::Auto);
            // Nowhere left to report a failing stderr.
            let _ = Self::write_record(&mut stream, record);
        }
    }

    fn flush(&self) {}
}
