use crate::config::LoggingConfig;
use crate::error::Result;
use chrono::Local;
use env_logger::{Builder, Target};
use log::{debug, LevelFilter};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::str::FromStr;

/// Writes every log line to stderr and, when configured, to an append-only file.
pub struct TeeWriter {
    file: Option<File>,
}

impl TeeWriter {
    pub fn new(file: Option<File>) -> Self {
        Self { file }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

pub fn level_filter(config: &LoggingConfig, debug: bool) -> LevelFilter {
    if debug {
        return LevelFilter::Debug;
    }
    LevelFilter::from_str(&config.level).unwrap_or(LevelFilter::Info)
}

pub fn init(config: &LoggingConfig, debug: bool) -> Result<()> {
    let file = match &config.file {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let mut builder = Builder::new();
    builder
        .filter_level(level_filter(config, debug))
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(TeeWriter::new(file))));

    // A second init keeps the first logger.
    if let Err(e) = builder.try_init() {
        debug!("Logger already installed, keeping it: {}", e);
    }
    Ok(())
}
