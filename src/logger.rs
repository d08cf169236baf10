// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A minimal stderr logger, in the style of the teacher binary's own
//! hand-rolled `log::Log` implementation: no subscriber stack, just a
//! level prefix and `eprintln!`.

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let target = if !record.target().is_empty() {
            record.target()
        } else {
            record.module_path().unwrap_or_default()
        };

        match record.level() {
            log::Level::Error => eprintln!("error: {}", record.args()),
            log::Level::Warn => eprintln!("warning: {}", record.args()),
            log::Level::Info => eprintln!("{}", record.args()),
            log::Level::Debug => eprintln!("debug ({target}): {}", record.args()),
            log::Level::Trace => eprintln!("trace ({target}): {}", record.args()),
        }
    }

    fn flush(&self) {}
}

/// Installs the process-wide logger, selecting the max level from the
/// CLI's `-v`/`-q` verbosity count: `-q` drops to `Error` only, each `-v`
/// raises one step past the `Warn` default, up to `Trace`.
pub fn init(verbosity: i32) {
    let level = match verbosity {
        i32::MIN..=-1 => log::LevelFilter::Error,
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
