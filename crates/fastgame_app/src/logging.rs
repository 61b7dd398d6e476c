//! stdout logger used by the session's debug messages.

use log::{Level, LevelFilter};

/// Installs the global logger at `level`.
///
/// Lines look like `2024-05-01 12:00:00 INFO "Starting..."`.  Returns `false`
/// when a logger was already installed, which is not treated as an error.
pub fn init(level: LevelFilter) -> bool {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                format_line(&chrono::Local::now(), record.level(), &message.to_string())
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
        .is_ok()
}

fn format_line<Tz>(now: &chrono::DateTime<Tz>, level: Level, message: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} {} \"{}\"",
        now.format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}
