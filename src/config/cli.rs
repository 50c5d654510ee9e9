use chrono::NaiveDateTime;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn parse_date_time(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
        .map_err(|_| format!("Not a valid date-time: '{}'.", s))
}

/// Multi-letter short flags and the long flags clap knows them by.
pub const SHORT_ALIASES: [(&str, &str); 3] = [
    ("-dt", "--date_time"),
    ("-lat", "--latitude"),
    ("-long", "--longitude"),
];

/// clap short flags are a single character, so `-dt`, `-lat` and `-long` are
/// rewritten to their long forms before parsing. Anything after `--` is left
/// alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(s) = arg.to_str() else {
                return arg;
            };
            if s == "--" {
                passthrough = true;
                return arg;
            }
            for (short, long) in SHORT_ALIASES {
                if s == short {
                    return OsString::from(long);
                }
                if let Some(value) = s.strip_prefix(short).and_then(|v| v.strip_prefix('=')) {
                    return OsString::from(format!("{}={}", long, value));
                }
            }
            arg
        })
        .collect()
}

/// Help and version requests exit 0; every other argument error exits 1 so it
/// is not mistaken for a route resolution failure (exit 2).
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

pub fn try_parse_normalized<P, I, T>(args: I) -> Result<P, clap::Error>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    P::try_parse_from(normalize_args(args))
}

/// Parses the process arguments for any of the binaries, printing clap's
/// message and exiting with [`parse_error_exit_code`] on failure.
pub fn parse_or_exit<P: Parser>() -> P {
    match try_parse_normalized(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_error_exit_code(&e));
        }
    }
}
