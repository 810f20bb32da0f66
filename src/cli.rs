//! Command-line interface for campus-bot.

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Bot API token (overrides config file).
    pub token: Option<String>,
    /// Bot API base URL (overrides config file).
    pub api_base: Option<String>,
    /// Host address for the HTTP listener.
    pub host: Option<String>,
    /// Port for the HTTP listener.
    pub port: Option<u16>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("token") => {
                result.token = Some(parser.value()?.parse()?);
            }
            Long("api-base") => {
                result.api_base = Some(parser.value()?.parse()?);
            }
            Short('H') | Long("host") => {
                result.host = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"campus-bot {version}
University assistant bot for the campus messenger

USAGE:
    campus-bot [OPTIONS]

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -t, --token <TOKEN>     Bot API token
        --api-base <URL>    Bot API base URL
    -H, --host <ADDR>       HTTP listener host [default: 127.0.0.1]
    -p, --port <PORT>       HTTP listener port [default: 8080]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    CAMPUS_BOT_TOKEN        Bot API token (overrides config)
    CAMPUS_BOT_API_BASE     Bot API base URL (overrides config)
    CAMPUS_BOT_HOST         HTTP listener host (overrides config)
    CAMPUS_BOT_PORT         HTTP listener port (overrides config)
    CAMPUS_BOT_AUTH_TOKEN   Bearer token guarding the notify endpoints
    CAMPUS_BOT_LOG_LEVEL    Log level (overrides config)
    RUST_LOG                Alternative log level setting
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("campus-bot {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Lexopt(#[from] lexopt::Error),

    #[error("invalid value for --{0}: '{1}'")]
    InvalidValue(&'static str, String),

    #[error("unexpected argument: '{0}'")]
    UnexpectedArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("campus-bot")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert_eq!(result.config, None);
        assert_eq!(result.token, None);
        assert!(!result.help);
    }

    #[test]
    fn test_token_and_api_base() {
        let result =
            parse_args_from(args(&["-t", "secret", "--api-base", "https://api.example"])).unwrap();
        assert_eq!(result.token.as_deref(), Some("secret"));
        assert_eq!(result.api_base.as_deref(), Some("https://api.example"));
    }

    #[test]
    fn test_host_port() {
        let result = parse_args_from(args(&["-H", "0.0.0.0", "-p", "9000"])).unwrap();
        assert_eq!(result.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(result.port, Some(9000));
    }

    #[test]
    fn test_config_file() {
        let result = parse_args_from(args(&["-c", "/etc/campus-bot.json"])).unwrap();
        assert_eq!(result.config, Some(PathBuf::from("/etc/campus-bot.json")));
    }

    #[test]
    fn test_log_level() {
        let result = parse_args_from(args(&["-l", "debug"])).unwrap();
        assert_eq!(result.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_help_and_version_flags() {
        assert!(parse_args_from(args(&["--help"])).unwrap().help);
        assert!(parse_args_from(args(&["-V"])).unwrap().version);
    }

    #[test]
    fn test_invalid_port() {
        assert!(parse_args_from(args(&["-p", "nope"])).is_err());
    }

    #[test]
    fn test_unexpected_positional() {
        assert!(parse_args_from(args(&["stray"])).is_err());
    }
}
