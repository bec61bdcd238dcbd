//! Command-line interface for ttl-session.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;

/// Command-line arguments.
///
/// Options left unset fall through to the environment, then the config
/// file, then built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Host address to bind to.
    pub host: Option<IpAddr>,
    /// Port to listen on.
    pub port: Option<u16>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Session idle lifetime in seconds.
    pub ttl: Option<u64>,
    /// Seconds between expiry sweeps.
    pub sweep_interval: Option<u64>,
    /// Cookie carrying the session id.
    pub cookie_name: Option<String>,
    /// Use `Authorization: Bearer` instead of a cookie.
    pub bearer: bool,
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
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                result.host = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("host", value))?,
                );
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                result.port = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("port", value))?,
                );
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("ttl") => {
                result.ttl = Some(positive_secs("ttl", parser.value()?.parse()?)?);
            }
            Long("sweep-interval") => {
                result.sweep_interval = Some(positive_secs(
                    "sweep-interval",
                    parser.value()?.parse()?,
                )?);
            }
            Long("cookie-name") => {
                result.cookie_name = Some(parser.value()?.parse()?);
            }
            Long("bearer") => {
                result.bearer = true;
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

fn positive_secs(name: &'static str, value: String) -> Result<u64, ArgsError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ArgsError::InvalidValue(name, value)),
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"ttl-session {version}
In-process session store with idle expiry

USAGE:
    ttl-session [OPTIONS]

OPTIONS:
    -H, --host <ADDR>           Host address to bind [default: 127.0.0.1]
    -p, --port <PORT>           Port to listen on [default: 3000]
    -c, --config <FILE>         Path to configuration file (JSON)
    -t, --ttl <SECS>            Session idle lifetime [default: 1800]
        --sweep-interval <SECS> Seconds between expiry sweeps [default: ttl]
        --cookie-name <NAME>    Cookie carrying the session id [default: session_id]
        --bearer                Read the session id from Authorization: Bearer
    -l, --log-level <LVL>       Log level (error, warn, info, debug, trace)
    -h, --help                  Print help
    -V, --version               Print version

ENVIRONMENT VARIABLES:
    TTL_SESSION_HOST            Host address (overrides config)
    TTL_SESSION_PORT            Port number (overrides config)
    TTL_SESSION_TTL             Session idle lifetime in seconds
    TTL_SESSION_SWEEP_INTERVAL  Seconds between expiry sweeps
    TTL_SESSION_COOKIE_NAME     Cookie name
    TTL_SESSION_TRANSPORT       "cookie" or "bearer"
    TTL_SESSION_LOG_LEVEL       Log level (overrides config)
    RUST_LOG                    Alternative log level setting

EXAMPLES:
    # Start with defaults (localhost:3000, 30 minute sessions)
    ttl-session

    # Five minute sessions swept every ten seconds
    ttl-session -t 300 --sweep-interval 10

    # Start with config file
    ttl-session -c /etc/ttl-session/config.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("ttl-session {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("ttl-session")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.host.is_none());
        assert!(result.port.is_none());
        assert!(result.ttl.is_none());
        assert!(!result.bearer);
    }

    #[test]
    fn test_host_port() {
        let result = parse_args_from(args(&["-H", "0.0.0.0", "-p", "8080"])).unwrap();
        assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
        assert_eq!(result.port, Some(8080));
    }

    #[test]
    fn test_long_options() {
        let result =
            parse_args_from(args(&["--host", "192.168.1.1", "--port", "9000"])).unwrap();
        assert_eq!(result.host.unwrap().to_string(), "192.168.1.1");
        assert_eq!(result.port, Some(9000));
    }

    #[test]
    fn test_ttl_and_sweep() {
        let result = parse_args_from(args(&["-t", "600", "--sweep-interval", "15"])).unwrap();
        assert_eq!(result.ttl, Some(600));
        assert_eq!(result.sweep_interval, Some(15));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        assert!(parse_args_from(args(&["--ttl", "0"])).is_err());
        assert!(parse_args_from(args(&["--sweep-interval", "0"])).is_err());
        assert!(parse_args_from(args(&["--ttl", "-5"])).is_err());
    }

    #[test]
    fn test_cookie_and_bearer() {
        let result = parse_args_from(args(&["--cookie-name", "sid", "--bearer"])).unwrap();
        assert_eq!(result.cookie_name, Some("sid".to_string()));
        assert!(result.bearer);
    }

    #[test]
    fn test_config_file() {
        let result = parse_args_from(args(&["-c", "/etc/config.json"])).unwrap();
        assert_eq!(result.config, Some(PathBuf::from("/etc/config.json")));
    }

    #[test]
    fn test_help_flag() {
        let result = parse_args_from(args(&["-h"])).unwrap();
        assert!(result.help);

        let result = parse_args_from(args(&["--help"])).unwrap();
        assert!(result.help);
    }

    #[test]
    fn test_version_flag() {
        let result = parse_args_from(args(&["-V"])).unwrap();
        assert!(result.version);
    }

    #[test]
    fn test_log_level() {
        let result = parse_args_from(args(&["-l", "debug"])).unwrap();
        assert_eq!(result.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_invalid_port() {
        let result = parse_args_from(args(&["-p", "invalid"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_host() {
        let result = parse_args_from(args(&["-H", "not-an-ip"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unexpected_positional() {
        let result = parse_args_from(args(&["serve"]));
        assert!(matches!(result, Err(ArgsError::UnexpectedArgument(_))));
    }
}
