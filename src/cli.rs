//! Argv parsing for the CLI harness: a watchlist of `SYMBOL[:name]` pairs.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Watched {
    pub symbol: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub watchlist: Vec<Watched>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Run(Args),
    Help,
    Version,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: i32,
    pub message: String,
}

#[must_use]
pub fn help_text(bin_name: &str) -> String {
    format!(
        "Intraday Data Collection Engine\n\n\
         Usage:\n  {bin_name} [options] SYMBOL[:name] [SYMBOL[:name] ...]\n\n\
         Options:\n  -h, --help       show this help\n  -V, --version    show version\n\n\
         Each SYMBOL is a canonical instrument identifier (e.g. SH600000, HK00700, AAPL);\n\
         an optional `:name` suffix supplies a display name for the DayFile.\n"
    )
}

#[must_use]
pub fn version_text() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

pub fn parse_args<I, S>(args: I) -> Result<Command, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parsed = Args::default();
    let mut show_help = false;
    let mut show_version = false;

    for raw in args {
        let arg = raw.into();
        match arg.as_str() {
            "-h" | "--help" => show_help = true,
            "-V" | "--version" => show_version = true,
            _ if arg.starts_with('-') => {
                return Err(ParseError {
                    code: 2,
                    message: format!("unknown option: {arg}\n\n{}", help_text("intraday-collector")),
                });
            }
            _ => {
                let (symbol, name) = match arg.split_once(':') {
                    Some((symbol, name)) => (symbol.to_string(), name.to_string()),
                    None => (arg.clone(), arg.clone()),
                };
                if symbol.is_empty() {
                    return Err(ParseError {
                        code: 2,
                        message: format!(
                            "empty symbol in watchlist entry: {arg}\n\n{}",
                            help_text("intraday-collector")
                        ),
                    });
                }
                parsed.watchlist.push(Watched { symbol, name });
            }
        }
    }

    if show_help {
        return Ok(Command::Help);
    }

    if show_version {
        return Ok(Command::Version);
    }

    Ok(Command::Run(parsed))
}

#[cfg(test)]
mod tests {
    use super::{parse_args, Command, Watched};

    #[test]
    fn parses_empty_watchlist() {
        let result = parse_args(Vec::<String>::new());
        assert_eq!(result, Ok(Command::Run(super::Args::default())));
    }

    #[test]
    fn parses_help_command() {
        let result = parse_args(["--help"]);
        assert_eq!(result, Ok(Command::Help));
    }

    #[test]
    fn parses_version_command() {
        let result = parse_args(["--version"]);
        assert_eq!(result, Ok(Command::Version));
    }

    #[test]
    fn parses_symbol_with_name() {
        let result = parse_args(["SH600000:Pudong Development Bank", "AAPL"]);
        match result {
            Ok(Command::Run(args)) => {
                assert_eq!(
                    args.watchlist,
                    vec![
                        Watched {
                            symbol: "SH600000".to_string(),
                            name: "Pudong Development Bank".to_string()
                        },
                        Watched {
                            symbol: "AAPL".to_string(),
                            name: "AAPL".to_string()
                        },
                    ]
                );
            }
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn fails_on_unknown_option() {
        let result = parse_args(["--unknown"]);
        let err = result.expect_err("expected parse error");
        assert_eq!(err.code, 2);
        assert!(err.message.contains("unknown option"));
    }

    #[test]
    fn fails_on_empty_symbol() {
        let result = parse_args([":name"]);
        let err = result.expect_err("expected parse error");
        assert_eq!(err.code, 2);
        assert!(err.message.contains("empty symbol"));
    }
}
